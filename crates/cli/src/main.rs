use anyhow::Context;

use stockroom_cli::Menu;
use stockroom_infra::StoreConfig;

fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = StoreConfig::from_env().context("invalid store configuration")?;
    let store = config.open().context("failed to open product store")?;

    tracing::info!(backend = ?config.backend, "stockroom started");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Menu::new(store.as_ref(), stdin.lock(), stdout.lock())
        .run()
        .context("menu terminated on an I/O error")?;

    Ok(())
}
