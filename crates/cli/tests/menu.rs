//! Black-box sessions: scripted input against real stores, asserting on what the
//! user sees and on what ends up persisted.

use std::fs;

use stockroom_cli::Menu;
use stockroom_infra::{JsonFileStore, ProductStore, SqliteProductStore};
use stockroom_products::ProductCode;

fn session(store: &dyn ProductStore, script: &str) -> String {
    let mut menu = Menu::new(store, script.as_bytes(), Vec::new());
    menu.run().expect("menu run");
    String::from_utf8(menu.into_output()).expect("utf-8 output")
}

fn code(raw: &str) -> ProductCode {
    ProductCode::parse(raw).expect("valid code")
}

const ADD_LAPTOP: &str = "2\n100001\nLaptop\n1200.00\n5\nAcme\n2\n";
const ADD_YOGURT: &str = "1\n200002\nYogurt\n2.50\n40\nDairy Co\n31/12/2099\n";

#[test]
fn json_session_persists_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");

    let store = JsonFileStore::new(&path);
    let out = session(&store, &format!("{ADD_LAPTOP}{ADD_YOGURT}0\n"));
    assert!(out.contains("Product 100001 saved."));
    assert!(out.contains("Product 200002 saved."));

    // A second process sees the same file.
    let reopened = JsonFileStore::new(&path);
    let out = session(&reopened, "6\n3\n200002\n0\n");
    assert!(out.contains("100001 | Laptop 1200.00 - Warranty: 2 year(s)"));
    assert!(out.contains("200002 | Yogurt 2.50 - Expires 31/12/2099"));
    assert!(out.contains("Found 200002: Yogurt 2.50 - Expires 31/12/2099"));
}

#[test]
fn json_update_then_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("products.json"));

    let script = format!("{ADD_LAPTOP}4\n100001\n999.99\n3\n100001\n5\n100001\n3\n100001\n6\n0\n");
    let out = session(&store, &script);

    assert!(out.contains("Price updated for product 100001."));
    assert!(out.contains("Found 100001: Laptop 999.99 - Warranty: 2 year(s)"));
    assert!(out.contains("Product 100001 deleted."));
    assert!(out.contains("No product with code 100001."));
    assert!(out.contains("Inventory is empty."));
    assert_eq!(store.read(&code("100001")).unwrap(), None);
}

#[test]
fn corrupt_file_is_reported_and_session_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    fs::write(&path, "{ broken").unwrap();

    let store = JsonFileStore::new(&path);
    let out = session(&store, &format!("6\n{ADD_LAPTOP}0\n"));

    assert_eq!(out.matches("Stored inventory is corrupt:").count(), 2);
    assert!(out.ends_with("Goodbye.\n"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
}

#[test]
fn sqlite_session_matches_json_behaviour() {
    let store = SqliteProductStore::in_memory().unwrap();

    let script = format!("{ADD_YOGURT}{ADD_LAPTOP}{ADD_LAPTOP}4\n200002\n3.10\n6\n0\n");
    let out = session(&store, &script);

    assert!(out.contains("A product with code 100001 already exists."));
    assert!(out.contains("Price updated for product 200002."));
    let laptop = out.find("100001 | Laptop 1200.00").unwrap();
    let yogurt = out.find("200002 | Yogurt 3.10 - Expires 31/12/2099").unwrap();
    assert!(laptop < yogurt);
}

#[test]
fn invalid_fields_never_reach_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("products.json");
    let store = JsonFileStore::new(&path);

    let script = "\
2\n100001\n   \n10\n1\nAcme\n1\n\
2\n100001\nLaptop\nabc\n1\nAcme\n1\n\
2\n100001\nLaptop\n10\n-1\nAcme\n1\n\
2\n100001\nLaptop\n10\n1\nAcme\n-2\n\
1\n200002\nMilk\n1\n1\nDairy\n2099-12-31\n\
0\n";
    let out = session(&store, script);

    assert_eq!(out.matches("Invalid input:").count(), 5);
    assert!(!path.exists());
}
