//! SQLite-backed product store.
//!
//! Products are split across a base table and one side table per category,
//! all keyed by the product code:
//!
//! | Table        | Columns                                      |
//! |--------------|----------------------------------------------|
//! | `products`   | `code` (PK), `name`, `price`, `quantity`, `supplier` |
//! | `perishable` | `code` (PK, FK), `expiration_date`           |
//! | `durable`    | `code` (PK, FK), `warranty`                  |
//!
//! `price` is stored as decimal text so no precision is lost.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation) on `products` insert | `Conflict` | Code already taken |
//! | Database (other) | `Storage` | Constraint or SQL failure |
//! | ColumnDecode / Decode / ColumnNotFound | `CorruptData` | Stored value cannot be decoded |
//! | PoolClosed / PoolTimedOut / Io / other | `Storage` | Connection failures |
//!
//! ## Transactions
//!
//! `create` and `delete` touch several tables and run inside one transaction.
//! A transaction dropped without `commit` rolls back, and pooled connections go
//! back to the pool when their guard drops, so every early return releases both.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tokio::runtime::{Builder, Runtime};
use tracing::instrument;

use stockroom_core::DomainError;
use stockroom_products::{
    Category, ExpirationDate, Price, Product, ProductCode, ProductFields, ProductName, Quantity,
    Warranty,
};

use super::r#trait::{ProductStore, StoreError, StoreResult, log_list_outcome, log_outcome};

const BACKEND: &str = "sqlite";

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS products (
        code     TEXT PRIMARY KEY NOT NULL,
        name     TEXT NOT NULL,
        price    TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        supplier TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS perishable (
        code            TEXT PRIMARY KEY NOT NULL REFERENCES products (code),
        expiration_date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS durable (
        code     TEXT PRIMARY KEY NOT NULL REFERENCES products (code),
        warranty INTEGER NOT NULL CHECK (warranty >= 0)
    )
    "#,
];

/// Product store over a SQLite database.
///
/// The API is synchronous: the store owns a current-thread tokio runtime and
/// blocks on each operation.
#[derive(Debug)]
pub struct SqliteProductStore {
    pool: SqlitePool,
    runtime: Runtime,
}

impl SqliteProductStore {
    /// Open (creating if missing) the database at `url` and ensure the schema exists.
    ///
    /// Accepts any SQLx SQLite URL, e.g. `sqlite://stockroom.db` or `sqlite::memory:`.
    #[instrument]
    pub fn connect(url: &str) -> StoreResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::storage(format!("failed to start runtime: {e}")))?;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("parse_url", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        // One long-lived connection: requests are sequential, and an in-memory
        // database only exists as long as its connection.
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options),
            )
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self { pool, runtime };
        store.ensure_schema()?;
        Ok(store)
    }

    /// A private in-memory database, mainly for tests.
    pub fn in_memory() -> StoreResult<Self> {
        Self::connect("sqlite::memory:")
    }

    fn ensure_schema(&self) -> StoreResult<()> {
        self.runtime.block_on(async {
            for ddl in SCHEMA {
                sqlx::query(ddl)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("create_schema", e))?;
            }
            Ok(())
        })
    }
}

impl Drop for SqliteProductStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl ProductStore for SqliteProductStore {
    #[instrument(skip(self, product), fields(code = %product.code(), category = product.category().label()))]
    fn create(&self, product: &Product) -> StoreResult<()> {
        let result: StoreResult<()> = self.runtime.block_on(async {
            let code = product.code();
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("begin_transaction", e))?;

            let existing = sqlx::query("SELECT 1 FROM products WHERE code = ?1")
                .bind(code.as_str())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("select_product", e))?;
            if existing.is_some() {
                return Err(StoreError::Conflict(code.clone()));
            }

            sqlx::query(
                r#"
                INSERT INTO products (code, name, price, quantity, supplier)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(code.as_str())
            .bind(product.name().as_str())
            .bind(product.price().amount().to_string())
            .bind(i64::from(product.quantity().value()))
            .bind(product.supplier())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(code.clone())
                } else {
                    map_sqlx_error("insert_product", e)
                }
            })?;

            match product.category() {
                Category::Base => {}
                Category::Perishable { expiration_date } => {
                    sqlx::query("INSERT INTO perishable (code, expiration_date) VALUES (?1, ?2)")
                        .bind(code.as_str())
                        .bind(expiration_date.date())
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("insert_perishable", e))?;
                }
                Category::Durable { warranty } => {
                    sqlx::query("INSERT INTO durable (code, warranty) VALUES (?1, ?2)")
                        .bind(code.as_str())
                        .bind(i64::from(warranty.value()))
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| map_sqlx_error("insert_durable", e))?;
                }
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit_transaction", e))
        });
        log_outcome(BACKEND, "create", product.code(), &result);
        result
    }

    #[instrument(skip(self), fields(code = %code))]
    fn read(&self, code: &ProductCode) -> StoreResult<Option<Product>> {
        let result: StoreResult<Option<Product>> = self.runtime.block_on(async {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| map_sqlx_error("acquire", e))?;

            let row = sqlx::query(
                r#"
                SELECT code, name, price, quantity, supplier
                FROM products
                WHERE code = ?1
                "#,
            )
            .bind(code.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_sqlx_error("select_product", e))?;

            let Some(row) = row else {
                return Ok(None);
            };
            let fields = decode_fields(&row)?;
            let category = probe_category(&mut conn, code).await?;
            Ok(Some(Product::restore(fields, category)))
        });
        log_outcome(BACKEND, "read", code, &result);
        result
    }

    #[instrument(skip(self), fields(code = %code, price = %price))]
    fn update_price(&self, code: &ProductCode, price: Price) -> StoreResult<()> {
        let result: StoreResult<()> = self.runtime.block_on(async {
            let updated = sqlx::query("UPDATE products SET price = ?1 WHERE code = ?2")
                .bind(price.amount().to_string())
                .bind(code.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("update_price", e))?;

            if updated.rows_affected() == 0 {
                return Err(StoreError::NotFound(code.clone()));
            }
            Ok(())
        });
        log_outcome(BACKEND, "update_price", code, &result);
        result
    }

    #[instrument(skip(self), fields(code = %code))]
    fn delete(&self, code: &ProductCode) -> StoreResult<()> {
        let result: StoreResult<()> = self.runtime.block_on(async {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(|e| map_sqlx_error("begin_transaction", e))?;

            for (operation, sql) in [
                ("delete_perishable", "DELETE FROM perishable WHERE code = ?1"),
                ("delete_durable", "DELETE FROM durable WHERE code = ?1"),
            ] {
                sqlx::query(sql)
                    .bind(code.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| map_sqlx_error(operation, e))?;
            }

            let deleted = sqlx::query("DELETE FROM products WHERE code = ?1")
                .bind(code.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("delete_product", e))?;

            if deleted.rows_affected() == 0 {
                tx.rollback()
                    .await
                    .map_err(|e| map_sqlx_error("rollback", e))?;
                return Err(StoreError::NotFound(code.clone()));
            }

            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit_transaction", e))
        });
        log_outcome(BACKEND, "delete", code, &result);
        result
    }

    #[instrument(skip(self))]
    fn list(&self) -> StoreResult<Vec<Product>> {
        let result: StoreResult<Vec<Product>> = self.runtime.block_on(async {
            let rows = sqlx::query(
                r#"
                SELECT
                    p.code,
                    p.name,
                    p.price,
                    p.quantity,
                    p.supplier,
                    e.expiration_date,
                    d.warranty
                FROM products p
                LEFT JOIN perishable e ON e.code = p.code
                LEFT JOIN durable d ON d.code = p.code
                ORDER BY p.code ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

            let mut products = Vec::with_capacity(rows.len());
            for row in rows {
                let fields = decode_fields(&row)?;
                let expiration: Option<NaiveDate> = column(&row, "expiration_date")?;
                let warranty: Option<i64> = column(&row, "warranty")?;
                let category = category_from_columns(&fields.code, expiration, warranty)?;
                products.push(Product::restore(fields, category));
            }
            Ok(products)
        });
        log_list_outcome(BACKEND, &result);
        result
    }
}

/// Probe the perishable side table first, then the durable one.
async fn probe_category(conn: &mut SqliteConnection, code: &ProductCode) -> StoreResult<Category> {
    let perishable = sqlx::query("SELECT expiration_date FROM perishable WHERE code = ?1")
        .bind(code.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("select_perishable", e))?;
    if let Some(row) = perishable {
        let date: NaiveDate = column(&row, "expiration_date")?;
        return category_from_columns(code, Some(date), None);
    }

    let durable = sqlx::query("SELECT warranty FROM durable WHERE code = ?1")
        .bind(code.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_sqlx_error("select_durable", e))?;
    if let Some(row) = durable {
        let years: i64 = column(&row, "warranty")?;
        return category_from_columns(code, None, Some(years));
    }

    Ok(Category::Base)
}

/// A perishable row wins over a durable one, matching the probe order of `read`.
fn category_from_columns(
    code: &ProductCode,
    expiration: Option<NaiveDate>,
    warranty: Option<i64>,
) -> StoreResult<Category> {
    match (expiration, warranty) {
        (Some(date), _) => Ok(Category::Perishable {
            expiration_date: ExpirationDate::from_date(date),
        }),
        (None, Some(years)) => Ok(Category::Durable {
            warranty: Warranty::try_from(years)
                .map_err(|e| StoreError::undecodable(code.as_str(), e))?,
        }),
        (None, None) => Ok(Category::Base),
    }
}

fn decode_fields(row: &SqliteRow) -> StoreResult<ProductFields> {
    let code: String = column(row, "code")?;
    let invalid = |e: DomainError| StoreError::undecodable(&code, e);

    let price_text: String = column(row, "price")?;
    let price = Decimal::from_str(&price_text).map_err(|e| {
        StoreError::corrupt(format!("stored price {price_text:?} of {code} is not a decimal: {e}"))
    })?;

    Ok(ProductFields {
        code: ProductCode::parse(&code).map_err(invalid)?,
        name: ProductName::parse(&column::<String>(row, "name")?).map_err(invalid)?,
        price: Price::new(price).map_err(invalid)?,
        quantity: Quantity::try_from(column::<i64>(row, "quantity")?).map_err(invalid)?,
        supplier: column(row, "supplier")?,
    })
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|e| map_sqlx_error("decode_row", e))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Map SQLx errors into `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::storage(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::corrupt(format!("cannot decode column {index} in {operation}: {source}"))
        }
        sqlx::Error::Decode(source) => {
            StoreError::corrupt(format!("cannot decode value in {operation}: {source}"))
        }
        sqlx::Error::ColumnNotFound(column) => {
            StoreError::corrupt(format!("column {column} missing in {operation}"))
        }
        sqlx::Error::PoolClosed => {
            StoreError::storage(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::storage(format!("timed out acquiring a connection in {operation}"))
        }
        sqlx::Error::Io(e) => StoreError::storage(format!("io error in {operation}: {e}")),
        other => StoreError::storage(format!("sqlx error in {operation}: {other}")),
    }
}
