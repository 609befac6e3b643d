// pricefeed-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use chrono::SecondsFormat;
use duckdb::{AccessMode, Config, Connection, Row, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::domain::config::IN_MEMORY_DATABASE;
use crate::domain::product::{CleanedRecord, ProductRow};
use crate::domain::reconcile::{ReconcileSummary, RetentionPolicy};
use crate::error::PricefeedError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::Connector;

const CREATE_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    product_id     BIGINT PRIMARY KEY,
    title          VARCHAR,
    description    VARCHAR,
    category       VARCHAR,
    category_group VARCHAR,
    price_usd      DOUBLE,
    price_gbp      DOUBLE,
    is_premium     BOOLEAN,
    image          VARCHAR,
    fetched_at     VARCHAR
);
CREATE INDEX IF NOT EXISTS idx_price_gbp ON products (price_gbp);
CREATE INDEX IF NOT EXISTS idx_category_group ON products (category_group);
";

const CREATE_STAGING: &str = "
CREATE OR REPLACE TEMP TABLE products_staging (
    product_id     BIGINT NOT NULL,
    title          VARCHAR,
    description    VARCHAR,
    category       VARCHAR,
    category_group VARCHAR,
    price_usd      DOUBLE,
    price_gbp      DOUBLE,
    is_premium     BOOLEAN,
    image          VARCHAR,
    fetched_at     VARCHAR
)";

const COLUMNS: &str = "product_id, title, description, category, category_group, \
                       price_usd, price_gbp, is_premium, image, fetched_at";

// Query Surface projection: numeric / boolean NULLs read as 0 / false
const SELECT_ROWS: &str = "
SELECT product_id, title, description, category, category_group,
       COALESCE(price_usd, 0.0)    AS price_usd,
       COALESCE(price_gbp, 0.0)    AS price_gbp,
       COALESCE(is_premium, false) AS is_premium,
       image, fetched_at
FROM products";

/// How long an operation waits for another process to release the database file.
pub const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(10);
const INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const MAX_BACKOFF: Duration = Duration::from_millis(500);

enum Backing {
    /// In-memory database: sessions are clones of one base connection.
    Shared(Arc<Mutex<Connection>>),
    /// Database file: each session opens it and closes it on drop, so the
    /// DuckDB file lock is held for one operation only.
    File { path: String, read_only: bool },
}

/// Product Table on DuckDB.
///
/// Every operation runs on its own session, so readers get MVCC snapshots of the
/// last commit and are never queued behind a reconcile. Writers are serialized
/// by `write_lock`. Across processes, DuckDB's file lock admits either one writer
/// or any number of readers; a session that finds the file locked backs off and
/// retries for up to `lock_wait`.
pub struct DuckDBConnector {
    backing: Backing,
    lock_wait: Duration,
    write_lock: tokio::sync::Mutex<()>,
}

impl DuckDBConnector {
    /// Read-write connector. The file (and its parent directory) is created on
    /// first use.
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let backing = if db_path == IN_MEMORY_DATABASE {
            let conn = Connection::open_in_memory_with_flags(Config::default())?;
            Backing::Shared(Arc::new(Mutex::new(conn)))
        } else {
            if let Some(parent) = Path::new(db_path).parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            Backing::File {
                path: db_path.to_string(),
                read_only: false,
            }
        };
        Ok(Self::with_backing(backing))
    }

    /// Query-only connector for long-lived readers such as the HTTP server.
    /// The file must already hold the schema. `:memory:` behaves as `new`.
    pub fn open_read_only(db_path: &str) -> Result<Self, InfrastructureError> {
        if db_path == IN_MEMORY_DATABASE {
            return Self::new(db_path);
        }
        Ok(Self::with_backing(Backing::File {
            path: db_path.to_string(),
            read_only: true,
        }))
    }

    fn with_backing(backing: Backing) -> Self {
        Self {
            backing,
            lock_wait: DEFAULT_LOCK_WAIT,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_lock_wait(mut self, lock_wait: Duration) -> Self {
        self.lock_wait = lock_wait;
        self
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.backing, Backing::File { read_only: true, .. })
    }

    async fn session(&self) -> Result<Connection, InfrastructureError> {
        match &self.backing {
            Backing::Shared(base) => clone_shared(base),
            Backing::File { path, read_only } => {
                retry_on_lock(self.lock_wait, || open_file(path, *read_only)).await
            }
        }
    }

    /// Runs raw SQL outside of any reconcile. Meant for maintenance and tests.
    pub async fn execute(&self, sql: &str) -> Result<(), InfrastructureError> {
        self.session().await?.execute_batch(sql)?;
        Ok(())
    }
}

fn query_rows(
    conn: &Connection,
    sql: &str,
    args: &[&dyn duckdb::ToSql],
) -> Result<Vec<ProductRow>, InfrastructureError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, map_product_row)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn clone_shared(base: &Mutex<Connection>) -> Result<Connection, InfrastructureError> {
    let base = base
        .lock()
        .map_err(|_| InfrastructureError::Database(DatabaseError::Poisoned))?;
    Ok(base.try_clone()?)
}

fn open_file(path: &str, read_only: bool) -> Result<Connection, InfrastructureError> {
    let mut config = Config::default();
    if read_only {
        config = config.access_mode(AccessMode::ReadOnly)?;
    }
    Ok(Connection::open_with_flags(path, config)?)
}

/// DuckDB reports a file held by another process as an IO error naming the lock.
fn is_lock_conflict(message: &str) -> bool {
    message.contains("Could not set lock") || message.contains("Conflicting lock")
}

/// Retries `open` with exponential backoff while the file is locked by another
/// process, giving up once `max_wait` has elapsed. Other errors fail immediately.
async fn retry_on_lock<T, F>(max_wait: Duration, mut open: F) -> Result<T, InfrastructureError>
where
    F: FnMut() -> Result<T, InfrastructureError>,
{
    let start = Instant::now();
    let mut backoff = INITIAL_BACKOFF;
    let mut attempt = 1u32;

    loop {
        match open() {
            Ok(conn) => {
                if attempt > 1 {
                    debug!(
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Database lock acquired after retry"
                    );
                }
                return Ok(conn);
            }
            Err(e) if is_lock_conflict(&e.to_string()) && start.elapsed() < max_wait => {
                warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "Database file locked by another process, will retry after backoff"
                );
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn map_product_row(row: &Row<'_>) -> duckdb::Result<ProductRow> {
    Ok(ProductRow {
        product_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        category_group: row.get(4)?,
        price_usd: row.get(5)?,
        price_gbp: row.get(6)?,
        is_premium: row.get(7)?,
        image: row.get(8)?,
        fetched_at: row.get(9)?,
    })
}

/// Stage -> count -> merge -> commit, all inside one transaction.
/// Returning early drops the transaction, which rolls it back.
fn merge_snapshot(
    conn: &mut Connection,
    records: &[CleanedRecord],
    retention: RetentionPolicy,
) -> Result<(u64, u64, u64), InfrastructureError> {
    let tx = conn.transaction()?;

    // 1. Stage
    tx.execute_batch(CREATE_STAGING)?;
    {
        let mut insert = tx.prepare(&format!(
            "INSERT INTO products_staging ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            COLUMNS
        ))?;
        for r in records {
            insert.execute(params![
                r.product_id,
                r.title,
                r.description,
                r.category,
                r.category_group.as_str(),
                r.price_usd,
                r.price_gbp,
                r.is_premium,
                r.image,
                r.fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ])?;
        }
    }

    // 2. Classify
    let updated: i64 = tx.query_row(
        "SELECT count(*) FROM products_staging s
         WHERE s.product_id IN (SELECT product_id FROM products)",
        [],
        |row| row.get(0),
    )?;
    let staged: i64 = tx.query_row("SELECT count(*) FROM products_staging", [], |row| {
        row.get(0)
    })?;

    // 3. Merge: replace matching rows, add new ones
    tx.execute(
        "DELETE FROM products WHERE product_id IN (SELECT product_id FROM products_staging)",
        [],
    )?;

    let retired = match retention {
        RetentionPolicy::KeepAll => 0,
        // An empty snapshot says nothing about what is still listed upstream
        RetentionPolicy::PruneMissing if staged == 0 => {
            warn!("Snapshot is empty, skipping prune to keep the existing table");
            0
        }
        RetentionPolicy::PruneMissing => tx.execute(
            "DELETE FROM products WHERE product_id NOT IN (SELECT product_id FROM products_staging)",
            [],
        )?,
    };

    tx.execute(
        &format!(
            "INSERT INTO products ({cols}) SELECT {cols} FROM products_staging",
            cols = COLUMNS
        ),
        [],
    )?;
    tx.execute_batch("DROP TABLE products_staging")?;

    tx.commit()?;

    let updated = updated as u64;
    Ok((staged as u64 - updated, updated, retired as u64))
}

#[async_trait]
impl Connector for DuckDBConnector {
    async fn ensure_schema(&self) -> Result<(), PricefeedError> {
        if self.is_read_only() {
            debug!("Read-only connector, schema left to the writer");
            return Ok(());
        }
        self.execute(CREATE_SCHEMA).await?;
        Ok(())
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn reconcile(
        &self,
        snapshot_id: &str,
        records: &[CleanedRecord],
        retention: RetentionPolicy,
    ) -> Result<ReconcileSummary, PricefeedError> {
        let _writer = self.write_lock.lock().await;
        debug!("Acquired table writer lock");

        let failure = |source: InfrastructureError| PricefeedError::ReconciliationFailure {
            snapshot: snapshot_id.to_string(),
            source,
        };

        let mut conn = self.session().await.map_err(failure)?;
        let (inserted, updated, retired) =
            merge_snapshot(&mut conn, records, retention).map_err(failure)?;

        info!(inserted, updated, retired, "Reconciliation committed");
        Ok(ReconcileSummary {
            snapshot_id: snapshot_id.to_string(),
            inserted,
            updated,
            retired,
        })
    }

    async fn top_by_price(&self, limit: usize) -> Result<Vec<ProductRow>, PricefeedError> {
        // LIMIT is a plain integer, safe to inline
        let sql = format!(
            "SELECT * FROM ({}) ORDER BY price_gbp DESC, product_id ASC LIMIT {}",
            SELECT_ROWS, limit
        );
        let conn = self.session().await?;
        Ok(query_rows(&conn, &sql, &[])?)
    }

    async fn search_price_range(
        &self,
        min: f64,
        max: f64,
    ) -> Result<Vec<ProductRow>, PricefeedError> {
        let sql = format!(
            "SELECT * FROM ({}) WHERE price_gbp BETWEEN ? AND ? ORDER BY price_gbp DESC, product_id ASC",
            SELECT_ROWS
        );
        let conn = self.session().await?;
        Ok(query_rows(&conn, &sql, &[&min, &max])?)
    }

    async fn count(&self) -> Result<u64, PricefeedError> {
        let conn = self.session().await?;
        let count: i64 = conn.query_row("SELECT count(*) FROM products", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}
