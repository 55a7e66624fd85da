use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use super::models::*;

/// Async-safe handle to the intake database.
///
/// Wraps `IntakeDb` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O never
/// ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<IntakeDb>>,
}

impl DbHandle {
    pub fn new(db: IntakeDb) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(db)),
        }
    }

    /// Run a closure with access to the database on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&IntakeDb) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = db.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
            f(&guard)
        })
        .await
        .context("DB task panicked")?
    }

    /// Acquire the database mutex synchronously so tests can seed rows and
    /// inspect completion records around async calls.
    #[cfg(test)]
    pub fn lock_sync(&self) -> Result<std::sync::MutexGuard<'_, IntakeDb>> {
        self.inner
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }
}

/// Fields for inserting an order line.
#[derive(Debug, Clone)]
pub struct NewOrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub construction: String,
    pub name: String,
    pub qty: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

pub struct IntakeDb {
    conn: Connection,
}

impl IntakeDb {
    /// Open (or create) a SQLite database at the given path and create the schema.
    pub fn new(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        conn.busy_timeout(busy_timeout)
            .context("Failed to set busy timeout")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.create_schema().context("Failed to create schema")?;
        Ok(())
    }

    fn create_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS orders (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    order_number TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                );

                CREATE TABLE IF NOT EXISTS order_details (
                    id INTEGER PRIMARY KEY,
                    order_id INTEGER NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
                    construction TEXT NOT NULL,
                    name TEXT NOT NULL DEFAULT '',
                    qty INTEGER NOT NULL CHECK (qty >= 1),
                    width INTEGER,
                    height INTEGER
                );

                CREATE TABLE IF NOT EXISTS completions (
                    order_detail_id INTEGER NOT NULL REFERENCES order_details(id) ON DELETE CASCADE,
                    item_index INTEGER NOT NULL CHECK (item_index >= 1),
                    completed_at TEXT NOT NULL,
                    PRIMARY KEY (order_detail_id, item_index)
                );

                CREATE INDEX IF NOT EXISTS idx_order_details_order ON order_details(order_id);
                ",
            )
            .context("Failed to create tables")?;
        Ok(())
    }

    pub fn ping(&self) -> Result<bool> {
        let one: i64 = self
            .conn
            .query_row("SELECT 1", [], |row| row.get(0))
            .context("Failed to ping database")?;
        Ok(one == 1)
    }

    // ── Orders ────────────────────────────────────────────────────────

    pub fn create_order(&self, order_number: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO orders (order_number) VALUES (?1)",
                params![order_number],
            )
            .context("Failed to insert order")?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn create_order_detail(&self, detail: &NewOrderDetail) -> Result<OrderDetail> {
        self.conn
            .execute(
                "INSERT INTO order_details (id, order_id, construction, name, qty, width, height)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    detail.id,
                    detail.order_id,
                    detail.construction,
                    detail.name,
                    detail.qty,
                    detail.width,
                    detail.height
                ],
            )
            .context("Failed to insert order detail")?;
        self.get_order_detail(detail.id)?
            .context("Order detail not found after insert")
    }

    pub fn get_order_detail(&self, id: i64) -> Result<Option<OrderDetail>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT d.id, d.order_id, o.order_number, d.construction, d.name, d.qty, d.width, d.height
                 FROM order_details d
                 JOIN orders o ON o.id = d.order_id
                 WHERE d.id = ?1",
            )
            .context("Failed to prepare get_order_detail")?;
        let mut rows = stmt
            .query_map(params![id], |row| {
                Ok(OrderDetail {
                    id: row.get(0)?,
                    order_id: row.get(1)?,
                    order_number: row.get::<_, String>(2)?.trim().to_string(),
                    construction: row.get::<_, String>(3)?.trim().to_string(),
                    name: row.get::<_, String>(4)?.trim().to_string(),
                    qty: row.get(5)?,
                    width: row.get(6)?,
                    height: row.get(7)?,
                })
            })
            .context("Failed to query order detail")?;
        match rows.next() {
            Some(row) => Ok(Some(row.context("Failed to read order detail row")?)),
            None => Ok(None),
        }
    }

    /// Unit totals across every line of an order.
    pub fn order_progress(&self, order_id: i64) -> Result<OrderProgress> {
        let total: i64 = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(qty), 0) FROM order_details WHERE order_id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .context("Failed to count order units")?;
        let completed: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM completions c
                 JOIN order_details d ON d.id = c.order_detail_id
                 WHERE d.order_id = ?1",
                params![order_id],
                |row| row.get(0),
            )
            .context("Failed to count completed units")?;
        Ok(OrderProgress { total, completed })
    }

    // ── Completions ───────────────────────────────────────────────────

    pub fn get_completion(
        &self,
        order_detail_id: i64,
        item_index: u32,
    ) -> Result<Option<CompletionRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT order_detail_id, item_index, completed_at FROM completions
                 WHERE order_detail_id = ?1 AND item_index = ?2",
            )
            .context("Failed to prepare get_completion")?;
        let mut rows = stmt
            .query_map(params![order_detail_id, item_index], |row| {
                Ok(CompletionRow {
                    order_detail_id: row.get(0)?,
                    item_index: row.get(1)?,
                    completed_at: row.get(2)?,
                })
            })
            .context("Failed to query completion")?;
        match rows.next() {
            Some(row) => Ok(Some(
                row.context("Failed to read completion row")?
                    .into_record()?,
            )),
            None => Ok(None),
        }
    }

    /// Mark a unit complete unless it already is. Returns `true` when this
    /// call created the record.
    pub fn insert_completion(
        &self,
        order_detail_id: i64,
        item_index: u32,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let inserted = self
            .conn
            .execute(
                "INSERT INTO completions (order_detail_id, item_index, completed_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(order_detail_id, item_index) DO NOTHING",
                params![order_detail_id, item_index, at.to_rfc3339()],
            )
            .context("Failed to insert completion")?;
        Ok(inserted == 1)
    }

    pub fn list_completions(&self, order_detail_id: i64) -> Result<Vec<CompletionRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT order_detail_id, item_index, completed_at FROM completions
                 WHERE order_detail_id = ?1 ORDER BY item_index",
            )
            .context("Failed to prepare list_completions")?;
        let rows = stmt
            .query_map(params![order_detail_id], |row| {
                Ok(CompletionRow {
                    order_detail_id: row.get(0)?,
                    item_index: row.get(1)?,
                    completed_at: row.get(2)?,
                })
            })
            .context("Failed to query completions")?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.context("Failed to read completion row")?.into_record()?);
        }
        Ok(records)
    }

    /// Insert the sample order used by `init --demo`: order 19561 with
    /// construction 02 (one unit, id 109565) and construction 01 (three
    /// units, id 109564). Returns the order id.
    pub fn seed_demo(&self) -> Result<i64> {
        let order_id = self.create_order("19561")?;
        self.create_order_detail(&NewOrderDetail {
            id: 109564,
            order_id,
            construction: "01".to_string(),
            name: "01".to_string(),
            qty: 3,
            width: Some(900),
            height: Some(1400),
        })?;
        self.create_order_detail(&NewOrderDetail {
            id: 109565,
            order_id,
            construction: "02".to_string(),
            name: "02".to_string(),
            qty: 1,
            width: Some(1200),
            height: Some(1400),
        })?;
        Ok(order_id)
    }
}

/// Intermediate row struct for completions.
struct CompletionRow {
    order_detail_id: i64,
    item_index: u32,
    completed_at: String,
}

impl CompletionRow {
    fn into_record(self) -> Result<CompletionRecord> {
        let completed_at = DateTime::parse_from_rfc3339(&self.completed_at)
            .context("Failed to parse completion timestamp")?
            .with_timezone(&Utc);
        Ok(CompletionRecord {
            order_detail_id: self.order_detail_id,
            item_index: self.item_index,
            completed_at,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Result<(IntakeDb, i64)> {
        let db = IntakeDb::new_in_memory()?;
        let order_id = db.seed_demo()?;
        Ok((db, order_id))
    }

    #[test]
    fn test_create_database_and_schema() -> Result<()> {
        let db = IntakeDb::new_in_memory()?;

        let table_count: i32 = db.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('orders', 'order_details', 'completions')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(table_count, 3, "Expected 3 tables to exist");
        assert!(db.ping()?);

        Ok(())
    }

    #[test]
    fn test_schema_is_idempotent_on_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("intake.db");
        {
            let db = IntakeDb::new(&path, Duration::from_millis(100))?;
            db.seed_demo()?;
        }
        let db = IntakeDb::new(&path, Duration::from_millis(100))?;
        assert!(db.get_order_detail(109565)?.is_some());
        Ok(())
    }

    #[test]
    fn test_get_order_detail_joins_order() -> Result<()> {
        let (db, order_id) = fixture()?;

        let detail = db.get_order_detail(109565)?.expect("detail should exist");
        assert_eq!(detail.order_id, order_id);
        assert_eq!(detail.order_number, "19561");
        assert_eq!(detail.construction, "02");
        assert_eq!(detail.name, "02");
        assert_eq!(detail.qty, 1);
        assert_eq!(detail.width, Some(1200));
        assert_eq!(detail.height, Some(1400));

        Ok(())
    }

    #[test]
    fn test_get_order_detail_missing() -> Result<()> {
        let (db, _) = fixture()?;
        assert!(db.get_order_detail(999999)?.is_none());
        Ok(())
    }

    #[test]
    fn test_get_order_detail_trims_padded_text() -> Result<()> {
        let db = IntakeDb::new_in_memory()?;
        let order_id = db.create_order("19686   ")?;
        db.create_order_detail(&NewOrderDetail {
            id: 137660,
            order_id,
            construction: "01 ".to_string(),
            name: " 01".to_string(),
            qty: 2,
            width: None,
            height: None,
        })?;
        let detail = db.get_order_detail(137660)?.unwrap();
        assert_eq!(detail.order_number, "19686");
        assert_eq!(detail.construction, "01");
        assert_eq!(detail.name, "01");
        Ok(())
    }

    #[test]
    fn test_zero_quantity_rejected() -> Result<()> {
        let db = IntakeDb::new_in_memory()?;
        let order_id = db.create_order("1")?;
        let result = db.create_order_detail(&NewOrderDetail {
            id: 1,
            order_id,
            construction: "01".to_string(),
            name: "01".to_string(),
            qty: 0,
            width: None,
            height: None,
        });
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_insert_completion_is_guarded() -> Result<()> {
        let (db, _) = fixture()?;
        let first_at = Utc::now();

        assert!(db.insert_completion(109565, 1, first_at)?);
        assert!(!db.insert_completion(109565, 1, Utc::now())?);

        let records = db.list_completions(109565)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].item_index, 1);
        assert_eq!(
            records[0].completed_at.timestamp_millis(),
            first_at.timestamp_millis()
        );

        Ok(())
    }

    #[test]
    fn test_get_completion() -> Result<()> {
        let (db, _) = fixture()?;
        assert!(db.get_completion(109564, 2)?.is_none());

        db.insert_completion(109564, 2, Utc::now())?;
        let record = db.get_completion(109564, 2)?.expect("record should exist");
        assert_eq!(record.order_detail_id, 109564);
        assert_eq!(record.item_index, 2);
        assert!(db.get_completion(109564, 1)?.is_none());

        Ok(())
    }

    #[test]
    fn test_completion_requires_existing_detail() -> Result<()> {
        let (db, _) = fixture()?;
        assert!(db.insert_completion(424242, 1, Utc::now()).is_err());
        Ok(())
    }

    #[test]
    fn test_order_progress() -> Result<()> {
        let (db, order_id) = fixture()?;
        assert_eq!(
            db.order_progress(order_id)?,
            OrderProgress {
                total: 4,
                completed: 0
            }
        );

        db.insert_completion(109564, 1, Utc::now())?;
        db.insert_completion(109565, 1, Utc::now())?;
        assert_eq!(db.order_progress(order_id)?.completed, 2);

        assert_eq!(db.order_progress(order_id + 100)?, OrderProgress::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_call_runs_on_blocking_pool() -> Result<()> {
        let handle = DbHandle::new(IntakeDb::new_in_memory()?);
        handle.lock_sync()?.seed_demo()?;
        let detail = handle.call(|db| db.get_order_detail(109565)).await?;
        assert_eq!(detail.map(|d| d.qty), Some(1));
        Ok(())
    }
}
