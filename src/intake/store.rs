use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::db::DbHandle;
use super::models::{CompletionRecord, OrderDetail, OrderProgress};

/// Abstraction over the order store the completion service reads and marks.
/// Real implementation: `SqliteStore`. Tests add failing doubles.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Whether the store answers at all.
    async fn ping(&self) -> Result<bool>;

    async fn find_order_detail(&self, id: i64) -> Result<Option<OrderDetail>>;

    async fn completion_marked(
        &self,
        order_detail_id: i64,
        item_index: u32,
    ) -> Result<Option<CompletionRecord>>;

    /// Guarded write: creates the record only if absent. Returns `true` when
    /// this call created it.
    async fn mark_completion(
        &self,
        order_detail_id: i64,
        item_index: u32,
        at: DateTime<Utc>,
    ) -> Result<bool>;

    async fn order_progress(&self, order_id: i64) -> Result<OrderProgress>;
}

/// `OrderStore` over the local SQLite database.
#[derive(Clone)]
pub struct SqliteStore {
    db: DbHandle,
}

impl SqliteStore {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn ping(&self) -> Result<bool> {
        self.db.call(|db| db.ping()).await
    }

    async fn find_order_detail(&self, id: i64) -> Result<Option<OrderDetail>> {
        self.db.call(move |db| db.get_order_detail(id)).await
    }

    async fn completion_marked(
        &self,
        order_detail_id: i64,
        item_index: u32,
    ) -> Result<Option<CompletionRecord>> {
        self.db
            .call(move |db| db.get_completion(order_detail_id, item_index))
            .await
    }

    async fn mark_completion(
        &self,
        order_detail_id: i64,
        item_index: u32,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        self.db
            .call(move |db| db.insert_completion(order_detail_id, item_index, at))
            .await
    }

    async fn order_progress(&self, order_id: i64) -> Result<OrderProgress> {
        self.db.call(move |db| db.order_progress(order_id)).await
    }
}
