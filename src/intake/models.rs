use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of a production order, joined with its parent order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub order_id: i64,
    pub order_number: String,
    pub construction: String,
    pub name: String,
    pub qty: i64,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// Completion mark for a single physical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub order_detail_id: i64,
    pub item_index: u32,
    pub completed_at: DateTime<Utc>,
}

/// Unit counts across a whole order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProgress {
    pub total: i64,
    pub completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub order_number: String,
    pub construction_number: String,
    pub item_number: u32,
    pub orderitems_id: i64,
    pub orderitems_name: String,
    pub qty: i64,
    pub element_name: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub grordersdetail_id: i64,
    pub order_id: i64,
    pub total_items_in_order: i64,
    pub approved_items_in_order: i64,
}

impl ProductInfo {
    pub fn new(detail: &OrderDetail, item_index: u32, progress: OrderProgress) -> Self {
        Self {
            order_number: detail.order_number.clone(),
            construction_number: detail.construction.clone(),
            item_number: item_index,
            orderitems_id: detail.id,
            orderitems_name: detail.name.clone(),
            qty: detail.qty,
            element_name: element_label(&detail.order_number, &detail.construction, item_index),
            width: detail.width,
            height: detail.height,
            grordersdetail_id: detail.id,
            order_id: detail.order_id,
            total_items_in_order: progress.total,
            approved_items_in_order: progress.completed,
        }
    }
}

/// Label printed on the unit: `"<order> / <construction> / <item>"`.
pub fn element_label(order_number: &str, construction: &str, item_index: u32) -> String {
    format!("{} / {} / {}", order_number, construction, item_index)
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub success: bool,
    pub message: String,
    pub voice_message: String,
    /// The unit had been marked before this scan; nothing was written.
    pub already_completed: bool,
    pub completed_at: DateTime<Utc>,
    pub product_info: ProductInfo,
}

/// Body of `POST /api/process-barcode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarcodeRequest {
    pub barcode: String,
}

/// Body returned for a failed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    pub voice_message: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database_connected: bool,
    pub api_version: String,
}
