//! Typed error hierarchy for barcode intake.
//!
//! `IntakeError` covers every outcome a scan can fail with. The first three
//! variants are expected shop-floor situations and map to client errors;
//! `StorageUnavailable` and `Other` map to server errors.

use thiserror::Error;

/// Errors from decoding a barcode or completing an order item.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Invalid barcode '{barcode}': {reason}")]
    InvalidBarcodeFormat { barcode: String, reason: String },

    #[error("Order detail {id} not found")]
    OrderDetailNotFound { id: i64 },

    #[error("Item index {item_index} exceeds quantity {quantity}")]
    ItemIndexOutOfRange { item_index: u32, quantity: i64 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntakeError {
    pub(crate) fn invalid_barcode(barcode: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBarcodeFormat {
            barcode: barcode.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the outcomes caused by the scanned input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBarcodeFormat { .. }
                | Self::OrderDetailNotFound { .. }
                | Self::ItemIndexOutOfRange { .. }
        )
    }
}
