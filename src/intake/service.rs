//! Order completion: turn a decoded scan into a completion mark and a
//! confirmation for the operator.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::messages::Locale;
use super::models::{ConfirmationResult, ProductInfo};
use super::store::OrderStore;
use crate::barcode;
use crate::errors::IntakeError;

#[derive(Clone)]
pub struct CompletionService {
    store: Arc<dyn OrderStore>,
    locale: Locale,
}

impl CompletionService {
    pub fn new(store: Arc<dyn OrderStore>, locale: Locale) -> Self {
        Self { store, locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub async fn store_reachable(&self) -> bool {
        match self.store.ping().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!(error = %e, "Store ping failed");
                false
            }
        }
    }

    /// Decode `barcode` and complete the unit it names.
    pub async fn process_barcode(&self, barcode: &str) -> Result<ConfirmationResult, IntakeError> {
        let decoded = barcode::decode(barcode)?;
        debug!(
            item_index = decoded.item_index,
            order_detail_id = decoded.order_detail_id,
            "Decoded barcode"
        );
        self.complete(decoded.order_detail_id, decoded.item_index)
            .await
    }

    /// Mark unit `item_index` of order detail `order_detail_id` as complete.
    ///
    /// Repeating the call for an already completed unit succeeds with the
    /// same confirmation and writes nothing.
    pub async fn complete(
        &self,
        order_detail_id: i64,
        item_index: u32,
    ) -> Result<ConfirmationResult, IntakeError> {
        let detail = self
            .store
            .find_order_detail(order_detail_id)
            .await
            .map_err(IntakeError::StorageUnavailable)?
            .ok_or(IntakeError::OrderDetailNotFound {
                id: order_detail_id,
            })?;

        if i64::from(item_index) > detail.qty {
            return Err(IntakeError::ItemIndexOutOfRange {
                item_index,
                quantity: detail.qty,
            });
        }

        let existing = self
            .store
            .completion_marked(order_detail_id, item_index)
            .await
            .map_err(IntakeError::StorageUnavailable)?;

        let (already_completed, completed_at) = match existing {
            Some(record) => (true, record.completed_at),
            None => {
                let now = Utc::now();
                let inserted = self
                    .store
                    .mark_completion(order_detail_id, item_index, now)
                    .await
                    .map_err(IntakeError::StorageUnavailable)?;
                if inserted {
                    (false, now)
                } else {
                    // A concurrent scan of the same unit wrote first.
                    let record = self
                        .store
                        .completion_marked(order_detail_id, item_index)
                        .await
                        .map_err(IntakeError::StorageUnavailable)?
                        .ok_or_else(|| {
                            IntakeError::Other(anyhow::anyhow!(
                                "completion for {}/{} vanished after conflicting insert",
                                order_detail_id,
                                item_index
                            ))
                        })?;
                    (true, record.completed_at)
                }
            }
        };

        let progress = self
            .store
            .order_progress(detail.order_id)
            .await
            .map_err(IntakeError::StorageUnavailable)?;

        if already_completed {
            info!(
                order_detail_id,
                item_index,
                order_number = %detail.order_number,
                "Unit was already completed"
            );
        } else {
            info!(
                order_detail_id,
                item_index,
                order_number = %detail.order_number,
                completed = progress.completed,
                total = progress.total,
                "Unit completed"
            );
        }

        Ok(ConfirmationResult {
            success: true,
            message: self.locale.completed(),
            voice_message: self.locale.completed_voice(
                item_index,
                &detail.order_number,
                &detail.construction,
            ),
            already_completed,
            completed_at,
            product_info: ProductInfo::new(&detail, item_index, progress),
        })
    }
}
