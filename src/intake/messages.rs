//! Operator-facing wording for scan outcomes.
//!
//! Every outcome has a display message and a shorter spoken one for the
//! text-to-speech side of the client. Wording is per locale; the data fields
//! carried in each message are the same in every locale.

use serde::{Deserialize, Serialize};

use crate::errors::IntakeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::Ru => write!(f, "ru"),
            Locale::En => write!(f, "en"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            _ => anyhow::bail!("Invalid locale '{}'. Valid values: ru, en", s),
        }
    }
}

/// Display and spoken text for one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wording {
    pub message: String,
    pub voice_message: String,
}

impl Locale {
    pub fn completed(&self) -> String {
        match self {
            Locale::Ru => "Изделие успешно оприходовано".to_string(),
            Locale::En => "Item successfully received".to_string(),
        }
    }

    pub fn completed_voice(&self, item_index: u32, order_number: &str, construction: &str) -> String {
        match self {
            Locale::Ru => format!(
                "Изделие номер {} конструкции {} заказа {} готово",
                item_index, construction, order_number
            ),
            Locale::En => format!(
                "Item {} of order {} construction {} ready",
                item_index, order_number, construction
            ),
        }
    }

    /// Wording for a failed scan. Storage and unexpected failures get a
    /// generic text; their details only go to the log.
    pub fn failure(&self, err: &IntakeError) -> Wording {
        match (self, err) {
            (Locale::Ru, IntakeError::InvalidBarcodeFormat { barcode, reason }) => Wording {
                message: format!("Неверный формат штрихкода '{}': {}", barcode, reason),
                voice_message: "Ошибка. Неверный формат штрихкода".to_string(),
            },
            (Locale::En, IntakeError::InvalidBarcodeFormat { barcode, reason }) => Wording {
                message: format!("Invalid barcode '{}': {}", barcode, reason),
                voice_message: "Error. Invalid barcode".to_string(),
            },
            (Locale::Ru, IntakeError::OrderDetailNotFound { id }) => Wording {
                message: format!("Изделие с ID {} не найдено в базе данных", id),
                voice_message: "Изделие не найдено в базе данных".to_string(),
            },
            (Locale::En, IntakeError::OrderDetailNotFound { id }) => Wording {
                message: format!("Order detail {} not found", id),
                voice_message: "Item not found".to_string(),
            },
            (Locale::Ru, IntakeError::ItemIndexOutOfRange { item_index, quantity }) => Wording {
                message: format!(
                    "Номер изделия {} превышает количество {}",
                    item_index, quantity
                ),
                voice_message: format!(
                    "Ошибка. Номер изделия {} превышает количество {}",
                    item_index, quantity
                ),
            },
            (Locale::En, IntakeError::ItemIndexOutOfRange { item_index, quantity }) => Wording {
                message: format!("Item {} exceeds quantity {}", item_index, quantity),
                voice_message: format!("Error. Item {} exceeds quantity {}", item_index, quantity),
            },
            (Locale::Ru, IntakeError::StorageUnavailable(_)) => Wording {
                message: "База данных недоступна".to_string(),
                voice_message: "Ошибка базы данных".to_string(),
            },
            (Locale::En, IntakeError::StorageUnavailable(_)) => Wording {
                message: "Database unavailable".to_string(),
                voice_message: "Database error".to_string(),
            },
            (Locale::Ru, IntakeError::Other(_)) => Wording {
                message: "Внутренняя ошибка сервера".to_string(),
                voice_message: "Неизвестная ошибка".to_string(),
            },
            (Locale::En, IntakeError::Other(_)) => Wording {
                message: "Internal server error".to_string(),
                voice_message: "Unknown error".to_string(),
            },
        }
    }

    /// Wording for a request body that is not `{"barcode": "..."}`.
    pub fn malformed_request(&self) -> Wording {
        match self {
            Locale::Ru => Wording {
                message: "Некорректный запрос: ожидается поле barcode".to_string(),
                voice_message: "Ошибка. Некорректный запрос".to_string(),
            },
            Locale::En => Wording {
                message: "Malformed request: expected a barcode field".to_string(),
                voice_message: "Error. Malformed request".to_string(),
            },
        }
    }
}
