//! Unit barcode decoding.
//!
//! A unit barcode is a run of ASCII digits: the first digit is the 1-based
//! index of the unit inside its order-detail batch, the rest is the
//! order-detail identifier. `"1109565"` is unit 1 of order detail 109565.
//!
//! The single-digit index means a batch can address at most 9 units. Larger
//! batches are rejected downstream as out of range, never truncated here.

use std::fmt;
use std::str::FromStr;

use crate::errors::IntakeError;

/// Largest item index a barcode can carry.
pub const MAX_ITEM_INDEX: u32 = 9;

/// A decoded unit barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBarcode {
    pub item_index: u32,
    pub order_detail_id: i64,
}

impl DecodedBarcode {
    /// Canonical barcode text: index digit followed by the id without
    /// leading zeros.
    pub fn encode(&self) -> String {
        format!("{}{}", self.item_index, self.order_detail_id)
    }
}

impl fmt::Display for DecodedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for DecodedBarcode {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode a scanned barcode into item index and order-detail id.
///
/// Surrounding ASCII whitespace is ignored since keyboard-wedge scanners
/// terminate each read with CR/LF. Any other character is a format error.
pub fn decode(barcode: &str) -> Result<DecodedBarcode, IntakeError> {
    let code = barcode.trim_matches(|c: char| c.is_ascii_whitespace());

    if code.is_empty() {
        return Err(IntakeError::invalid_barcode(barcode, "barcode is empty"));
    }
    if !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IntakeError::invalid_barcode(
            barcode,
            "barcode contains non-digit characters",
        ));
    }
    if code.len() < 2 {
        return Err(IntakeError::invalid_barcode(
            barcode,
            "barcode must have at least 2 digits",
        ));
    }

    let (index_digit, id_digits) = code.split_at(1);
    let item_index = u32::from(index_digit.as_bytes()[0] - b'0');
    if !(1..=MAX_ITEM_INDEX).contains(&item_index) {
        return Err(IntakeError::invalid_barcode(
            barcode,
            "item index must be between 1 and 9",
        ));
    }

    let order_detail_id: i64 = id_digits.parse().map_err(|_| {
        IntakeError::invalid_barcode(barcode, "order detail id is too large")
    })?;
    if order_detail_id <= 0 {
        return Err(IntakeError::invalid_barcode(
            barcode,
            "order detail id must be positive",
        ));
    }

    Ok(DecodedBarcode {
        item_index,
        order_detail_id,
    })
}
