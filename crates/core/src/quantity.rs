//! Integral quantities transported as text.

use crate::error::{InventoryError, InventoryResult};

/// Parse a non-negative integer quantity such as a stock count.
///
/// Uploads carry quantities as text (`"12"`); surrounding whitespace is
/// tolerated, anything that is not a whole non-negative number is rejected.
pub fn parse_quantity(field: &str, raw: &str) -> InventoryResult<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::validation(format!("{field} is required")));
    }
    if trimmed.starts_with('-') {
        return Err(InventoryError::validation(format!(
            "{field} cannot be negative (got '{trimmed}')"
        )));
    }
    trimmed.parse::<u64>().map_err(|_| {
        InventoryError::validation(format!("{field} must be a whole number (got '{trimmed}')"))
    })
}
