// Stock ledger and part catalog
pub mod catalog;
pub mod parts;
pub mod stock_ledger;

// Work orders and their numbering
pub mod work_number;
pub mod work_orders;

// Reference data
pub mod clients;

use crate::errors::ServiceError;

/// Trims `value` and rejects it when nothing is left
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(trimmed.to_string())
}
