//! Field rules shared by the product and ledger entities.

use rust_decimal::Decimal;

use crate::errors::ModelError;

pub fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), ModelError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(ModelError::Validation(format!("{field} longer than {max_len} characters")));
    }
    Ok(())
}

pub fn non_negative_amount(field: &str, value: Decimal) -> Result<(), ModelError> {
    if value < Decimal::ZERO {
        return Err(ModelError::Validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

pub fn non_negative_count(field: &str, value: i32) -> Result<(), ModelError> {
    if value < 0 {
        return Err(ModelError::Validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

pub fn positive_count(field: &str, value: i32) -> Result<(), ModelError> {
    if value <= 0 {
        return Err(ModelError::Validation(format!("{field} must be > 0")));
    }
    Ok(())
}
