//! Field validators shared by the input models.

use super::money::MAX_AMOUNT;
use rust_decimal::Decimal;
use std::borrow::Cow;
use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message));
    err
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("blank", "must not be blank"));
    }
    Ok(())
}

pub(crate) fn positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(error("not_positive", "must be greater than zero"));
    }
    within_limit(value)
}

pub(crate) fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(error("negative", "must not be negative"));
    }
    within_limit(value)
}

fn within_limit(value: &Decimal) -> Result<(), ValidationError> {
    if *value > MAX_AMOUNT {
        return Err(error("too_large", "must not exceed 1,000,000,000,000"));
    }
    Ok(())
}
