//! Helpers for input validation.
//!
//! The username and password checks are re-exported so the menu can reject
//! bad input before asking for the rest of the registration form.

use crate::{EngineError, Money, ResultEngine};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Usernames are at least 3 ASCII alphanumeric characters.
pub fn validate_username(username: &str) -> ResultEngine<()> {
    if username.chars().count() < MIN_USERNAME_LEN
        || !username.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(EngineError::InvalidInput(format!(
            "username must be at least {MIN_USERNAME_LEN} alphanumeric characters long"
        )));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_display_name(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(
            "display name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn ensure_positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
