//! Local input validation for auth requests.
//!
//! Validation runs before any network call; a request that fails here
//! never reaches the hosted service.

use crate::error::{GatehouseError, Result};

use super::model::{SignInRequest, SignUpRequest};

/// Minimum accepted password length, matching the hosted service's policy.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Normalizes an email for submission: trimmed and lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validates a registration request.
///
/// # Errors
///
/// Returns a `Validation` error naming the first offending field when a
/// required field is empty or the password is under the minimum length.
pub fn validate_sign_up(request: &SignUpRequest) -> Result<()> {
    require("full_name", &request.full_name)?;
    require("phone", &request.phone)?;
    require("email", &request.email)?;
    require("password", &request.password)?;

    if request.password.len() < MIN_PASSWORD_LEN {
        return Err(GatehouseError::validation(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }

    Ok(())
}

/// Validates a sign-in request.
///
/// # Errors
///
/// Returns a `Validation` error when the email or password is empty.
pub fn validate_sign_in(request: &SignInRequest) -> Result<()> {
    require("email", &request.email)?;
    require("password", &request.password)?;
    Ok(())
}

fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatehouseError::validation(field, "all fields are required"));
    }
    Ok(())
}
