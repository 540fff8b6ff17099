//! Client-side checks run before any request is sent.
//!
//! Every failure is an `ApiError::Validation` carrying the message to show
//! the user.

use reqwest::Url;

use crate::api::ApiError;
use crate::models::Location;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Name of the reset link query parameter carrying the one-time token
const RESET_TOKEN_PARAM: &str = "token";

fn invalid(message: &str) -> ApiError {
    ApiError::Validation(message.to_string())
}

/// Require a non-blank value, returning it trimmed
pub fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("Please enter {}.", field)));
    }
    Ok(trimmed)
}

pub fn email(value: &str) -> Result<&str, ApiError> {
    let value = require(value, "your email address")?;
    let well_formed = match value.split_once('@') {
        Some((user, domain)) => !user.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !well_formed || value.contains(char::is_whitespace) {
        return Err(invalid("Please enter a valid email address."));
    }
    Ok(value)
}

/// Passwords are sent as typed; only emptiness is checked.
pub fn password(value: &str) -> Result<&str, ApiError> {
    if value.is_empty() {
        return Err(invalid("Please enter a password."));
    }
    Ok(value)
}

/// Rules for a password being chosen (sign-up and reset), on top of `password`
pub fn password_policy(value: &str) -> Result<&str, ApiError> {
    password(value)?;
    if value.chars().count() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at most {} characters.",
            MAX_PASSWORD_LENGTH
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid("Password contains invalid characters."));
    }
    Ok(value)
}

/// Check a new password against its confirmation
pub fn new_password<'a>(new_password: &'a str, confirm: &str) -> Result<&'a str, ApiError> {
    password_policy(new_password)?;
    if new_password != confirm {
        return Err(invalid("Passwords do not match"));
    }
    Ok(new_password)
}

pub fn location(location: Location) -> Result<Location, ApiError> {
    if !location.is_valid() {
        return Err(invalid(
            "Please ensure a valid location is available (latitude -90..90, longitude -180..180).",
        ));
    }
    Ok(location)
}

/// Extract the reset token from a reset link, a bare query string, or a raw token.
///
/// `https://app/reset-password?token=abc`, `?token=abc`, `token=abc` and `abc`
/// all yield `abc`. Any other input without whitespace is taken as the token
/// itself, `=` padding included. A link without a non-empty `token` parameter
/// is invalid.
pub fn reset_token(input: &str) -> Result<String, ApiError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(invalid("Invalid token"));
    }

    let url = if input.contains("://") {
        Url::parse(input).map_err(|_| invalid("Invalid token"))?
    } else if input.starts_with('?') || input.starts_with("token=") {
        let query = input.trim_start_matches('?');
        Url::parse(&format!("http://localhost/?{}", query)).map_err(|_| invalid("Invalid token"))?
    } else if input.contains(char::is_whitespace) {
        return Err(invalid("Invalid token"));
    } else {
        return Ok(input.to_string());
    };

    url.query_pairs()
        .find(|(key, _)| key == RESET_TOKEN_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| invalid("Invalid token"))
}
