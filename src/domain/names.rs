//! User names double as URL path segments, so they are restricted to a
//! character set that never needs percent-encoding.

use thiserror::Error;

pub const MAX_USER_NAME_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserNameError {
    #[error("user name is empty")]
    Empty,
    #[error("user name exceeds {MAX_USER_NAME_LEN} characters")]
    TooLong,
    #[error("user name contains unsupported character `{0}`")]
    InvalidCharacter(char),
    #[error("user name `{0}` is reserved")]
    Reserved(String),
}

/// Validate a user name and return it trimmed.
pub fn validate_user_name(input: &str) -> Result<&str, UserNameError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(UserNameError::Empty);
    }
    if name.chars().count() > MAX_USER_NAME_LEN {
        return Err(UserNameError::TooLong);
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(UserNameError::InvalidCharacter(bad));
    }
    if matches!(name, "." | "..") {
        return Err(UserNameError::Reserved(name.to_string()));
    }
    Ok(name)
}
