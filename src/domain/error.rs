use thiserror::Error;

use super::names::UserNameError;

/// Input that can never form a valid record, independent of storage.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error(transparent)]
    UserName(#[from] UserNameError),
    #[error("{field} must not be empty")]
    Blank { field: &'static str },
    #[error("latitude {0} must be between -90 and 90")]
    Latitude(f64),
    #[error("longitude {0} must be between -180 and 180")]
    Longitude(f64),
}

impl DomainError {
    pub fn blank(field: &'static str) -> Self {
        Self::Blank { field }
    }
}

/// Trim `value`, rejecting what is left if it is empty.
pub fn non_blank<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DomainError> {
    match value.trim() {
        "" => Err(DomainError::blank(field)),
        trimmed => Ok(trimmed),
    }
}

/// NaN and infinities fall outside both ranges.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), DomainError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::Latitude(latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::Longitude(longitude));
    }
    Ok(())
}
