//! API-compatible (e.g. de/serialisable) types.
//!
//! Requests are deserialised with every field optional so that missing
//! fields can be reported as validation errors rather than parse failures.
//! Responses use camelCase field names and plain string IDs.

pub mod assignment;
pub mod credentials;
pub mod reminder;
pub mod response;
pub mod submission;

use crate::error::{Error, Result};

/// Return the field's value if it is present and non-empty.
pub(crate) fn required(field: Option<String>, name: &str) -> Result<String> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::BadRequest(format!("Missing required field: {name}"))),
    }
}
