//! Request validation.
//!
//! Checks the caller-supplied option combination before anything is handed
//! to geom. The class and command are enums, so only the free-form device
//! filter needs inspection.
//!
//! # Examples
//!
//! ```
//! use geomscan_core::*;
//!
//! let ok = GeomRequest::new(GeomCommand::List, DeviceClass::Part).with_device("ada0");
//! assert!(validate_request(&ok).is_ok());
//!
//! let bad = GeomRequest::new(GeomCommand::List, DeviceClass::Part).with_device("ada0; reboot");
//! assert!(validate_request(&bad).is_err());
//! ```

use thiserror::Error;

use crate::GeomRequest;

/// Request validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Device filter is empty or whitespace-only.
    #[error("device name cannot be empty")]
    EmptyDevice,
    /// Device filter contains whitespace.
    #[error("device name contains whitespace: {0:?}")]
    DeviceWhitespace(String),
    /// Device filter would be read as a geom option.
    #[error("device name cannot start with '-': {0}")]
    DeviceLooksLikeOption(String),
    /// Device filter contains shell metacharacters.
    #[error("device name contains shell metacharacters: {0}")]
    DeviceMetacharacters(String),
}

/// Validates the device filter of a request, if any.
pub fn validate_request(request: &GeomRequest) -> Result<(), ValidationError> {
    match request.device.as_deref() {
        Some(device) => validate_device(device),
        None => Ok(()),
    }
}

/// Validates a single device name such as `ada0`, `mirror/gm0` or `gpt/boot`.
pub fn validate_device(device: &str) -> Result<(), ValidationError> {
    if device.trim().is_empty() {
        return Err(ValidationError::EmptyDevice);
    }
    if device.chars().any(char::is_whitespace) {
        return Err(ValidationError::DeviceWhitespace(device.to_string()));
    }
    if device.starts_with('-') {
        return Err(ValidationError::DeviceLooksLikeOption(device.to_string()));
    }
    if contains_shell_metacharacters(device) {
        return Err(ValidationError::DeviceMetacharacters(device.to_string()));
    }
    Ok(())
}

fn contains_shell_metacharacters(s: &str) -> bool {
    s.chars().any(|ch| {
        matches!(
            ch,
            ';' | '&' | '|' | '$' | '`' | '(' | ')' | '<' | '>' | '\\' | '"' | '\'' | '*' | '?'
                | '[' | ']' | '{' | '}' | '!' | '#' | '~'
        )
    })
}
