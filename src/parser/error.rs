use thiserror::Error;

use crate::core::Location;

/// A syntax error with the location at which it was detected.
///
/// Parse errors surface immediately; there is no recovery inside a file.
#[derive(Debug, Clone, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub location: Location,
    pub message: String,
}

impl ParseError {
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}
