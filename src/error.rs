//! Error codes shared by every HTTP-facing service error.
//!
//! DESIGN
//! ======
//! Each service keeps its own `thiserror` enum. Implementing `ErrorCode` gives
//! the enum a stable, grepable code and a retry hint; the routes layer turns
//! any such error into a JSON body of `{code, message, retryable}`.

use serde::Serialize;

/// Trait for service errors that can be reported to API clients.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Wire shape of an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    /// Build an error body from any `ErrorCode` implementor.
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code().to_owned(), message: err.to_string(), retryable: err.retryable() }
    }

    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self { code: code.to_owned(), message: message.into(), retryable: false }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
