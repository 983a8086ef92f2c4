//! Stable error codes shared by every service-level error.
//!
//! Each error enum implements [`ErrorCode`] so the HTTP layer can hand clients
//! a machine-readable code and a retry hint next to the human message.

use serde::{Deserialize, Serialize};

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON body returned for every failed API request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ErrorBody {
    #[must_use]
    pub fn from_error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { code: err.error_code().to_owned(), message: err.to_string(), retryable: err.retryable() }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
