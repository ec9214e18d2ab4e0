//! # Error Taxonomy
//!
//! Every fallible operation in the planner returns [`TrekError`]. There are only
//! two failure classes:
//!
//! - **Invalid input**: caller arguments that are malformed or out of range
//!   (unknown section, end date before start date, non-positive speed, ...).
//!   These are always detected before any network I/O happens.
//! - **Upstream**: the NOAA prediction service was unreachable, answered with a
//!   non-success status, or embedded an error object in its response.
//!
//! An infeasible trip is *not* an error. Empty passability windows, empty
//! campsite lists and empty itineraries are returned as `Ok(vec![])`.

use thiserror::Error;

/// Errors raised by the trail registry, tide pipeline and route search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrekError {
    /// Caller supplied a malformed or out-of-range argument.
    ///
    /// The message is displayed verbatim so a boundary layer can forward it
    /// as a client-error body.
    #[error("{0}")]
    InvalidInput(String),

    /// Tide prediction service failed or returned an error payload
    #[error("tide service error: {0}")]
    Upstream(String),
}

impl TrekError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        TrekError::InvalidInput(message.into())
    }

    pub(crate) fn upstream(message: impl Into<String>) -> Self {
        TrekError::Upstream(message.into())
    }

    /// True for caller mistakes, false for upstream failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, TrekError::InvalidInput(_))
    }
}

impl From<reqwest::Error> for TrekError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => TrekError::upstream(format!("status code: {}", status.as_u16())),
            None => TrekError::upstream(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TrekError {
    fn from(err: serde_json::Error) -> Self {
        TrekError::upstream(format!("malformed response: {err}"))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TrekError>;
