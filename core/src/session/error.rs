//! Error types for session operations

use thiserror::Error;

/// Errors talking to a running session
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("workout session has ended")]
    Closed,
}
