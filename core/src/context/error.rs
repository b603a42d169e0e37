//! Error types for context operations

use thiserror::Error;

/// Errors during configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[source] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}
