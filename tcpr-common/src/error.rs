//! Common error types for TCPR

use thiserror::Error;

/// Common result type for TCPR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TCPR crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or configuration value
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
