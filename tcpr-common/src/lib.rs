//! # TCPR Common Library
//!
//! Shared code for the TCPR crates including:
//! - Common error type
//! - TOML bootstrap configuration and artifact directory resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
