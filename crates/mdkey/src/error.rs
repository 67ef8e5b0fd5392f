//! Error types for the key generator factory.
//!
//! This module provides the [`enum@Error`] type returned by the factory and its
//! configuration.

use mdkey_core::KeyError;
use thiserror::Error;

/// Errors that can occur when building key generators.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Config(String),

    /// The schema could not be turned into a key layout.
    #[error("key error: {0}")]
    Key(#[from] KeyError),
}

/// Result type for factory operations.
pub type Result<T> = std::result::Result<T, Error>;
