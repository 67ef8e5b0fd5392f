//! Key generator factory for multi-dimensional composite keys.
//!
//! This crate is the entry point used by row ingestion and lookup: it takes a
//! table's dimension cardinalities (and optionally its column groups), applies
//! the configured planning mode, and returns a ready-to-share
//! [`KeyCodec`](mdkey_core::KeyCodec).
//!
//! # Example
//!
//! ```
//! use mdkey::{KeyGenConfig, KeyGeneratorFactory};
//! use mdkey_core::PlanMode;
//!
//! let factory = KeyGeneratorFactory::new(KeyGenConfig::new().plan_mode(PlanMode::IncrementedFill));
//! let codec = factory.for_dimensions(&[3, 3, 3]).unwrap();
//!
//! let key = codec.encode(&[2, 0, 1]).unwrap();
//! assert_eq!(codec.decode(&key).unwrap(), vec![2, 0, 1]);
//! ```
//!
//! # Modules
//!
//! - [`config`] - Factory configuration ([`KeyGenConfig`])
//! - [`factory`] - The factory ([`KeyGeneratorFactory`])
//! - [`error`] - Error types ([`enum@Error`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod error;
pub mod factory;

pub use config::KeyGenConfig;
pub use error::{Error, Result};
pub use factory::KeyGeneratorFactory;
