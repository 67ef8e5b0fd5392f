//! Multi-dimensional key core.
//!
//! This crate turns a row's dimension ordinals into a compact composite key
//! (an "MDKey") and back. Given the cardinality of every dimension it plans
//! the bits each one needs, lays those bits out across bytes, and exposes
//! encode/decode operations over the resulting layout.
//!
//! # Overview
//!
//! - **Planning**: [`plan`](keygen::plan()) computes bit fields from
//!   cardinalities, either one per dimension or with adjacent dimensions
//!   sharing mixed-radix fields
//! - **Alignment**: [`KeyLayout`] places fields MSB-first, padding each
//!   column group to a byte boundary when a [`ColumnSplit`] is given
//! - **Codec**: [`KeyCodec`] encodes ordinal vectors and decodes whole keys
//!   or single dimensions
//!
//! Keys compare as unsigned byte strings in dimension-major order, so a range
//! scan over a dimension prefix needs no decoding.
//!
//! # Example
//!
//! ```
//! use mdkey_core::{ColumnSplit, KeyCodec, PlanMode};
//!
//! let split = ColumnSplit::new([2, 1]);
//! let codec = KeyCodec::from_column_split(&[16, 16, 16], &split, PlanMode::Minimal).unwrap();
//!
//! let key = codec.encode(&[0xA, 0xB, 0xC]).unwrap();
//! assert_eq!(key, vec![0xAB, 0xC0]);
//! assert_eq!(codec.layout().group_byte_range(1), Some(1..2));
//! ```
//!
//! # Modules
//!
//! - [`keygen`] - Planner, aligner and codec
//! - [`error`] - Error types ([`KeyError`])

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod keygen;

// Re-export commonly used types
pub use error::KeyError;
pub use keygen::{BitPlan, ColumnSplit, KeyCodec, KeyLayout, PlanMode};
