//! Multi-dimensional key generation.
//!
//! A composite key concatenates the dictionary ordinal of every dimension of a
//! row into one compact, byte-comparable byte string. Building one takes three
//! steps, each in its own module:
//!
//! - [`plan`](mod@plan) - cardinalities to bit fields ([`PlanMode`] picks the strategy)
//! - [`layout`] - bit fields to byte positions, optionally padded per column
//!   group ([`ColumnSplit`])
//! - [`codec`] - ordinals to keys and back ([`KeyCodec`])
//!
//! The layout is computed once per schema; encoding and decoding only read it.
//!
//! # Example
//!
//! ```
//! use mdkey_core::keygen::{KeyCodec, PlanMode};
//!
//! let codec = KeyCodec::from_cardinalities(&[256, 2], PlanMode::Minimal).unwrap();
//! assert_eq!(codec.key_len(), 2);
//!
//! let key = codec.encode(&[255, 1]).unwrap();
//! assert_eq!(codec.decode(&key).unwrap(), vec![255, 1]);
//! assert_eq!(codec.decode_one(&key, 1).unwrap(), 1);
//! ```

pub mod codec;
pub mod layout;
pub mod plan;
mod split;


pub use codec::KeyCodec;
pub use layout::{DimensionLayout, KeyLayout, MAX_FIELD_WIDTH};
pub use plan::{
    minimal_bit_width, minimal_bit_widths, plan, plan_grouped, BitPlan, PlanMode, PlannedField,
};
pub use split::ColumnSplit;
