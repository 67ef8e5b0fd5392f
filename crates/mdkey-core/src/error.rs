//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while planning, laying out, encoding or decoding composite keys.
///
/// Every variant is a contract violation by the caller (usually a schema
/// mismatch between the layout and the data). No operation mutates shared
/// state before failing, so a failed call leaves the codec untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// A dimension was declared with zero distinct values.
    #[error("invalid cardinality {cardinality} for dimension {dimension}: must be at least 1")]
    InvalidCardinality {
        /// Position of the offending dimension.
        dimension: usize,
        /// The cardinality that was supplied.
        cardinality: u64,
    },

    /// The column split does not partition the dimensions exactly.
    #[error("column split covers {split_total} dimensions, expected {dimensions}")]
    SplitMismatch {
        /// Number of dimensions in the key.
        dimensions: usize,
        /// Sum of the split's group sizes.
        split_total: usize,
    },

    /// An ordinal does not fit the slot reserved for its dimension.
    #[error("ordinal {ordinal} out of range for dimension {dimension} (max {max})")]
    OrdinalOutOfRange {
        /// Position of the offending dimension.
        dimension: usize,
        /// The ordinal that was supplied.
        ordinal: u64,
        /// Largest ordinal the dimension accepts.
        max: u64,
    },

    /// A key handed to a decode operation has the wrong length.
    #[error("key length mismatch: expected {expected} bytes, got {actual}")]
    KeyLengthMismatch {
        /// Packed length of the layout.
        expected: usize,
        /// Length of the supplied key.
        actual: usize,
    },

    /// A dimension index is outside the layout.
    #[error("dimension index {index} out of range ({dimensions} dimensions)")]
    DimensionIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of dimensions in the layout.
        dimensions: usize,
    },

    /// The number of ordinals does not match the number of dimensions.
    #[error("expected {expected} ordinals, got {actual}")]
    DimensionCountMismatch {
        /// Number of dimensions in the layout.
        expected: usize,
        /// Number of ordinals supplied.
        actual: usize,
    },

    /// A raw bit width cannot be held by a 64-bit ordinal.
    #[error("bit width {width} for dimension {dimension} exceeds 64")]
    BitWidthTooLarge {
        /// Position of the offending dimension.
        dimension: usize,
        /// The width that was supplied.
        width: u32,
    },
}

impl KeyError {
    /// Creates a key length mismatch error.
    #[must_use]
    pub const fn key_length(expected: usize, actual: usize) -> Self {
        Self::KeyLengthMismatch { expected, actual }
    }

    /// Creates a dimension index error.
    #[must_use]
    pub const fn dimension_index(index: usize, dimensions: usize) -> Self {
        Self::DimensionIndexOutOfRange { index, dimensions }
    }
}
