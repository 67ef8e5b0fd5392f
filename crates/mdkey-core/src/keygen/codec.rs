//! The composite key codec.
//!
//! A [`KeyCodec`] wraps a shared, immutable [`KeyLayout`] and converts between
//! ordinal vectors and packed keys. It holds no mutable state, so one instance
//! can be cloned freely and used from any number of threads at once.
//!
//! Keys sort as unsigned byte strings in dimension-major order: comparing two
//! keys with `<` on `&[u8]` orders them by the first dimension's ordinal, then
//! the second, and so on.

use std::cmp::Ordering;
use std::ops::RangeInclusive;
use std::sync::Arc;

use super::layout::KeyLayout;
use super::plan::{plan, plan_grouped, BitPlan, PlanMode};
use super::split::ColumnSplit;
use crate::error::KeyError;

/// Encodes and decodes composite keys for one layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCodec {
    layout: Arc<KeyLayout>,
}

impl KeyCodec {
    /// Creates a codec over a layout.
    #[must_use]
    pub fn new(layout: KeyLayout) -> Self {
        Self { layout: Arc::new(layout) }
    }

    /// Creates a codec over a plan.
    #[must_use]
    pub fn from_plan(plan: &BitPlan) -> Self {
        Self::new(KeyLayout::from_plan(plan))
    }

    /// Plans and lays out a flat key for `cardinalities`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidCardinality`] if any cardinality is zero.
    pub fn from_cardinalities(cardinalities: &[u64], mode: PlanMode) -> Result<Self, KeyError> {
        Ok(Self::from_plan(&plan(cardinalities, mode)?))
    }

    /// Plans and lays out a block-aligned key for `cardinalities`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidCardinality`] if any cardinality is zero, or
    /// [`KeyError::SplitMismatch`] if the split does not cover every dimension.
    pub fn from_column_split(
        cardinalities: &[u64],
        split: &ColumnSplit,
        mode: PlanMode,
    ) -> Result<Self, KeyError> {
        Ok(Self::from_plan(&plan_grouped(cardinalities, split, mode)?))
    }

    /// Lays out a key from bit widths the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::BitWidthTooLarge`] if a width exceeds 64, or
    /// [`KeyError::SplitMismatch`] if the split does not cover every dimension.
    pub fn from_bit_widths(
        bit_widths: &[u32],
        split: Option<&ColumnSplit>,
    ) -> Result<Self, KeyError> {
        Ok(Self::new(KeyLayout::align(bit_widths, split)?))
    }

    /// Returns the layout.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Returns the packed key length in bytes.
    #[inline]
    #[must_use]
    pub fn key_len(&self) -> usize {
        self.layout.key_len()
    }

    /// Returns the number of dimensions.
    #[inline]
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.layout.dimension_count()
    }

    /// Encodes an ordinal vector into a new key.
    ///
    /// Unused trailing bits are zero.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::DimensionCountMismatch`] if `ordinals` has the wrong
    /// length, or [`KeyError::OrdinalOutOfRange`] naming the first ordinal that
    /// does not fit its dimension.
    pub fn encode(&self, ordinals: &[u64]) -> Result<Vec<u8>, KeyError> {
        let mut key = Vec::with_capacity(self.key_len());
        self.encode_to(ordinals, &mut key)?;
        Ok(key)
    }

    /// Encodes an ordinal vector and appends the key to `buf`.
    ///
    /// `buf` is left untouched on error.
    ///
    /// # Errors
    ///
    /// Same as [`KeyCodec::encode`].
    pub fn encode_to(&self, ordinals: &[u64], buf: &mut Vec<u8>) -> Result<(), KeyError> {
        self.check_arity(ordinals)?;
        self.layout.check_ordinals(ordinals)?;

        let start = buf.len();
        buf.resize(start + self.key_len(), 0);
        self.layout.pack(ordinals, &mut buf[start..]);
        Ok(())
    }

    /// Decodes a key into its ordinal vector.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::KeyLengthMismatch`] if `key` is not exactly
    /// [`KeyCodec::key_len`] bytes.
    pub fn decode(&self, key: &[u8]) -> Result<Vec<u64>, KeyError> {
        self.check_key(key)?;
        Ok((0..self.dimension_count()).map(|dim| self.layout.unpack(key, dim)).collect())
    }

    /// Decodes a single dimension without rebuilding the whole vector.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::KeyLengthMismatch`] if `key` has the wrong length,
    /// or [`KeyError::DimensionIndexOutOfRange`] if `dimension` is not in the
    /// layout.
    pub fn decode_one(&self, key: &[u8], dimension: usize) -> Result<u64, KeyError> {
        self.check_key(key)?;
        self.check_dimension(dimension)?;
        Ok(self.layout.unpack(key, dimension))
    }

    /// Compares two keys of this layout.
    ///
    /// Plain unsigned byte order, which is dimension-major ordinal order.
    #[inline]
    #[must_use]
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    /// Returns a copy of `key` that keeps only the listed dimensions.
    ///
    /// Every other dimension is reset to ordinal 0, so the result is still a
    /// valid key of this layout.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::KeyLengthMismatch`] if `key` has the wrong length,
    /// or [`KeyError::DimensionIndexOutOfRange`] for an unknown dimension.
    pub fn mask_key(&self, key: &[u8], dimensions: &[usize]) -> Result<Vec<u8>, KeyError> {
        self.check_key(key)?;
        let mut ordinals = vec![0u64; self.dimension_count()];
        for &dim in dimensions {
            self.check_dimension(dim)?;
            ordinals[dim] = self.layout.unpack(key, dim);
        }

        let mut masked = vec![0u8; self.key_len()];
        self.layout.pack(&ordinals, &mut masked);
        Ok(masked)
    }

    /// Returns the inclusive key range holding every key that starts with
    /// `prefix`.
    ///
    /// The low bound pads the prefix with ordinal 0, the high bound with each
    /// remaining dimension's largest ordinal. An empty prefix spans the whole
    /// key space.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::DimensionCountMismatch`] if the prefix is longer
    /// than the key, or [`KeyError::OrdinalOutOfRange`] for an ordinal that
    /// does not fit its dimension.
    pub fn prefix_range(&self, prefix: &[u64]) -> Result<RangeInclusive<Vec<u8>>, KeyError> {
        self.layout.check_ordinals(prefix)?;

        let mut low = prefix.to_vec();
        low.resize(self.dimension_count(), 0);
        let mut high = prefix.to_vec();
        high.extend(self.layout.max_ordinals().skip(prefix.len()));

        let mut low_key = vec![0u8; self.key_len()];
        let mut high_key = vec![0u8; self.key_len()];
        self.layout.pack(&low, &mut low_key);
        self.layout.pack(&high, &mut high_key);
        Ok(low_key..=high_key)
    }

    fn check_arity(&self, ordinals: &[u64]) -> Result<(), KeyError> {
        if ordinals.len() == self.dimension_count() {
            Ok(())
        } else {
            Err(KeyError::DimensionCountMismatch {
                expected: self.dimension_count(),
                actual: ordinals.len(),
            })
        }
    }

    fn check_key(&self, key: &[u8]) -> Result<(), KeyError> {
        if key.len() == self.key_len() {
            Ok(())
        } else {
            Err(KeyError::key_length(self.key_len(), key.len()))
        }
    }

    fn check_dimension(&self, dimension: usize) -> Result<(), KeyError> {
        if dimension < self.dimension_count() {
            Ok(())
        } else {
            Err(KeyError::dimension_index(dimension, self.dimension_count()))
        }
    }
}
