//! Bit-width planning.
//!
//! Turns per-dimension cardinalities into the bit fields a composite key is
//! built from. Planning is a pure function of its inputs: the mode is passed
//! in by the caller and nothing else is consulted.
//!
//! # Modes
//!
//! - [`PlanMode::Minimal`]: one field per dimension, `ceil(log2(cardinality))`
//!   bits wide. A dimension with cardinality 1 takes zero bits.
//! - [`PlanMode::IncrementedFill`]: runs of adjacent dimensions are fused into
//!   a single mixed-radix field, so the slack between a cardinality and the
//!   next power of two is shared with its neighbours instead of wasted.
//!
//! # Fusion rule
//!
//! Dimensions are scanned left to right. A run starts at the first dimension
//! with cardinality above 1 and keeps absorbing the next dimension while the
//! product of the run's cardinalities still fits in a `u64`. A run stops at a
//! cardinality-1 dimension (which keeps its own zero-width field) and at a
//! column-group boundary. The run is stored as
//! `((o0 * c1 + o1) * c2 + o2) ...`, which needs `ceil(log2(c0 * c1 * ...))`
//! bits. That is never more than the sum of the members' minimal widths, and it
//! sorts exactly like the ordinals taken in dimension order.
//!
//! For cardinalities `[3, 3, 3]` the minimal plan needs 6 bits; the fused
//! plan needs `ceil(log2(27)) = 5`.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::split::ColumnSplit;
use crate::error::KeyError;

/// How bit widths are derived from cardinalities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// One independent field per dimension.
    #[default]
    Minimal,
    /// Adjacent dimensions share mixed-radix fields.
    IncrementedFill,
}

impl PlanMode {
    /// Maps the legacy "use incremented fill" flag onto a mode.
    #[inline]
    #[must_use]
    pub const fn from_incremented_fill(enabled: bool) -> Self {
        if enabled {
            Self::IncrementedFill
        } else {
            Self::Minimal
        }
    }

    /// Returns the mode name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::IncrementedFill => "incremented_fill",
        }
    }
}

impl fmt::Display for PlanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One planned bit field: a run of consecutive dimensions and its width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedField {
    pub(crate) dims: Range<usize>,
    pub(crate) width: u32,
}

impl PlannedField {
    /// Returns the dimensions stored in this field.
    #[inline]
    #[must_use]
    pub fn dims(&self) -> Range<usize> {
        self.dims.clone()
    }

    /// Returns the field width in bits.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns true if more than one dimension shares this field.
    #[inline]
    #[must_use]
    pub fn is_fused(&self) -> bool {
        self.dims.len() > 1
    }
}

/// The output of planning: cardinalities and the fields that hold them.
///
/// Fields cover the dimensions in order, without gaps, and never straddle a
/// column-group boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPlan {
    mode: PlanMode,
    cardinalities: Vec<u64>,
    fields: Vec<PlannedField>,
    split: Option<ColumnSplit>,
}

impl BitPlan {
    /// Returns the mode the plan was built with.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> PlanMode {
        self.mode
    }

    /// Returns the cardinalities the plan was built from.
    #[inline]
    #[must_use]
    pub fn cardinalities(&self) -> &[u64] {
        &self.cardinalities
    }

    /// Returns the planned fields in key order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    /// Returns the column split, if the plan is block aligned.
    #[inline]
    #[must_use]
    pub fn split(&self) -> Option<&ColumnSplit> {
        self.split.as_ref()
    }

    /// Returns the number of dimensions.
    #[inline]
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.cardinalities.len()
    }

    /// Returns the width of each field, in key order.
    ///
    /// Under [`PlanMode::Minimal`] this is the per-dimension bit-width vector.
    #[must_use]
    pub fn field_widths(&self) -> Vec<u32> {
        self.fields.iter().map(PlannedField::width).collect()
    }

    /// Returns the number of bits used by all fields, excluding padding.
    #[must_use]
    pub fn total_bits(&self) -> usize {
        self.fields.iter().map(|f| f.width as usize).sum()
    }
}

/// Returns the smallest width that can hold every ordinal below `cardinality`.
///
/// A cardinality of 0 or 1 needs no bits.
#[inline]
#[must_use]
pub const fn minimal_bit_width(cardinality: u64) -> u32 {
    if cardinality <= 1 {
        0
    } else {
        u64::BITS - (cardinality - 1).leading_zeros()
    }
}

/// Computes the minimal bit width of every dimension.
///
/// # Errors
///
/// Returns [`KeyError::InvalidCardinality`] if any cardinality is zero.
pub fn minimal_bit_widths(cardinalities: &[u64]) -> Result<Vec<u32>, KeyError> {
    check_cardinalities(cardinalities)?;
    Ok(cardinalities.iter().map(|&c| minimal_bit_width(c)).collect())
}

/// Plans a flat key over `cardinalities`.
///
/// # Errors
///
/// Returns [`KeyError::InvalidCardinality`] if any cardinality is zero.
pub fn plan(cardinalities: &[u64], mode: PlanMode) -> Result<BitPlan, KeyError> {
    build(cardinalities, None, mode)
}

/// Plans a block-aligned key over `cardinalities`.
///
/// Fused fields never cross a group boundary, so every group can be padded
/// independently by the aligner.
///
/// # Errors
///
/// Returns [`KeyError::InvalidCardinality`] if any cardinality is zero, or
/// [`KeyError::SplitMismatch`] if the split does not cover every dimension.
pub fn plan_grouped(
    cardinalities: &[u64],
    split: &ColumnSplit,
    mode: PlanMode,
) -> Result<BitPlan, KeyError> {
    build(cardinalities, Some(split), mode)
}

fn check_cardinalities(cardinalities: &[u64]) -> Result<(), KeyError> {
    match cardinalities.iter().position(|&c| c == 0) {
        Some(dimension) => Err(KeyError::InvalidCardinality { dimension, cardinality: 0 }),
        None => Ok(()),
    }
}

fn build(
    cardinalities: &[u64],
    split: Option<&ColumnSplit>,
    mode: PlanMode,
) -> Result<BitPlan, KeyError> {
    check_cardinalities(cardinalities)?;
    if let Some(split) = split {
        split.validate(cardinalities.len())?;
    }

    let groups: Vec<Range<usize>> = match split {
        Some(split) => split.ranges().collect(),
        None => vec![0..cardinalities.len()],
    };

    let mut fields = Vec::with_capacity(cardinalities.len());
    for group in groups {
        match mode {
            PlanMode::Minimal => fields.extend(group.map(|dim| PlannedField {
                dims: dim..dim + 1,
                width: minimal_bit_width(cardinalities[dim]),
            })),
            PlanMode::IncrementedFill => fuse_group(cardinalities, group, &mut fields),
        }
    }

    Ok(BitPlan { mode, cardinalities: cardinalities.to_vec(), fields, split: split.cloned() })
}

fn fuse_group(cardinalities: &[u64], group: Range<usize>, out: &mut Vec<PlannedField>) {
    let mut dim = group.start;
    while dim < group.end {
        let start = dim;
        let mut product = cardinalities[dim];
        dim += 1;

        // Constant dimensions carry no information and end a run.
        if product > 1 {
            while dim < group.end && cardinalities[dim] > 1 {
                match product.checked_mul(cardinalities[dim]) {
                    Some(next) => {
                        product = next;
                        dim += 1;
                    }
                    None => break,
                }
            }
        }

        let width = minimal_bit_width(product);
        debug_assert!(
            width <= cardinalities[start..dim].iter().map(|&c| minimal_bit_width(c)).sum::<u32>(),
            "fused field wider than its members"
        );
        out.push(PlannedField { dims: start..dim, width });
    }
}
