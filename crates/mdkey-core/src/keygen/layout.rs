//! Block alignment: placing bit fields inside the packed key.
//!
//! A [`KeyLayout`] is a flat table with one record per field (bit offset,
//! width, byte span, shift and mask) and one record per dimension (which field
//! holds it and how to pull its digit out). Fields are packed
//! most-significant-bit first, in dimension order. With a column split every
//! group starts on a byte boundary; the unused bits at the end of the previous
//! group stay zero.
//!
//! ```text
//! widths [4, 4, 4], split [2, 1]
//!
//! byte 0            byte 1
//! [dim0 ][dim1 ]    [dim2 ][pad  ]
//!  7..4   3..0       7..4   3..0
//! ```

use std::ops::Range;

use super::plan::{BitPlan, PlannedField};
use super::split::ColumnSplit;
use crate::error::KeyError;

/// Widest field a layout supports; ordinals are `u64`.
pub const MAX_FIELD_WIDTH: u32 = u64::BITS;

/// How a dimension's ordinal is stored inside its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Digit {
    /// The field holds this dimension alone.
    Whole,
    /// The field is a mixed-radix number; this dimension is one digit of it.
    Radix {
        /// Cardinality of the dimension.
        radix: u64,
        /// Product of the radices of the digits after this one.
        divisor: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSlot {
    dims: Range<usize>,
    bit_offset: usize,
    width: u32,
    byte_start: usize,
    byte_end: usize,
    shift: u32,
    mask: u64,
}

impl FieldSlot {
    fn place(field: &PlannedField, bit_offset: usize) -> Self {
        let width = field.width;
        let end_bit = bit_offset + width as usize;
        let byte_start = bit_offset / 8;
        let (byte_end, shift) = if width == 0 {
            (byte_start, 0)
        } else {
            let byte_end = end_bit.div_ceil(8);
            (byte_end, (byte_end * 8 - end_bit) as u32)
        };
        Self {
            dims: field.dims.clone(),
            bit_offset,
            width,
            byte_start,
            byte_end,
            shift,
            mask: low_mask(width),
        }
    }

    /// Reads the field value: load its bytes big-endian, shift, mask.
    #[inline]
    fn read(&self, key: &[u8]) -> u64 {
        let acc = key[self.byte_start..self.byte_end]
            .iter()
            .fold(0u128, |acc, &byte| (acc << 8) | u128::from(byte));
        ((acc >> self.shift) as u64) & self.mask
    }

    /// ORs the field value into a zeroed key.
    #[inline]
    fn write(&self, key: &mut [u8], value: u64) {
        let span = self.byte_end - self.byte_start;
        let acc = u128::from(value & self.mask) << self.shift;
        for (i, byte) in key[self.byte_start..self.byte_end].iter_mut().enumerate() {
            *byte |= (acc >> (8 * (span - 1 - i))) as u8;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DimSlot {
    field: usize,
    max: u64,
    digit: Digit,
}

/// Public view of where one dimension lives in the key.
///
/// When `shared` is true the dimension is one digit of a mixed-radix field:
/// `bit_offset`, `bit_width` and `mask` then describe the whole shared field,
/// and the ordinal is recovered from the field value by division and
/// remainder rather than by masking alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionLayout {
    /// Absolute bit offset of the field holding the dimension (bit 0 is the
    /// most significant bit of byte 0).
    pub bit_offset: usize,
    /// Width of that field in bits.
    pub bit_width: u32,
    /// Mask applied to the field after shifting.
    pub mask: u64,
    /// Largest ordinal the dimension accepts.
    pub max_ordinal: u64,
    /// True if the field is shared with neighbouring dimensions.
    pub shared: bool,
}

/// Immutable description of how ordinals are packed into a composite key.
///
/// Built once per schema and never modified; all tables are boxed slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    fields: Box<[FieldSlot]>,
    dims: Box<[DimSlot]>,
    group_starts: Box<[usize]>,
    key_len: usize,
    total_bits: usize,
    split: bool,
}

impl KeyLayout {
    /// Lays out one field per dimension from raw bit widths.
    ///
    /// Each dimension accepts any ordinal that fits in its width.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::BitWidthTooLarge`] if a width exceeds 64, or
    /// [`KeyError::SplitMismatch`] if the split does not cover every dimension.
    pub fn align(bit_widths: &[u32], split: Option<&ColumnSplit>) -> Result<Self, KeyError> {
        if let Some((dimension, &width)) =
            bit_widths.iter().enumerate().find(|&(_, &w)| w > MAX_FIELD_WIDTH)
        {
            return Err(KeyError::BitWidthTooLarge { dimension, width });
        }
        if let Some(split) = split {
            split.validate(bit_widths.len())?;
        }

        let planned: Vec<PlannedField> = bit_widths
            .iter()
            .enumerate()
            .map(|(dim, &width)| PlannedField { dims: dim..dim + 1, width })
            .collect();
        let digits = bit_widths.iter().map(|&w| (low_mask(w), Digit::Whole)).collect();

        Ok(Self::assemble(&planned, digits, split))
    }

    /// Lays out a plan.
    ///
    /// Each dimension accepts ordinals below its cardinality.
    #[must_use]
    pub fn from_plan(plan: &BitPlan) -> Self {
        let cardinalities = plan.cardinalities();
        let mut digits = vec![(0, Digit::Whole); cardinalities.len()];

        for field in plan.fields() {
            if field.is_fused() {
                let mut divisor = 1u64;
                for dim in field.dims().rev() {
                    let radix = cardinalities[dim];
                    digits[dim] = (radix - 1, Digit::Radix { radix, divisor });
                    divisor = divisor.saturating_mul(radix);
                }
            } else {
                let dim = field.dims.start;
                digits[dim] = (cardinalities[dim].saturating_sub(1), Digit::Whole);
            }
        }

        Self::assemble(plan.fields(), digits, plan.split())
    }

    fn assemble(
        planned: &[PlannedField],
        digits: Vec<(u64, Digit)>,
        split: Option<&ColumnSplit>,
    ) -> Self {
        let dimension_count = digits.len();
        let groups: Vec<Range<usize>> = match split {
            Some(split) => split.ranges().collect(),
            None => vec![0..dimension_count],
        };

        let mut fields = Vec::with_capacity(planned.len());
        let mut group_starts = Vec::with_capacity(groups.len());
        let mut cursor = 0usize;
        let mut pending = planned.iter().peekable();

        for group in &groups {
            cursor = cursor.next_multiple_of(8);
            group_starts.push(cursor / 8);
            while let Some(field) = pending.next_if(|f| f.dims.start < group.end) {
                fields.push(FieldSlot::place(field, cursor));
                cursor += field.width as usize;
            }
        }
        debug_assert!(pending.next().is_none(), "fields outside every group");

        let mut dims = Vec::with_capacity(dimension_count);
        for (index, field) in fields.iter().enumerate() {
            for dim in field.dims.clone() {
                let (max, digit) = digits[dim];
                dims.push(DimSlot { field: index, max, digit });
            }
        }

        Self {
            total_bits: fields.iter().map(|f| f.width as usize).sum(),
            fields: fields.into_boxed_slice(),
            dims: dims.into_boxed_slice(),
            group_starts: group_starts.into_boxed_slice(),
            key_len: cursor.div_ceil(8),
            split: split.is_some(),
        }
    }

    /// Returns the number of dimensions.
    #[inline]
    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.dims.len()
    }

    /// Returns the number of bit fields.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns the packed key length in bytes.
    #[inline]
    #[must_use]
    pub const fn key_len(&self) -> usize {
        self.key_len
    }

    /// Returns the bits used by fields, excluding group and trailing padding.
    #[inline]
    #[must_use]
    pub const fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Returns true if the layout was built with a column split.
    #[inline]
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.split
    }

    /// Returns the number of byte-aligned groups (1 for an unsplit layout).
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_starts.len()
    }

    /// Returns the byte range of a group.
    #[must_use]
    pub fn group_byte_range(&self, group: usize) -> Option<Range<usize>> {
        let start = *self.group_starts.get(group)?;
        let end = self.group_starts.get(group + 1).copied().unwrap_or(self.key_len);
        Some(start..end)
    }

    /// Returns where a dimension lives in the key.
    #[must_use]
    pub fn dimension(&self, index: usize) -> Option<DimensionLayout> {
        let slot = self.dims.get(index)?;
        let field = &self.fields[slot.field];
        Some(DimensionLayout {
            bit_offset: field.bit_offset,
            bit_width: field.width,
            mask: field.mask,
            max_ordinal: slot.max,
            shared: field.dims.len() > 1,
        })
    }

    /// Returns the bytes of the key that hold a dimension's bits.
    ///
    /// The range is empty for a zero-width dimension.
    #[must_use]
    pub fn dimension_byte_range(&self, index: usize) -> Option<Range<usize>> {
        let slot = self.dims.get(index)?;
        let field = &self.fields[slot.field];
        Some(field.byte_start..field.byte_end)
    }

    /// Checks that `ordinals`, a full vector or a leading prefix, fits this layout.
    pub(crate) fn check_ordinals(&self, ordinals: &[u64]) -> Result<(), KeyError> {
        if ordinals.len() > self.dims.len() {
            return Err(KeyError::DimensionCountMismatch {
                expected: self.dims.len(),
                actual: ordinals.len(),
            });
        }
        for (dimension, (&ordinal, slot)) in ordinals.iter().zip(self.dims.iter()).enumerate() {
            if ordinal > slot.max {
                return Err(KeyError::OrdinalOutOfRange { dimension, ordinal, max: slot.max });
            }
        }
        Ok(())
    }

    /// Returns the largest ordinal of every dimension.
    pub(crate) fn max_ordinals(&self) -> impl Iterator<Item = u64> + '_ {
        self.dims.iter().map(|slot| slot.max)
    }

    /// Packs `ordinals` into `key`, which must be zeroed and `key_len` long.
    ///
    /// Ordinals are assumed to have passed [`Self::check_ordinals`].
    pub(crate) fn pack(&self, ordinals: &[u64], key: &mut [u8]) {
        debug_assert_eq!(key.len(), self.key_len);
        for field in self.fields.iter().filter(|f| f.width > 0) {
            let value = field.dims.clone().fold(0u64, |acc, dim| match self.dims[dim].digit {
                Digit::Whole => ordinals[dim],
                Digit::Radix { radix, .. } => acc * radix + ordinals[dim],
            });
            field.write(key, value);
        }
    }

    /// Extracts one dimension's ordinal from a key of the right length.
    #[inline]
    pub(crate) fn unpack(&self, key: &[u8], index: usize) -> u64 {
        let slot = &self.dims[index];
        let value = self.fields[slot.field].read(key);
        match slot.digit {
            Digit::Whole => value,
            Digit::Radix { radix, divisor } => (value / divisor) % radix,
        }
    }
}

#[inline]
const fn low_mask(width: u32) -> u64 {
    if width >= MAX_FIELD_WIDTH {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::plan::{plan, plan_grouped, PlanMode};

    #[test]
    fn flat_layout_packs_contiguously() {
        let layout = KeyLayout::align(&[8, 1], None).unwrap();
        assert_eq!(layout.key_len(), 2);
        assert_eq!(layout.total_bits(), 9);
        assert_eq!(layout.group_count(), 1);
        assert!(!layout.is_split());

        let dim1 = layout.dimension(1).unwrap();
        assert_eq!(dim1.bit_offset, 8);
        assert_eq!(dim1.bit_width, 1);
        assert_eq!(dim1.mask, 1);
        assert_eq!(layout.dimension_byte_range(0), Some(0..1));
        assert_eq!(layout.dimension_byte_range(1), Some(1..2));
    }

    #[test]
    fn split_layout_pads_each_group() {
        let split = ColumnSplit::new([2, 1]);
        let layout = KeyLayout::align(&[4, 4, 4], Some(&split)).unwrap();
        assert_eq!(layout.key_len(), 2);
        assert_eq!(layout.group_byte_range(0), Some(0..1));
        assert_eq!(layout.group_byte_range(1), Some(1..2));
        assert_eq!(layout.group_byte_range(2), None);
        assert_eq!(layout.dimension(2).unwrap().bit_offset, 8);
    }

    #[test]
    fn split_layout_starts_group_on_fresh_byte() {
        let split = ColumnSplit::new([1, 1]);
        let layout = KeyLayout::align(&[3, 3], Some(&split)).unwrap();
        assert_eq!(layout.key_len(), 2);
        assert_eq!(layout.total_bits(), 6);
        assert_eq!(layout.dimension(1).unwrap().bit_offset, 8);

        // Without a split both fields share byte 0.
        let flat = KeyLayout::align(&[3, 3], None).unwrap();
        assert_eq!(flat.key_len(), 1);
        assert_eq!(flat.dimension(1).unwrap().bit_offset, 3);
    }

    #[test]
    fn zero_width_dimensions_take_no_bytes() {
        let layout = KeyLayout::align(&[0, 0, 0], None).unwrap();
        assert_eq!(layout.key_len(), 0);
        assert_eq!(layout.dimension_byte_range(1), Some(0..0));

        let mixed = KeyLayout::align(&[3, 0, 5], None).unwrap();
        assert_eq!(mixed.key_len(), 1);
        assert_eq!(mixed.dimension_byte_range(1), Some(0..0));
        assert_eq!(mixed.dimension(2).unwrap().bit_offset, 3);
    }

    #[test]
    fn field_spanning_bytes() {
        let layout = KeyLayout::align(&[3, 12, 64], None).unwrap();
        assert_eq!(layout.dimension_byte_range(1), Some(0..2));
        assert_eq!(layout.dimension_byte_range(2), Some(1..10));
        assert_eq!(layout.key_len(), 10);
        assert_eq!(layout.dimension(2).unwrap().mask, u64::MAX);
    }

    #[test]
    fn align_rejects_bad_input() {
        assert_eq!(
            KeyLayout::align(&[8, 65], None),
            Err(KeyError::BitWidthTooLarge { dimension: 1, width: 65 })
        );
        let split = ColumnSplit::new([1]);
        assert_eq!(
            KeyLayout::align(&[8, 8], Some(&split)),
            Err(KeyError::SplitMismatch { dimensions: 2, split_total: 1 })
        );
    }

    #[test]
    fn planned_layout_bounds_by_cardinality() {
        let layout = KeyLayout::from_plan(&plan(&[3, 256], PlanMode::Minimal).unwrap());
        assert_eq!(layout.dimension(0).unwrap().max_ordinal, 2);
        assert_eq!(layout.dimension(1).unwrap().max_ordinal, 255);

        let raw = KeyLayout::align(&[2, 8], None).unwrap();
        assert_eq!(raw.dimension(0).unwrap().max_ordinal, 3);
    }

    #[test]
    fn fused_layout_shares_one_field() {
        let layout = KeyLayout::from_plan(&plan(&[3, 3, 3], PlanMode::IncrementedFill).unwrap());
        assert_eq!(layout.field_count(), 1);
        assert_eq!(layout.total_bits(), 5);
        assert_eq!(layout.key_len(), 1);
        for dim in 0..3 {
            let view = layout.dimension(dim).unwrap();
            assert!(view.shared);
            assert_eq!(view.bit_width, 5);
            assert_eq!(view.max_ordinal, 2);
        }
    }

    #[test]
    fn grouped_plan_layout() {
        let split = ColumnSplit::new([2, 1]);
        let plan = plan_grouped(&[16, 16, 16], &split, PlanMode::Minimal).unwrap();
        let layout = KeyLayout::from_plan(&plan);
        assert!(layout.is_split());
        assert_eq!(layout.group_byte_range(0), Some(0..1));
        assert_eq!(layout.group_byte_range(1), Some(1..2));
    }

    #[test]
    fn empty_groups_collapse() {
        let split = ColumnSplit::new([0, 2, 0]);
        let layout = KeyLayout::align(&[4, 4], Some(&split)).unwrap();
        assert_eq!(layout.key_len(), 1);
        assert_eq!(layout.group_byte_range(0), Some(0..0));
        assert_eq!(layout.group_byte_range(1), Some(0..1));
        assert_eq!(layout.group_byte_range(2), Some(1..1));
    }

    #[test]
    fn pack_and_unpack_fields() {
        let layout = KeyLayout::align(&[3, 12, 64], None).unwrap();
        let ordinals = [5, 0xABC, u64::MAX - 7];
        let mut key = vec![0u8; layout.key_len()];
        layout.pack(&ordinals, &mut key);
        for (dim, &ordinal) in ordinals.iter().enumerate() {
            assert_eq!(layout.unpack(&key, dim), ordinal);
        }
    }
}
