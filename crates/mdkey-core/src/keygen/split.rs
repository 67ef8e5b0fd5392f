//! Column-group splits.
//!
//! A split groups consecutive dimensions into physical blocks. Each block is
//! padded to a whole number of bytes inside the composite key so that a
//! storage column-group can slice its bytes out without bit shifting.

use std::ops::Range;

use crate::error::KeyError;

/// Grouping of consecutive dimensions into byte-aligned blocks.
///
/// Group sizes are counts of dimensions, in dimension order. A split is only
/// meaningful against a key whose dimension count equals the sum of the
/// group sizes; [`ColumnSplit::validate`] checks that.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnSplit {
    groups: Vec<usize>,
}

impl ColumnSplit {
    /// Creates a split from group sizes.
    #[must_use]
    pub fn new(groups: impl Into<Vec<usize>>) -> Self {
        Self { groups: groups.into() }
    }

    /// Creates a split that puts every dimension in its own block.
    #[must_use]
    pub fn per_dimension(dimensions: usize) -> Self {
        Self { groups: vec![1; dimensions] }
    }

    /// Returns the group sizes.
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[usize] {
        &self.groups
    }

    /// Returns the number of groups.
    #[inline]
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Returns the number of dimensions covered by all groups.
    #[must_use]
    pub fn dimension_total(&self) -> usize {
        self.groups.iter().sum()
    }

    /// Checks that the split partitions exactly `dimensions` dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::SplitMismatch`] if the group sizes do not sum to
    /// `dimensions`.
    pub fn validate(&self, dimensions: usize) -> Result<(), KeyError> {
        let split_total = self.dimension_total();
        if split_total == dimensions {
            Ok(())
        } else {
            Err(KeyError::SplitMismatch { dimensions, split_total })
        }
    }

    /// Returns the dimension range of each group, in order.
    pub(crate) fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.groups.iter().scan(0usize, |start, &size| {
            let range = *start..*start + size;
            *start += size;
            Some(range)
        })
    }
}

impl From<Vec<usize>> for ColumnSplit {
    fn from(groups: Vec<usize>) -> Self {
        Self::new(groups)
    }
}

impl From<&[usize]> for ColumnSplit {
    fn from(groups: &[usize]) -> Self {
        Self::new(groups)
    }
}
