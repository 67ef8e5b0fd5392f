//! The key generator factory.
//!
//! Picks how a composite key is built for a schema and returns a ready
//! [`KeyCodec`]. There are two entry points: a flat key over all dimensions,
//! and a block-aligned key where each column group starts on a byte boundary.

use mdkey_core::{ColumnSplit, KeyCodec, PlanMode};
use tracing::debug;

use crate::config::KeyGenConfig;
use crate::error::Result;

/// Builds key codecs for table schemas.
///
/// The factory holds a resolved [`KeyGenConfig`] and is cheap to copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyGeneratorFactory {
    config: KeyGenConfig,
}

impl KeyGeneratorFactory {
    /// Creates a factory with the given configuration.
    #[must_use]
    pub const fn new(config: KeyGenConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &KeyGenConfig {
        &self.config
    }

    /// Returns the planning mode used for every codec this factory builds.
    #[must_use]
    pub const fn plan_mode(&self) -> PlanMode {
        self.config.plan_mode
    }

    /// Builds a codec for a flat key over `cardinalities`.
    ///
    /// # Errors
    ///
    /// Returns an error if any cardinality is zero.
    pub fn for_dimensions(&self, cardinalities: &[u64]) -> Result<KeyCodec> {
        let codec = KeyCodec::from_cardinalities(cardinalities, self.plan_mode())?;
        self.log_built("flat", &codec);
        Ok(codec)
    }

    /// Builds a codec whose column groups are byte aligned.
    ///
    /// `column_split` holds the number of dimensions in each group.
    ///
    /// # Errors
    ///
    /// Returns an error if any cardinality is zero or the split does not
    /// cover every dimension.
    pub fn for_column_groups(
        &self,
        cardinalities: &[u64],
        column_split: &[usize],
    ) -> Result<KeyCodec> {
        let split = ColumnSplit::from(column_split);
        let codec = KeyCodec::from_column_split(cardinalities, &split, self.plan_mode())?;
        self.log_built("column_groups", &codec);
        Ok(codec)
    }

    fn log_built(&self, kind: &str, codec: &KeyCodec) {
        let layout = codec.layout();
        debug!(
            kind,
            mode = %self.plan_mode(),
            dimensions = layout.dimension_count(),
            fields = layout.field_count(),
            groups = layout.group_count(),
            key_len = layout.key_len(),
            "built key codec"
        );
    }
}
