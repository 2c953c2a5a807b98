//! Generator configuration.

use crate::error::{MorphError, Result};

/// Default branch cap used by counting and generation.
pub const DEFAULT_BRANCH_LIMIT: usize = 200;

/// Configuration parameters for solution enumeration.
///
/// # Examples
///
/// ```
/// use u_morph::generator::GeneratorConfig;
///
/// let config = GeneratorConfig::default().with_limit(5_000);
/// assert_eq!(config.limit, 5_000);
/// assert!(config.validate().is_ok());
///
/// assert!(GeneratorConfig::default().with_limit(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Maximum number of tree nodes one enumeration call may create,
    /// summed over all seed trees. Exceeding it aborts the call.
    pub limit: usize,
    /// Whether to build independent seed trees in parallel using rayon.
    ///
    /// Only takes effect when the crate is built with the `parallel`
    /// feature.
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_BRANCH_LIMIT,
            parallel: false,
        }
    }
}

impl GeneratorConfig {
    /// Sets the branch cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Enables or disables parallel seed trees.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(MorphError::InvalidConfig(
                "limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
