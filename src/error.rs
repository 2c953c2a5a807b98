//! Error types for morphological matrix operations.

use std::fmt;

use thiserror::Error;

use crate::ids::{DsId, FrId};

/// Recoverable failures of the engine.
///
/// Structural misuse (unknown ids, self-incompatibility) is not represented
/// here; those panic at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphError {
    /// Every functional requirement has zero enabled design solutions.
    #[error("nothing to generate: no functional requirement has an enabled design solution")]
    NoDesignSolutions,

    /// The branch cap was exceeded while building solution trees.
    #[error(
        "too many combinations (more than {limit} tree nodes), \
         narrow the matrix or raise the limit"
    )]
    GenerationCapacity { limit: usize },

    /// The two design solutions are already linked.
    #[error("{a} and {b} are already incompatible")]
    IncompatibilityExists { a: DsId, b: DsId },

    /// Both design solutions belong to the same functional requirement.
    #[error("{a} and {b} both belong to {fr}; only one of them can ever be chosen")]
    SameRowIncompatibility { a: DsId, b: DsId, fr: FrId },

    /// A solution with the same bindings is already stored.
    #[error("a solution with signature '{signature}' already exists")]
    SolutionExists { signature: String },

    /// A disabled design solution cannot be bound into a solution.
    #[error("{ds} is disabled and cannot be bound")]
    DesignSolutionDisabled { ds: DsId },

    /// Generator configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Imported state is inconsistent.
    #[error("invalid snapshot: {0}")]
    Snapshot(String),
}

impl MorphError {
    /// An imported id with no successor left for the id counter.
    pub(crate) fn id_out_of_range(id: impl fmt::Display) -> Self {
        Self::Snapshot(format!("{id} leaves no room for further ids"))
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, MorphError>;
