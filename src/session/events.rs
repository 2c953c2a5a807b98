//! Change notifications returned by session mutators.

use crate::ids::{DsId, FrId, IncompatibilityId, SolutionId};

/// One observable change caused by a session mutation.
///
/// Mutators return the events they caused, in the order they happened, so
/// the owner can refresh exactly what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixEvent {
    FrDeleted { fr: FrId },
    FrsSwapped { a: FrId, b: FrId },
    DsDeleted { ds: DsId, fr: FrId },
    DsSwapped { a: DsId, b: DsId },
    DsToggled { ds: DsId, disabled: bool },
    IncompatibilityAdded { id: IncompatibilityId, a: DsId, b: DsId },
    IncompatibilityRemoved { id: IncompatibilityId, a: DsId, b: DsId },
    SolutionRemoved { solution: SolutionId },
    SolutionBound { solution: SolutionId, fr: FrId, ds: DsId },
    SolutionUnbound { solution: SolutionId, fr: FrId, ds: DsId },
    /// A bound design solution became disabled or incompatible with
    /// another binding of the same solution.
    ConflictRaised { solution: SolutionId, ds: DsId },
    /// A previously flagged binding is valid again.
    ConflictCleared { solution: SolutionId, ds: DsId },
}

/// Outcome of a successful "generate all solutions" call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Newly stored solutions, in generation order.
    pub added: Vec<SolutionId>,
    /// Generated combinations skipped because an identical solution was
    /// already stored.
    pub skipped: usize,
}

impl GenerationReport {
    /// Number of combinations the call enumerated.
    pub fn enumerated(&self) -> usize {
        self.added.len() + self.skipped
    }
}
