//! Generator input and output types.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::graph::ConstraintGraph;
use crate::ids::{DsId, FrId};
use crate::matrix::MatrixModel;

/// An enabled design solution offered to the generator, with the ids it
/// declares incompatible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The design solution.
    pub ds: DsId,
    /// Design solutions that may not appear alongside `ds`.
    pub incompatible: Arc<HashSet<DsId>>,
}

impl Candidate {
    /// Creates a candidate from its id and declared incompatibilities.
    pub fn new(ds: DsId, incompatible: impl IntoIterator<Item = DsId>) -> Self {
        Self {
            ds,
            incompatible: Arc::new(incompatible.into_iter().collect()),
        }
    }
}

/// One functional requirement with its enabled candidates in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRow {
    /// The functional requirement.
    pub fr: FrId,
    /// Enabled design solutions, in position order.
    pub candidates: Vec<Candidate>,
}

impl CandidateRow {
    /// Creates a row.
    pub fn new(fr: FrId, candidates: Vec<Candidate>) -> Self {
        Self { fr, candidates }
    }

    /// Builds the generator input from a matrix and its constraint graph.
    ///
    /// Rows are taken in position order. A row with no enabled design
    /// solution is left out entirely rather than contributing an empty
    /// choice.
    pub fn collect(matrix: &MatrixModel, graph: &ConstraintGraph) -> Vec<CandidateRow> {
        matrix
            .iter_frs()
            .map(|fr| {
                let candidates = matrix
                    .enabled_design_solutions(fr.id, graph)
                    .map(|ds| Candidate::new(ds.id, graph.incompatible_ids_of(ds.id)))
                    .collect();
                CandidateRow::new(fr.id, candidates)
            })
            .filter(|row| !row.candidates.is_empty())
            .collect()
    }

    /// Whether the row offers no candidate.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// What an enumeration call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Only count the combinations.
    Count,
    /// Materialize every combination.
    Materialize,
}

/// One materialized combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSolution {
    /// Deterministic name, `generated-solution-NNNN`.
    pub name: String,
    /// Chosen design solution per functional requirement.
    pub bindings: BTreeMap<FrId, DsId>,
}

/// Result of an enumeration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enumeration {
    /// Exact number of combinations.
    Count(usize),
    /// Every combination, in tree order then frontier order.
    Solutions(Vec<GeneratedSolution>),
}

impl Enumeration {
    /// Number of combinations, whichever mode produced this result.
    pub fn len(&self) -> usize {
        match self {
            Self::Count(n) => *n,
            Self::Solutions(solutions) => solutions.len(),
        }
    }

    /// Whether no combination exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
