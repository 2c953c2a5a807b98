//! Row and cell types.

use crate::ids::{DsId, FrId};

/// A functional requirement: one row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionalRequirement {
    /// Row identifier.
    pub id: FrId,
    /// 1-based row position.
    pub position: usize,
    /// Free-text description shown in the row header.
    pub description: String,
    /// Owned design solutions in position order.
    pub(crate) design_solutions: Vec<DsId>,
}

impl FunctionalRequirement {
    pub(crate) fn new(id: FrId, position: usize, description: String) -> Self {
        Self {
            id,
            position,
            description,
            design_solutions: Vec::new(),
        }
    }

    /// Design solution ids in position order.
    pub fn design_solution_ids(&self) -> &[DsId] {
        &self.design_solutions
    }

    /// Number of design solutions in this row.
    pub fn len(&self) -> usize {
        self.design_solutions.len()
    }

    /// Whether the row has no design solutions.
    pub fn is_empty(&self) -> bool {
        self.design_solutions.is_empty()
    }
}

/// A design solution: one cell within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignSolution {
    /// Cell identifier.
    pub id: DsId,
    /// Owning row.
    pub fr: FrId,
    /// 1-based position within the row (display order).
    pub position: usize,
    /// Free-text description.
    pub description: String,
    /// Reference to an image shown in the cell, if any.
    pub image: Option<String>,
}
