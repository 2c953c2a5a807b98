//! Solution type and canonical signatures.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::ConstraintGraph;
use crate::ids::{DsId, FrId, SolutionId};
use crate::matrix::MatrixModel;

/// A (possibly partial) choice of at most one design solution per
/// functional requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Solution identifier.
    pub id: SolutionId,
    /// Display name.
    pub name: String,
    /// Display colour, if the user picked one.
    pub color: Option<String>,
    pub(crate) bindings: BTreeMap<FrId, DsId>,
    pub(crate) conflicts: BTreeSet<DsId>,
}

impl Solution {
    /// Creates a solution with the given bindings and no conflicts.
    pub fn new(id: SolutionId, name: impl Into<String>, bindings: BTreeMap<FrId, DsId>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            bindings,
            conflicts: BTreeSet::new(),
        }
    }

    /// Sets the display colour.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Bound design solution per functional requirement.
    pub fn bindings(&self) -> &BTreeMap<FrId, DsId> {
        &self.bindings
    }

    /// The design solution bound for `fr`, if any.
    pub fn binding(&self, fr: FrId) -> Option<DsId> {
        self.bindings.get(&fr).copied()
    }

    /// Whether `ds` is bound in this solution.
    pub fn uses(&self, ds: DsId) -> bool {
        self.bindings.values().any(|&bound| bound == ds)
    }

    /// Bound design solutions that are currently disabled or incompatible
    /// with another bound design solution. Advisory only.
    pub fn conflicts(&self) -> &BTreeSet<DsId> {
        &self.conflicts
    }

    /// Whether any binding is currently flagged.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Whether every row of `matrix` is bound.
    pub fn is_complete(&self, matrix: &MatrixModel) -> bool {
        matrix.iter_frs().all(|fr| self.bindings.contains_key(&fr.id))
    }

    /// Canonical signature of the bindings; see [`signature_of`].
    pub fn signature(&self) -> String {
        signature_of(&self.bindings)
    }
}

/// Stable serialization of sorted `fr:ds` pairs, e.g. `"1:3;2:7"`.
///
/// Two solutions with equal signatures bind exactly the same design
/// solutions. An empty binding map yields an empty signature.
pub fn signature_of(bindings: &BTreeMap<FrId, DsId>) -> String {
    bindings
        .iter()
        .map(|(fr, ds)| format!("{}:{}", fr.get(), ds.get()))
        .collect::<Vec<_>>()
        .join(";")
}

/// Bound design solutions that are disabled, or incompatible with another
/// design solution bound in the same map.
pub(crate) fn conflicts_of(
    bindings: &BTreeMap<FrId, DsId>,
    graph: &ConstraintGraph,
) -> BTreeSet<DsId> {
    let bound: Vec<DsId> = bindings.values().copied().collect();
    bound
        .iter()
        .copied()
        .filter(|&ds| {
            graph.is_disabled(ds)
                || bound
                    .iter()
                    .any(|&other| other != ds && graph.is_incompatible(ds, other))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(u64, u64)]) -> BTreeMap<FrId, DsId> {
        pairs.iter().map(|&(fr, ds)| (FrId(fr), DsId(ds))).collect()
    }

    #[test]
    fn test_signature_is_order_independent() {
        let mut a = BTreeMap::new();
        a.insert(FrId(2), DsId(7));
        a.insert(FrId(1), DsId(3));
        assert_eq!(signature_of(&a), "1:3;2:7");
        assert_eq!(signature_of(&bindings(&[(1, 3), (2, 7)])), "1:3;2:7");
        assert_eq!(signature_of(&BTreeMap::new()), "");
    }

    #[test]
    fn test_conflicts_of_disabled_and_incompatible() {
        let mut graph = ConstraintGraph::new();
        for id in 1..=4 {
            graph.add_node(DsId(id));
        }
        graph.set_disabled(DsId(4), true);
        graph.set_incompatible(DsId(1), DsId(2)).unwrap();

        let flagged = conflicts_of(&bindings(&[(1, 1), (2, 2), (3, 3)]), &graph);
        assert_eq!(flagged.into_iter().collect::<Vec<_>>(), vec![DsId(1), DsId(2)]);

        let flagged = conflicts_of(&bindings(&[(1, 1), (3, 4)]), &graph);
        assert_eq!(flagged.into_iter().collect::<Vec<_>>(), vec![DsId(4)]);
    }

    #[test]
    fn test_is_complete() {
        let mut matrix = MatrixModel::new();
        let a = matrix.add_fr("a");
        let b = matrix.add_fr("b");
        let a1 = matrix.add_ds(a, "a1");
        let b1 = matrix.add_ds(b, "b1");

        let mut partial = BTreeMap::new();
        partial.insert(a, a1);
        let mut solution = Solution::new(SolutionId(1), "s", partial);
        assert!(!solution.is_complete(&matrix));

        solution.bindings.insert(b, b1);
        assert!(solution.is_complete(&matrix));
        assert!(solution.uses(b1));
        assert_eq!(solution.binding(a), Some(a1));
    }
}
