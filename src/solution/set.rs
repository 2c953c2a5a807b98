//! Signature-deduplicated solution storage.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::types::{conflicts_of, signature_of, Solution};
use crate::error::{MorphError, Result};
use crate::graph::ConstraintGraph;
use crate::ids::{DsId, FrId, SolutionId};

/// Conflict flags that changed on one solution after a refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictDelta {
    /// Newly flagged design solutions.
    pub raised: Vec<DsId>,
    /// Design solutions no longer flagged.
    pub cleared: Vec<DsId>,
}

impl ConflictDelta {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.raised.is_empty() && self.cleared.is_empty()
    }
}

/// Stored solutions, unique by canonical signature.
///
/// Empty solutions (no bindings) are exempt from the uniqueness check, so
/// any number of them may coexist.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use u_morph::solution::SolutionSet;
/// use u_morph::{DsId, FrId, MorphError};
///
/// let mut set = SolutionSet::new();
/// let bindings: BTreeMap<_, _> = [(FrId(1), DsId(1))].into_iter().collect();
///
/// set.add("first", bindings.clone()).unwrap();
/// assert!(matches!(set.add("again", bindings), Err(MorphError::SolutionExists { .. })));
///
/// set.add("blank", BTreeMap::new()).unwrap();
/// set.add("blank too", BTreeMap::new()).unwrap();
/// assert_eq!(set.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SolutionSet {
    solutions: BTreeMap<SolutionId, Solution>,
    signatures: HashMap<String, SolutionId>,
    /// Reverse index: design solution -> solutions binding it.
    by_ds: HashMap<DsId, BTreeSet<SolutionId>>,
    next_id: u64,
}

impl Default for SolutionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl SolutionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            solutions: BTreeMap::new(),
            signatures: HashMap::new(),
            by_ds: HashMap::new(),
            next_id: 1,
        }
    }

    /// Stores a new solution under a fresh id.
    ///
    /// Fails with [`MorphError::SolutionExists`] if a non-empty solution with
    /// the same signature is already stored.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        bindings: BTreeMap<FrId, DsId>,
    ) -> Result<SolutionId> {
        let id = SolutionId(self.next_id);
        self.restore(Solution::new(id, name, bindings))
    }

    /// Stores a solution that already carries its id (used when restoring
    /// saved state). Conflict flags are kept as given, and bindings to
    /// disabled design solutions are accepted; callers refresh conflicts
    /// afterwards.
    ///
    /// Fails with [`MorphError::SolutionExists`] on a duplicate signature
    /// and with [`MorphError::Snapshot`] if the id is taken or is
    /// `u64::MAX`.
    pub fn restore(&mut self, solution: Solution) -> Result<SolutionId> {
        if self.solutions.contains_key(&solution.id) {
            return Err(MorphError::Snapshot(format!(
                "solution id {} is used twice",
                solution.id
            )));
        }
        let signature = solution.signature();
        if !signature.is_empty() && self.signatures.contains_key(&signature) {
            return Err(MorphError::SolutionExists { signature });
        }
        let id = solution.id;
        let next = id.checked_next().ok_or_else(|| MorphError::id_out_of_range(id))?;

        if !signature.is_empty() {
            self.signatures.insert(signature, id);
        }
        for &ds in solution.bindings.values() {
            self.by_ds.entry(ds).or_default().insert(id);
        }
        self.next_id = self.next_id.max(next.get());
        self.solutions.insert(id, solution);
        Ok(id)
    }

    /// Removes a solution, returning it if it was stored.
    pub fn remove(&mut self, id: SolutionId) -> Option<Solution> {
        let solution = self.solutions.remove(&id)?;
        let signature = solution.signature();
        if self.signatures.get(&signature) == Some(&id) {
            self.signatures.remove(&signature);
        }
        for ds in solution.bindings.values() {
            self.unindex(*ds, id);
        }
        Some(solution)
    }

    /// Removes every solution, returning how many were stored.
    pub fn remove_all(&mut self) -> usize {
        let removed = self.solutions.len();
        self.solutions.clear();
        self.signatures.clear();
        self.by_ds.clear();
        removed
    }

    /// Binds `ds` for `fr` in solution `id`, replacing any previous binding
    /// for that row. Returns the replaced design solution.
    ///
    /// A disabled `ds` is refused with [`MorphError::DesignSolutionDisabled`];
    /// saved bindings to disabled cells go through [`SolutionSet::restore`]
    /// instead. A binding that would make the
    /// solution identical to another stored one is refused with
    /// [`MorphError::SolutionExists`]. Either way nothing changes.
    ///
    /// The conflict flag of the replaced design solution is cleared.
    ///
    /// # Panics
    /// Panics if `id` is unknown.
    pub fn bind(
        &mut self,
        id: SolutionId,
        fr: FrId,
        ds: DsId,
        graph: &ConstraintGraph,
    ) -> Result<Option<DsId>> {
        if graph.is_disabled(ds) {
            return Err(MorphError::DesignSolutionDisabled { ds });
        }

        let mut bindings = self.solution(id).bindings.clone();
        let previous = bindings.insert(fr, ds);
        if previous == Some(ds) {
            return Ok(previous);
        }
        self.rebind(id, bindings)?;

        if let Some(old) = previous {
            self.unindex(old, id);
            self.solution_mut(id).conflicts.remove(&old);
        }
        self.by_ds.entry(ds).or_default().insert(id);
        Ok(previous)
    }

    /// Removes the binding for `fr` from solution `id`. Returns the
    /// design solution that was bound.
    ///
    /// Refused with [`MorphError::SolutionExists`] if the remaining
    /// bindings duplicate another stored solution.
    ///
    /// # Panics
    /// Panics if `id` is unknown.
    pub fn unbind(&mut self, id: SolutionId, fr: FrId) -> Result<Option<DsId>> {
        let mut bindings = self.solution(id).bindings.clone();
        let Some(old) = bindings.remove(&fr) else {
            return Ok(None);
        };
        self.rebind(id, bindings)?;

        self.unindex(old, id);
        self.solution_mut(id).conflicts.remove(&old);
        Ok(Some(old))
    }

    /// Recomputes the conflict flags of solution `id` against `graph`.
    ///
    /// # Panics
    /// Panics if `id` is unknown.
    pub fn refresh_conflicts(&mut self, id: SolutionId, graph: &ConstraintGraph) -> ConflictDelta {
        let solution = self.solution_mut(id);
        let current = conflicts_of(&solution.bindings, graph);

        let delta = ConflictDelta {
            raised: current.difference(&solution.conflicts).copied().collect(),
            cleared: solution.conflicts.difference(&current).copied().collect(),
        };
        solution.conflicts = current;
        delta
    }

    /// Renames a solution.
    pub fn rename(&mut self, id: SolutionId, name: impl Into<String>) {
        self.solution_mut(id).name = name.into();
    }

    /// Sets or clears a solution's colour.
    pub fn set_color(&mut self, id: SolutionId, color: Option<String>) {
        self.solution_mut(id).color = color;
    }

    /// Looks up a solution.
    pub fn get(&self, id: SolutionId) -> Option<&Solution> {
        self.solutions.get(&id)
    }

    /// The stored solution with the given non-empty signature.
    pub fn find_by_signature(&self, signature: &str) -> Option<SolutionId> {
        self.signatures.get(signature).copied()
    }

    /// Solutions currently binding `ds`, in id order.
    pub fn solutions_using(&self, ds: DsId) -> Vec<SolutionId> {
        self.by_ds
            .get(&ds)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Solutions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.solutions.values()
    }

    /// Number of stored solutions.
    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Replaces the bindings of `id`, moving its signature registration.
    fn rebind(&mut self, id: SolutionId, bindings: BTreeMap<FrId, DsId>) -> Result<()> {
        let signature = signature_of(&bindings);
        if !signature.is_empty() {
            if let Some(&owner) = self.signatures.get(&signature) {
                if owner != id {
                    return Err(MorphError::SolutionExists { signature });
                }
            }
        }

        let solution = self.solution_mut(id);
        let old_signature = signature_of(&solution.bindings);
        solution.bindings = bindings;

        if self.signatures.get(&old_signature) == Some(&id) {
            self.signatures.remove(&old_signature);
        }
        if !signature.is_empty() {
            self.signatures.insert(signature, id);
        }
        Ok(())
    }

    fn unindex(&mut self, ds: DsId, id: SolutionId) {
        if let Some(ids) = self.by_ds.get_mut(&ds) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_ds.remove(&ds);
            }
        }
    }

    fn solution(&self, id: SolutionId) -> &Solution {
        self.solutions
            .get(&id)
            .unwrap_or_else(|| panic!("unknown solution {id}"))
    }

    fn solution_mut(&mut self, id: SolutionId) -> &mut Solution {
        self.solutions
            .get_mut(&id)
            .unwrap_or_else(|| panic!("unknown solution {id}"))
    }
}
