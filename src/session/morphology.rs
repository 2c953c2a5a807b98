//! Session owning one matrix, its constraints and its solutions.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::events::{GenerationReport, MatrixEvent};
use crate::error::{MorphError, Result};
use crate::generator::{CandidateRow, GeneratorConfig, SolutionGenerator};
use crate::graph::ConstraintGraph;
use crate::ids::{DsId, FrId, SolutionId};
use crate::matrix::MatrixModel;
use crate::solution::SolutionSet;

/// A morphological matrix editing session.
///
/// Every mutation goes through here so that the matrix, the constraint
/// graph and the stored solutions stay consistent. Constraint changes
/// re-evaluate only the solutions that bind the affected design solutions;
/// full enumeration runs only on [`Morphology::generate_all_solutions`].
///
/// # Examples
///
/// ```
/// use u_morph::Morphology;
///
/// let mut session = Morphology::new();
/// let power = session.add_fr("Provide power");
/// let move_ = session.add_fr("Move");
/// let battery = session.add_ds(power, "Battery");
/// session.add_ds(power, "Solar panel");
/// let wheels = session.add_ds(move_, "Wheels");
/// session.add_ds(move_, "Legs");
///
/// assert_eq!(session.count_possible_solutions().unwrap(), 4);
///
/// session.set_incompatible(battery, wheels).unwrap();
/// assert_eq!(session.count_possible_solutions().unwrap(), 3);
///
/// let report = session.generate_all_solutions().unwrap();
/// assert_eq!(report.added.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Morphology {
    pub(crate) matrix: MatrixModel,
    pub(crate) graph: ConstraintGraph,
    pub(crate) solutions: SolutionSet,
    pub(crate) config: GeneratorConfig,
}

impl Morphology {
    /// Creates an empty session with the default generator configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session with a custom generator configuration.
    pub fn with_config(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// The matrix rows and cells.
    pub fn matrix(&self) -> &MatrixModel {
        &self.matrix
    }

    /// Disabled flags and incompatibilities.
    pub fn graph(&self) -> &ConstraintGraph {
        &self.graph
    }

    /// Stored solutions.
    pub fn solutions(&self) -> &SolutionSet {
        &self.solutions
    }

    /// The generator configuration used by default.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Replaces the default generator configuration.
    pub fn set_config(&mut self, config: GeneratorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ============================================================
    // Matrix structure
    // ============================================================

    /// Appends a functional requirement.
    ///
    /// # Panics
    /// Panics if the row id space is exhausted (see
    /// [`MatrixModel::add_fr`]).
    pub fn add_fr(&mut self, description: impl Into<String>) -> FrId {
        self.matrix.add_fr(description)
    }

    /// Appends an enabled design solution to `fr`.
    ///
    /// # Panics
    /// Panics if `fr` is unknown or the cell id space is exhausted.
    pub fn add_ds(&mut self, fr: FrId, description: impl Into<String>) -> DsId {
        let ds = self.matrix.add_ds(fr, description);
        self.graph.add_node(ds);
        ds
    }

    /// Deletes a functional requirement, deleting each of its design
    /// solutions first (see [`Morphology::delete_ds`]).
    ///
    /// # Panics
    /// Panics if `fr` is unknown.
    pub fn delete_fr(&mut self, fr: FrId) -> Vec<MatrixEvent> {
        let cells: Vec<DsId> = self.matrix.design_solutions(fr).map(|ds| ds.id).collect();

        let mut events = Vec::new();
        for ds in cells {
            events.extend(self.delete_ds(ds));
        }
        self.matrix.delete_fr(fr);
        events.push(MatrixEvent::FrDeleted { fr });
        events
    }

    /// Deletes a design solution.
    ///
    /// The design solution is unbound from every solution using it; a
    /// solution whose remaining bindings duplicate another stored solution
    /// is removed instead. Its incompatibilities are removed and solutions
    /// binding a former partner are re-evaluated.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn delete_ds(&mut self, ds: DsId) -> Vec<MatrixEvent> {
        let fr = self.fr_of(ds);
        let mut events = Vec::new();

        for solution in self.solutions.solutions_using(ds) {
            match self.solutions.unbind(solution, fr) {
                Ok(_) => events.push(MatrixEvent::SolutionUnbound { solution, fr, ds }),
                Err(err) => {
                    debug!(
                        solution = %solution,
                        ds = %ds,
                        error = %err,
                        "solution collapsed into a duplicate"
                    );
                    self.solutions.remove(solution);
                    events.push(MatrixEvent::SolutionRemoved { solution });
                }
            }
        }

        let mut affected = BTreeSet::new();
        for edge in self.graph.remove_node(ds) {
            let (a, b) = edge.pair();
            if let Some(partner) = edge.other(ds) {
                affected.extend(self.solutions.solutions_using(partner));
            }
            events.push(MatrixEvent::IncompatibilityRemoved { id: edge.id, a, b });
        }
        self.matrix.delete_ds(ds);
        events.push(MatrixEvent::DsDeleted { ds, fr });

        self.refresh(affected, &mut events);
        events
    }

    /// Swaps the positions of two functional requirements.
    pub fn move_fr(&mut self, a: FrId, b: FrId) -> Vec<MatrixEvent> {
        self.matrix.move_fr(a, b);
        vec![MatrixEvent::FrsSwapped { a, b }]
    }

    /// Swaps the positions of two design solutions of the same row.
    pub fn move_ds(&mut self, a: DsId, b: DsId) -> Vec<MatrixEvent> {
        self.matrix.move_ds(a, b);
        vec![MatrixEvent::DsSwapped { a, b }]
    }

    /// Replaces a row's description.
    pub fn set_fr_description(&mut self, fr: FrId, description: impl Into<String>) {
        self.matrix.set_fr_description(fr, description);
    }

    /// Replaces a cell's description.
    pub fn set_ds_description(&mut self, ds: DsId, description: impl Into<String>) {
        self.matrix.set_ds_description(ds, description);
    }

    /// Sets or clears a cell's image reference.
    pub fn set_ds_image(&mut self, ds: DsId, image: Option<String>) {
        self.matrix.set_ds_image(ds, image);
    }

    // ============================================================
    // Constraints
    // ============================================================

    /// Enables or disables a design solution.
    ///
    /// Setting the current value returns no events. Otherwise every
    /// solution binding `ds` is re-evaluated.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn set_disabled(&mut self, ds: DsId, disabled: bool) -> Vec<MatrixEvent> {
        if !self.graph.set_disabled(ds, disabled) {
            return Vec::new();
        }
        let mut events = vec![MatrixEvent::DsToggled { ds, disabled }];
        let affected = self.solutions.solutions_using(ds);
        self.refresh(affected, &mut events);
        events
    }

    /// Marks two design solutions of different rows as incompatible.
    ///
    /// A pair that is already linked is a no-op (logged, no events).
    /// Fails with [`MorphError::SameRowIncompatibility`] if both belong to
    /// the same functional requirement.
    ///
    /// # Panics
    /// Panics if either id is unknown.
    pub fn set_incompatible(&mut self, a: DsId, b: DsId) -> Result<Vec<MatrixEvent>> {
        self.link(a, b, None)
    }

    /// Like [`Morphology::set_incompatible`], with a label for the edge.
    pub fn set_incompatible_named(
        &mut self,
        a: DsId,
        b: DsId,
        name: impl Into<String>,
    ) -> Result<Vec<MatrixEvent>> {
        self.link(a, b, Some(name.into()))
    }

    fn link(&mut self, a: DsId, b: DsId, name: Option<String>) -> Result<Vec<MatrixEvent>> {
        let fr = self.fr_of(a);
        if fr == self.fr_of(b) {
            return Err(MorphError::SameRowIncompatibility { a, b, fr });
        }

        let linked = match name {
            Some(name) => self.graph.set_incompatible_named(a, b, name),
            None => self.graph.set_incompatible(a, b),
        };
        let id = match linked {
            Ok(id) => id,
            Err(MorphError::IncompatibilityExists { a, b }) => {
                debug!(a = %a, b = %b, "incompatibility already exists");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut events = vec![MatrixEvent::IncompatibilityAdded { id, a, b }];
        let affected = self.solutions_using_both(a, b);
        self.refresh(affected, &mut events);
        Ok(events)
    }

    /// Removes the incompatibility between `a` and `b`, if any.
    pub fn remove_incompatibility(&mut self, a: DsId, b: DsId) -> Vec<MatrixEvent> {
        let Some(edge) = self.graph.remove_incompatibility(a, b) else {
            return Vec::new();
        };
        let (lo, hi) = edge.pair();
        let mut events = vec![MatrixEvent::IncompatibilityRemoved {
            id: edge.id,
            a: lo,
            b: hi,
        }];
        let affected = self.solutions_using_both(a, b);
        self.refresh(affected, &mut events);
        events
    }

    // ============================================================
    // Enumeration
    // ============================================================

    /// Counts the combinations under the session's configuration.
    pub fn count_possible_solutions(&self) -> Result<usize> {
        self.count_possible_solutions_with(&self.config)
    }

    /// Counts the combinations under an explicit configuration.
    pub fn count_possible_solutions_with(&self, config: &GeneratorConfig) -> Result<usize> {
        let rows = CandidateRow::collect(&self.matrix, &self.graph);
        SolutionGenerator::count(&rows, config)
    }

    /// Materializes every combination into the solution set.
    ///
    /// Combinations identical to an already stored solution are skipped.
    /// If enumeration fails nothing is stored.
    pub fn generate_all_solutions(&mut self) -> Result<GenerationReport> {
        let config = self.config.clone();
        self.generate_all_solutions_with(&config)
    }

    /// Like [`Morphology::generate_all_solutions`] with an explicit
    /// configuration.
    pub fn generate_all_solutions_with(
        &mut self,
        config: &GeneratorConfig,
    ) -> Result<GenerationReport> {
        let rows = CandidateRow::collect(&self.matrix, &self.graph);
        let generated = SolutionGenerator::generate(&rows, config)?;

        let mut report = GenerationReport::default();
        for solution in generated {
            match self.solutions.add(solution.name, solution.bindings) {
                Ok(id) => report.added.push(id),
                Err(MorphError::SolutionExists { signature }) => {
                    debug!(signature = %signature, "skipping duplicate generated solution");
                    report.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            event = "solutions_stored",
            added = report.added.len(),
            skipped = report.skipped,
            total = self.solutions.len(),
        );
        Ok(report)
    }

    // ============================================================
    // Solutions
    // ============================================================

    /// Creates an empty solution.
    ///
    /// # Panics
    /// Panics if no solution id is left, which only happens after
    /// restoring a solution whose id is `u64::MAX - 1`.
    pub fn new_solution(&mut self, name: impl Into<String>) -> SolutionId {
        match self.solutions.add(name, BTreeMap::new()) {
            Ok(id) => id,
            Err(err) => panic!("cannot allocate a solution id: {err}"),
        }
    }

    /// Stores a solution with the given bindings.
    ///
    /// Fails with [`MorphError::DesignSolutionDisabled`] if a binding is
    /// disabled and with [`MorphError::SolutionExists`] if an identical
    /// solution is already stored. Incompatible bindings are accepted and
    /// flagged as conflicts.
    ///
    /// # Panics
    /// Panics if a design solution is unknown or does not belong to the
    /// functional requirement it is bound to.
    pub fn insert_solution(
        &mut self,
        name: impl Into<String>,
        bindings: BTreeMap<FrId, DsId>,
    ) -> Result<SolutionId> {
        for (&fr, &ds) in &bindings {
            self.assert_owned(fr, ds);
            if self.graph.is_disabled(ds) {
                return Err(MorphError::DesignSolutionDisabled { ds });
            }
        }
        let id = self.solutions.add(name, bindings)?;
        self.solutions.refresh_conflicts(id, &self.graph);
        Ok(id)
    }

    /// Binds `ds` for `fr` in a solution, replacing the row's previous
    /// binding.
    ///
    /// # Panics
    /// Panics if an id is unknown or `ds` does not belong to `fr`.
    pub fn bind(&mut self, solution: SolutionId, fr: FrId, ds: DsId) -> Result<Vec<MatrixEvent>> {
        self.assert_owned(fr, ds);
        let previous = self.solutions.bind(solution, fr, ds, &self.graph)?;

        let mut events = Vec::new();
        if previous == Some(ds) {
            return Ok(events);
        }
        if let Some(old) = previous {
            events.push(MatrixEvent::SolutionUnbound { solution, fr, ds: old });
        }
        events.push(MatrixEvent::SolutionBound { solution, fr, ds });
        self.refresh([solution], &mut events);
        Ok(events)
    }

    /// Removes the binding for `fr` from a solution.
    ///
    /// Fails with [`MorphError::SolutionExists`] if the remaining bindings
    /// duplicate another stored solution.
    pub fn unbind(&mut self, solution: SolutionId, fr: FrId) -> Result<Vec<MatrixEvent>> {
        let mut events = Vec::new();
        if let Some(ds) = self.solutions.unbind(solution, fr)? {
            events.push(MatrixEvent::SolutionUnbound { solution, fr, ds });
            self.refresh([solution], &mut events);
        }
        Ok(events)
    }

    /// Renames a solution.
    pub fn rename_solution(&mut self, solution: SolutionId, name: impl Into<String>) {
        self.solutions.rename(solution, name);
    }

    /// Sets or clears a solution's colour.
    pub fn set_solution_color(&mut self, solution: SolutionId, color: Option<String>) {
        self.solutions.set_color(solution, color);
    }

    /// Removes one solution.
    pub fn remove_solution(&mut self, solution: SolutionId) -> Vec<MatrixEvent> {
        match self.solutions.remove(solution) {
            Some(_) => vec![MatrixEvent::SolutionRemoved { solution }],
            None => Vec::new(),
        }
    }

    /// Removes every solution.
    pub fn remove_all_solutions(&mut self) -> Vec<MatrixEvent> {
        let ids: Vec<SolutionId> = self.solutions.iter().map(|s| s.id).collect();
        self.solutions.remove_all();
        ids.into_iter()
            .map(|solution| MatrixEvent::SolutionRemoved { solution })
            .collect()
    }

    // ============================================================
    // Incremental maintenance
    // ============================================================

    /// Re-evaluates conflict flags of the given solutions.
    pub(crate) fn refresh(
        &mut self,
        affected: impl IntoIterator<Item = SolutionId>,
        events: &mut Vec<MatrixEvent>,
    ) {
        let affected: BTreeSet<SolutionId> = affected.into_iter().collect();
        for solution in affected {
            let delta = self.solutions.refresh_conflicts(solution, &self.graph);
            events.extend(
                delta
                    .raised
                    .into_iter()
                    .map(|ds| MatrixEvent::ConflictRaised { solution, ds }),
            );
            events.extend(
                delta
                    .cleared
                    .into_iter()
                    .map(|ds| MatrixEvent::ConflictCleared { solution, ds }),
            );
        }
    }

    fn solutions_using_both(&self, a: DsId, b: DsId) -> Vec<SolutionId> {
        self.solutions
            .solutions_using(a)
            .into_iter()
            .filter(|&id| self.solutions.get(id).is_some_and(|s| s.uses(b)))
            .collect()
    }

    fn fr_of(&self, ds: DsId) -> FrId {
        self.matrix
            .fr_of(ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"))
    }

    fn assert_owned(&self, fr: FrId, ds: DsId) {
        let owner = self.fr_of(ds);
        assert_eq!(owner, fr, "{ds} belongs to {owner}, not {fr}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// `rows[i]` design solutions per row; returns the session and ids.
    fn session(rows: &[usize]) -> (Morphology, Vec<FrId>, Vec<Vec<DsId>>) {
        let mut session = Morphology::new();
        let mut frs = Vec::new();
        let mut cells = Vec::new();
        for (r, &n) in rows.iter().enumerate() {
            let fr = session.add_fr(format!("fr{r}"));
            cells.push((0..n).map(|i| session.add_ds(fr, format!("ds{r}.{i}"))).collect());
            frs.push(fr);
        }
        (session, frs, cells)
    }

    #[test]
    fn test_two_rows_no_constraints() {
        let (session, _, _) = session(&[2, 2]);
        assert_eq!(session.count_possible_solutions(), Ok(4));
    }

    #[test]
    fn test_one_incompatible_pair() {
        let (mut session, _, ds) = session(&[2, 2]);
        session.set_incompatible(ds[0][0], ds[1][1]).unwrap();
        assert_eq!(session.count_possible_solutions(), Ok(3));
    }

    #[test]
    fn test_fully_disabled_row_drops_out() {
        let (mut session, frs, ds) = session(&[2, 2, 2]);
        session.set_disabled(ds[1][0], true);
        session.set_disabled(ds[1][1], true);
        assert_eq!(session.count_possible_solutions(), Ok(4));

        let report = session.generate_all_solutions().unwrap();
        assert_eq!(report.added.len(), 4);
        assert!(session.solutions().iter().all(|s| s.binding(frs[1]).is_none()));
    }

    #[test]
    fn test_nothing_to_generate() {
        let (mut session, _, ds) = session(&[1, 0]);
        session.set_disabled(ds[0][0], true);
        assert_eq!(session.count_possible_solutions(), Err(MorphError::NoDesignSolutions));
        assert_eq!(
            session.generate_all_solutions(),
            Err(MorphError::NoDesignSolutions)
        );
    }

    #[test]
    fn test_same_row_incompatibility_rejected() {
        let (mut session, frs, ds) = session(&[2]);
        assert_eq!(
            session.set_incompatible(ds[0][0], ds[0][1]),
            Err(MorphError::SameRowIncompatibility {
                a: ds[0][0],
                b: ds[0][1],
                fr: frs[0]
            })
        );
        assert_eq!(session.graph().incompatibilities().count(), 0);
    }

    #[test]
    fn test_duplicate_incompatibility_is_noop() {
        let (mut session, _, ds) = session(&[1, 1]);
        let first = session.set_incompatible(ds[0][0], ds[1][0]).unwrap();
        assert_eq!(first.len(), 1);
        let second = session.set_incompatible(ds[1][0], ds[0][0]).unwrap();
        assert!(second.is_empty());
        assert_eq!(session.graph().incompatibilities().count(), 1);
    }

    #[test]
    fn test_disable_bound_ds_flags_conflict_and_reenable_clears() {
        let (mut session, frs, ds) = session(&[2, 2]);
        let mut bindings = BTreeMap::new();
        bindings.insert(frs[0], ds[0][0]);
        bindings.insert(frs[1], ds[1][0]);
        let sol = session.insert_solution("mine", bindings).unwrap();

        let events = session.set_disabled(ds[0][0], true);
        assert_eq!(
            events,
            vec![
                MatrixEvent::DsToggled {
                    ds: ds[0][0],
                    disabled: true
                },
                MatrixEvent::ConflictRaised {
                    solution: sol,
                    ds: ds[0][0]
                },
            ]
        );
        let stored = session.solutions().get(sol).unwrap();
        assert!(stored.conflicts().contains(&ds[0][0]));
        assert_eq!(stored.binding(frs[0]), Some(ds[0][0]));

        assert!(session.set_disabled(ds[0][0], true).is_empty());

        let events = session.set_disabled(ds[0][0], false);
        assert!(events.contains(&MatrixEvent::ConflictCleared {
            solution: sol,
            ds: ds[0][0]
        }));
        assert!(!session.solutions().get(sol).unwrap().has_conflicts());
    }

    #[test]
    fn test_incompatibility_change_flags_both_bindings() {
        let (mut session, frs, ds) = session(&[1, 1]);
        let bindings: BTreeMap<_, _> = [(frs[0], ds[0][0]), (frs[1], ds[1][0])].into();
        let sol = session.insert_solution("s", bindings).unwrap();

        session.set_incompatible(ds[0][0], ds[1][0]).unwrap();
        assert_eq!(session.solutions().get(sol).unwrap().conflicts().len(), 2);

        let events = session.remove_incompatibility(ds[1][0], ds[0][0]);
        assert_eq!(events.len(), 3);
        assert!(!session.solutions().get(sol).unwrap().has_conflicts());
        assert!(session.remove_incompatibility(ds[0][0], ds[1][0]).is_empty());
    }

    #[test]
    fn test_insert_solution_with_incompatible_pair_is_flagged() {
        let (mut session, frs, ds) = session(&[1, 1]);
        session.set_incompatible(ds[0][0], ds[1][0]).unwrap();
        let bindings: BTreeMap<_, _> = [(frs[0], ds[0][0]), (frs[1], ds[1][0])].into();
        let sol = session.insert_solution("forced", bindings.clone()).unwrap();
        assert!(session.solutions().get(sol).unwrap().has_conflicts());

        assert!(matches!(
            session.insert_solution("again", bindings),
            Err(MorphError::SolutionExists { .. })
        ));
    }

    #[test]
    fn test_bind_disabled_refused() {
        let (mut session, frs, ds) = session(&[2]);
        let sol = session.new_solution("s");
        session.set_disabled(ds[0][1], true);
        assert_eq!(
            session.bind(sol, frs[0], ds[0][1]),
            Err(MorphError::DesignSolutionDisabled { ds: ds[0][1] })
        );

        let events = session.bind(sol, frs[0], ds[0][0]).unwrap();
        assert_eq!(
            events,
            vec![MatrixEvent::SolutionBound {
                solution: sol,
                fr: frs[0],
                ds: ds[0][0]
            }]
        );
    }

    #[test]
    fn test_rebind_clears_conflict_of_previous() {
        let (mut session, frs, ds) = session(&[2]);
        let sol = session.new_solution("s");
        session.bind(sol, frs[0], ds[0][0]).unwrap();
        session.set_disabled(ds[0][0], true);
        assert!(session.solutions().get(sol).unwrap().has_conflicts());

        let events = session.bind(sol, frs[0], ds[0][1]).unwrap();
        assert_eq!(
            events[0],
            MatrixEvent::SolutionUnbound {
                solution: sol,
                fr: frs[0],
                ds: ds[0][0]
            }
        );
        assert!(!session.solutions().get(sol).unwrap().has_conflicts());
    }

    #[test]
    fn test_delete_ds_unbinds_and_drops_edges() {
        let (mut session, frs, ds) = session(&[2, 2]);
        session.set_incompatible(ds[0][0], ds[1][0]).unwrap();
        let bindings: BTreeMap<_, _> = [(frs[0], ds[0][0]), (frs[1], ds[1][1])].into();
        let sol = session.insert_solution("s", bindings).unwrap();

        let events = session.delete_ds(ds[0][0]);
        assert!(events.contains(&MatrixEvent::SolutionUnbound {
            solution: sol,
            fr: frs[0],
            ds: ds[0][0]
        }));
        assert!(events.iter().any(|e| matches!(e, MatrixEvent::IncompatibilityRemoved { .. })));
        assert_eq!(session.graph().incompatibilities().count(), 0);
        assert!(session.graph().incompatible_ids_of(ds[1][0]).next().is_none());
        assert_eq!(session.solutions().get(sol).unwrap().binding(frs[0]), None);
        assert_eq!(session.matrix().ds(ds[0][1]).unwrap().position, 1);
    }

    #[test]
    fn test_delete_ds_clears_partner_conflict() {
        let (mut session, frs, ds) = session(&[1, 2]);
        let bindings: BTreeMap<_, _> = [(frs[0], ds[0][0]), (frs[1], ds[1][0])].into();
        let sol = session.insert_solution("s", bindings).unwrap();
        session.set_incompatible(ds[0][0], ds[1][0]).unwrap();
        assert_eq!(session.solutions().get(sol).unwrap().conflicts().len(), 2);

        session.delete_ds(ds[1][0]);
        assert!(!session.solutions().get(sol).unwrap().has_conflicts());
    }

    #[test]
    fn test_delete_ds_removes_collapsed_duplicate() {
        let (mut session, frs, ds) = session(&[1, 1]);
        let short = session
            .insert_solution("short", [(frs[0], ds[0][0])].into_iter().collect())
            .unwrap();
        let long = session
            .insert_solution(
                "long",
                [(frs[0], ds[0][0]), (frs[1], ds[1][0])].into_iter().collect(),
            )
            .unwrap();

        let events = session.delete_ds(ds[1][0]);
        assert!(events.contains(&MatrixEvent::SolutionRemoved { solution: long }));
        assert!(session.solutions().get(long).is_none());
        assert!(session.solutions().get(short).is_some());
    }

    #[test]
    fn test_delete_fr_cascades() {
        let (mut session, frs, ds) = session(&[2, 2, 1]);
        session.set_incompatible(ds[1][0], ds[2][0]).unwrap();
        session.generate_all_solutions().unwrap();

        let events = session.delete_fr(frs[1]);
        assert_eq!(events.last(), Some(&MatrixEvent::FrDeleted { fr: frs[1] }));
        assert_eq!(session.matrix().len(), 2);
        assert_eq!(session.matrix().fr(frs[2]).unwrap().position, 2);
        assert_eq!(session.graph().incompatibilities().count(), 0);
        assert!(session
            .solutions()
            .iter()
            .all(|s| s.binding(frs[1]).is_none()));
        assert_eq!(session.solutions().len(), 2);
    }

    #[test]
    fn test_generate_skips_existing() {
        init_tracing();
        let (mut session, frs, ds) = session(&[2, 1]);
        session
            .insert_solution("manual", BTreeMap::from([(frs[0], ds[0][0]), (frs[1], ds[1][0])]))
            .unwrap();

        let report = session.generate_all_solutions().unwrap();
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.enumerated(), 2);
        assert_eq!(session.solutions().len(), 2);
    }

    #[test]
    fn test_generation_capacity_leaves_set_untouched() {
        init_tracing();
        let (mut session, _, _) = session(&[4, 4]);
        session
            .set_config(GeneratorConfig::default().with_limit(10))
            .unwrap();
        assert_eq!(
            session.generate_all_solutions(),
            Err(MorphError::GenerationCapacity { limit: 10 })
        );
        assert!(session.solutions().is_empty());

        let wide = GeneratorConfig::default().with_limit(1_000);
        assert_eq!(session.count_possible_solutions_with(&wide), Ok(16));
    }

    #[test]
    fn test_count_is_idempotent() {
        let (mut session, _, ds) = session(&[3, 2, 2]);
        session.set_incompatible(ds[0][1], ds[2][0]).unwrap();
        let first = session.count_possible_solutions();
        assert_eq!(first, session.count_possible_solutions());
        assert_eq!(first, Ok(10));
    }

    #[test]
    fn test_remove_all_solutions_reports_each() {
        let (mut session, _, _) = session(&[3]);
        session.generate_all_solutions().unwrap();
        let events = session.remove_all_solutions();
        assert_eq!(events.len(), 3);
        assert!(session.solutions().is_empty());
    }

    #[test]
    fn test_move_fr_changes_seed_row() {
        let (mut session, frs, _) = session(&[1, 3]);
        session.move_fr(frs[0], frs[1]);
        assert_eq!(session.matrix().iter_frs().next().unwrap().id, frs[1]);
        let report = session.generate_all_solutions().unwrap();
        assert_eq!(report.added.len(), 3);
    }

    #[test]
    fn test_with_config_validates() {
        assert!(Morphology::with_config(GeneratorConfig::default().with_limit(0)).is_err());
        let session = Morphology::with_config(GeneratorConfig::default().with_limit(50)).unwrap();
        assert_eq!(session.config().limit, 50);
    }

    #[test]
    #[should_panic(expected = "belongs to")]
    fn test_bind_foreign_ds_panics() {
        let (mut session, frs, ds) = session(&[1, 1]);
        let sol = session.new_solution("s");
        let _ = session.bind(sol, frs[0], ds[1][0]);
    }
}
