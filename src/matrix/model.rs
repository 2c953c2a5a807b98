//! Matrix ownership, ordering and traversal.

use std::collections::HashMap;

use super::types::{DesignSolution, FunctionalRequirement};
use crate::error::{MorphError, Result};
use crate::graph::ConstraintGraph;
use crate::ids::{DsId, FrId};

/// Ordered rows of a morphological matrix and the cells they own.
///
/// Mutators here only maintain ownership and positions. Cascades into the
/// constraint graph and stored solutions are driven by
/// [`crate::session::Morphology`].
///
/// # Examples
///
/// ```
/// use u_morph::matrix::MatrixModel;
///
/// let mut matrix = MatrixModel::new();
/// let power = matrix.add_fr("Provide power");
/// let battery = matrix.add_ds(power, "Battery");
/// let solar = matrix.add_ds(power, "Solar panel");
///
/// assert_eq!(matrix.ds(solar).unwrap().position, 2);
/// matrix.delete_ds(battery);
/// assert_eq!(matrix.ds(solar).unwrap().position, 1);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixModel {
    frs: Vec<FunctionalRequirement>,
    dss: HashMap<DsId, DesignSolution>,
    next_fr: u64,
    next_ds: u64,
}

impl Default for MatrixModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixModel {
    /// Creates an empty matrix.
    pub fn new() -> Self {
        Self {
            frs: Vec::new(),
            dss: HashMap::new(),
            next_fr: 1,
            next_ds: 1,
        }
    }

    /// Appends a new row at the bottom.
    ///
    /// # Panics
    /// Panics if no row id is left, which only happens after restoring a
    /// row whose id is `u64::MAX - 1`.
    pub fn add_fr(&mut self, description: impl Into<String>) -> FrId {
        let id = FrId(self.next_fr);
        if let Err(err) = self.insert_fr(id, description) {
            panic!("cannot allocate a row id: {err}");
        }
        id
    }

    /// Appends a row with a caller-chosen id (used when restoring state).
    ///
    /// Fails with [`MorphError::Snapshot`] if `id` is already used or is
    /// `u64::MAX`; nothing changes in that case.
    pub fn insert_fr(&mut self, id: FrId, description: impl Into<String>) -> Result<()> {
        if self.fr(id).is_some() {
            return Err(MorphError::Snapshot(format!("{id} is listed twice")));
        }
        let next = id.checked_next().ok_or_else(|| MorphError::id_out_of_range(id))?;

        let position = self.frs.len() + 1;
        self.frs
            .push(FunctionalRequirement::new(id, position, description.into()));
        self.next_fr = self.next_fr.max(next.get());
        Ok(())
    }

    /// Appends a new design solution at the end of `fr`'s row.
    ///
    /// # Panics
    /// Panics if `fr` is unknown, or if no cell id is left (see
    /// [`MatrixModel::add_fr`]).
    pub fn add_ds(&mut self, fr: FrId, description: impl Into<String>) -> DsId {
        let id = DsId(self.next_ds);
        if let Err(err) = self.insert_ds(fr, id, description, None) {
            panic!("cannot allocate a cell id: {err}");
        }
        id
    }

    /// Appends a design solution with a caller-chosen id.
    ///
    /// Fails with [`MorphError::Snapshot`] if `id` is already used or is
    /// `u64::MAX`; nothing changes in that case.
    ///
    /// # Panics
    /// Panics if `fr` is unknown.
    pub fn insert_ds(
        &mut self,
        fr: FrId,
        id: DsId,
        description: impl Into<String>,
        image: Option<String>,
    ) -> Result<()> {
        if self.dss.contains_key(&id) {
            return Err(MorphError::Snapshot(format!("{id} is listed twice")));
        }
        let next = id.checked_next().ok_or_else(|| MorphError::id_out_of_range(id))?;

        let row = self.fr_mut(fr);
        row.design_solutions.push(id);
        let position = row.design_solutions.len();

        self.dss.insert(
            id,
            DesignSolution {
                id,
                fr,
                position,
                description: description.into(),
                image,
            },
        );
        self.next_ds = self.next_ds.max(next.get());
        Ok(())
    }

    /// Removes a row and every design solution it still owns.
    ///
    /// Rows after it move up by one position. Returns the removed row and
    /// its removed cells in position order.
    ///
    /// # Panics
    /// Panics if `fr` is unknown.
    pub fn delete_fr(&mut self, fr: FrId) -> (FunctionalRequirement, Vec<DesignSolution>) {
        let index = self.fr_index(fr);
        let row = self.frs.remove(index);
        for (i, later) in self.frs.iter_mut().enumerate().skip(index) {
            later.position = i + 1;
        }

        let cells = row
            .design_solutions
            .iter()
            .filter_map(|ds| self.dss.remove(ds))
            .collect();
        (row, cells)
    }

    /// Removes a design solution from its row.
    ///
    /// Later cells in the same row move up by one position.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn delete_ds(&mut self, ds: DsId) -> DesignSolution {
        let cell = self
            .dss
            .remove(&ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"));

        let row = self.fr_mut(cell.fr);
        row.design_solutions.retain(|&id| id != ds);
        let remaining = row.design_solutions.clone();
        self.renumber_cells(&remaining);
        cell
    }

    /// Swaps the positions of two rows.
    ///
    /// # Panics
    /// Panics if either id is unknown.
    pub fn move_fr(&mut self, a: FrId, b: FrId) {
        let ia = self.fr_index(a);
        let ib = self.fr_index(b);
        self.frs.swap(ia, ib);
        self.frs[ia].position = ia + 1;
        self.frs[ib].position = ib + 1;
    }

    /// Swaps the positions of two design solutions within one row.
    ///
    /// # Panics
    /// Panics if either id is unknown or the two belong to different rows.
    pub fn move_ds(&mut self, a: DsId, b: DsId) {
        let fr = self.fr_of(a).unwrap_or_else(|| panic!("unknown design solution {a}"));
        let fr_b = self.fr_of(b).unwrap_or_else(|| panic!("unknown design solution {b}"));
        assert_eq!(fr, fr_b, "{a} and {b} belong to different rows");

        let row = self.fr_mut(fr);
        let ia = row.design_solutions.iter().position(|&id| id == a);
        let ib = row.design_solutions.iter().position(|&id| id == b);
        if let (Some(ia), Some(ib)) = (ia, ib) {
            row.design_solutions.swap(ia, ib);
        }
        let order = row.design_solutions.clone();
        self.renumber_cells(&order);
    }

    /// Replaces a row's description.
    pub fn set_fr_description(&mut self, fr: FrId, description: impl Into<String>) {
        self.fr_mut(fr).description = description.into();
    }

    /// Replaces a cell's description.
    pub fn set_ds_description(&mut self, ds: DsId, description: impl Into<String>) {
        self.ds_mut(ds).description = description.into();
    }

    /// Replaces a cell's image reference.
    pub fn set_ds_image(&mut self, ds: DsId, image: Option<String>) {
        self.ds_mut(ds).image = image;
    }

    /// Looks up a row.
    pub fn fr(&self, fr: FrId) -> Option<&FunctionalRequirement> {
        self.frs.iter().find(|row| row.id == fr)
    }

    /// Looks up a cell.
    pub fn ds(&self, ds: DsId) -> Option<&DesignSolution> {
        self.dss.get(&ds)
    }

    /// The row owning `ds`.
    pub fn fr_of(&self, ds: DsId) -> Option<FrId> {
        self.dss.get(&ds).map(|cell| cell.fr)
    }

    /// Rows in position order.
    pub fn iter_frs(&self) -> impl Iterator<Item = &FunctionalRequirement> {
        self.frs.iter()
    }

    /// Cells of `fr` in position order.
    ///
    /// # Panics
    /// Panics if `fr` is unknown.
    pub fn design_solutions(&self, fr: FrId) -> impl Iterator<Item = &DesignSolution> + '_ {
        self.fr_ref(fr)
            .design_solutions
            .iter()
            .filter_map(|id| self.dss.get(id))
    }

    /// Cells of `fr` that are not disabled, in position order.
    ///
    /// Recomputed on every call; nothing is cached.
    ///
    /// # Panics
    /// Panics if `fr` is unknown.
    pub fn enabled_design_solutions<'a>(
        &'a self,
        fr: FrId,
        graph: &'a ConstraintGraph,
    ) -> impl Iterator<Item = &'a DesignSolution> + 'a {
        self.design_solutions(fr)
            .filter(move |cell| !graph.is_disabled(cell.id))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.frs.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.frs.is_empty()
    }

    /// Total number of cells across all rows.
    pub fn ds_count(&self) -> usize {
        self.dss.len()
    }

    fn renumber_cells(&mut self, order: &[DsId]) {
        for (i, id) in order.iter().enumerate() {
            if let Some(cell) = self.dss.get_mut(id) {
                cell.position = i + 1;
            }
        }
    }

    fn fr_index(&self, fr: FrId) -> usize {
        self.frs
            .iter()
            .position(|row| row.id == fr)
            .unwrap_or_else(|| panic!("unknown functional requirement {fr}"))
    }

    fn fr_ref(&self, fr: FrId) -> &FunctionalRequirement {
        &self.frs[self.fr_index(fr)]
    }

    fn fr_mut(&mut self, fr: FrId) -> &mut FunctionalRequirement {
        let index = self.fr_index(fr);
        &mut self.frs[index]
    }

    fn ds_mut(&mut self, ds: DsId) -> &mut DesignSolution {
        self.dss
            .get_mut(&ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"))
    }
}
