//! Constraint graph storage and mutators.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::types::Incompatibility;
use crate::error::{MorphError, Result};
use crate::ids::{DsId, IncompatibilityId};

#[derive(Debug, Clone, Default)]
struct DsNode {
    disabled: bool,
    /// Partner design solution -> edge id. Mirrored on the partner node.
    incompatible: BTreeMap<DsId, IncompatibilityId>,
}

/// Disabled flags and symmetric incompatibility relations of design solutions.
///
/// # Examples
///
/// ```
/// use u_morph::graph::ConstraintGraph;
/// use u_morph::DsId;
///
/// let mut graph = ConstraintGraph::new();
/// graph.add_node(DsId(1));
/// graph.add_node(DsId(2));
///
/// graph.set_incompatible(DsId(1), DsId(2)).unwrap();
/// assert!(graph.is_incompatible(DsId(2), DsId(1)));
/// assert!(graph.set_incompatible(DsId(2), DsId(1)).is_err());
///
/// graph.remove_incompatibility(DsId(1), DsId(2));
/// assert!(!graph.is_incompatible(DsId(1), DsId(2)));
/// ```
#[derive(Debug, Clone)]
pub struct ConstraintGraph {
    nodes: HashMap<DsId, DsNode>,
    edges: BTreeMap<IncompatibilityId, Incompatibility>,
    next_edge: u64,
}

impl Default for ConstraintGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstraintGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: BTreeMap::new(),
            next_edge: 1,
        }
    }

    /// Registers an enabled design solution with no relations.
    ///
    /// # Panics
    /// Panics if `ds` is already registered.
    pub fn add_node(&mut self, ds: DsId) {
        let previous = self.nodes.insert(ds, DsNode::default());
        assert!(previous.is_none(), "{ds} is already in the constraint graph");
    }

    /// Unregisters a design solution, returning every edge that touched it.
    ///
    /// The partner side of each edge is removed as well.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn remove_node(&mut self, ds: DsId) -> Vec<Incompatibility> {
        let node = self
            .nodes
            .remove(&ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"));

        let mut removed = Vec::with_capacity(node.incompatible.len());
        for (partner, edge_id) in node.incompatible {
            if let Some(partner_node) = self.nodes.get_mut(&partner) {
                partner_node.incompatible.remove(&ds);
            }
            if let Some(edge) = self.edges.remove(&edge_id) {
                removed.push(edge);
            }
        }
        removed
    }

    /// Whether `ds` is registered.
    pub fn contains(&self, ds: DsId) -> bool {
        self.nodes.contains_key(&ds)
    }

    /// Number of registered design solutions.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no design solution is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Links `a` and `b` with a default-named edge.
    ///
    /// Fails with [`MorphError::IncompatibilityExists`] if the pair is
    /// already linked; nothing changes in that case.
    ///
    /// # Panics
    /// Panics if `a == b` or either id is unknown.
    pub fn set_incompatible(&mut self, a: DsId, b: DsId) -> Result<IncompatibilityId> {
        let id = IncompatibilityId(self.next_edge);
        self.link(Incompatibility::new(id, Incompatibility::default_name(id), a, b))
    }

    /// Links `a` and `b` with a caller-supplied label.
    pub fn set_incompatible_named(
        &mut self,
        a: DsId,
        b: DsId,
        name: impl Into<String>,
    ) -> Result<IncompatibilityId> {
        let id = IncompatibilityId(self.next_edge);
        self.link(Incompatibility::new(id, name, a, b))
    }

    /// Inserts an edge that already carries its id (used when restoring
    /// saved state).
    ///
    /// Fails with [`MorphError::IncompatibilityExists`] if the pair is
    /// already linked, and with [`MorphError::Snapshot`] if the id is
    /// already taken by another edge or is `u64::MAX`.
    pub fn insert_incompatibility(&mut self, edge: Incompatibility) -> Result<IncompatibilityId> {
        if self.edges.contains_key(&edge.id) {
            return Err(MorphError::Snapshot(format!(
                "incompatibility id {} is used twice",
                edge.id
            )));
        }
        self.link(edge)
    }

    fn link(&mut self, edge: Incompatibility) -> Result<IncompatibilityId> {
        let (a, b) = edge.pair();
        assert!(self.nodes.contains_key(&a), "unknown design solution {a}");
        assert!(self.nodes.contains_key(&b), "unknown design solution {b}");

        if self.is_incompatible(a, b) {
            return Err(MorphError::IncompatibilityExists { a, b });
        }
        let id = edge.id;
        let next = id.checked_next().ok_or_else(|| MorphError::id_out_of_range(id))?;

        if let Some(node) = self.nodes.get_mut(&a) {
            node.incompatible.insert(b, id);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.incompatible.insert(a, id);
        }
        self.next_edge = self.next_edge.max(next.get());
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Removes the edge between `a` and `b` from both sides.
    ///
    /// Returns the removed edge, or `None` if the pair was not linked.
    pub fn remove_incompatibility(&mut self, a: DsId, b: DsId) -> Option<Incompatibility> {
        let edge_id = self.nodes.get(&a)?.incompatible.get(&b).copied()?;
        self.remove_incompatibility_by_id(edge_id)
    }

    /// Removes an edge by id from both sides.
    pub fn remove_incompatibility_by_id(
        &mut self,
        id: IncompatibilityId,
    ) -> Option<Incompatibility> {
        let edge = self.edges.remove(&id)?;
        let (a, b) = edge.pair();
        if let Some(node) = self.nodes.get_mut(&a) {
            node.incompatible.remove(&b);
        }
        if let Some(node) = self.nodes.get_mut(&b) {
            node.incompatible.remove(&a);
        }
        Some(edge)
    }

    /// Sets the disabled flag of `ds`.
    ///
    /// Returns `true` if the flag changed. Setting the current value is a
    /// no-op and returns `false`.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn set_disabled(&mut self, ds: DsId, disabled: bool) -> bool {
        let node = self.node_mut(ds);
        if node.disabled == disabled {
            debug!(ds = %ds, disabled, "disabled flag unchanged");
            return false;
        }
        node.disabled = disabled;
        true
    }

    /// Whether `ds` is disabled.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn is_disabled(&self, ds: DsId) -> bool {
        self.node(ds).disabled
    }

    /// Whether `a` and `b` are linked. Unknown ids are never incompatible.
    pub fn is_incompatible(&self, a: DsId, b: DsId) -> bool {
        self.nodes
            .get(&a)
            .is_some_and(|node| node.incompatible.contains_key(&b))
    }

    /// Design solutions incompatible with `ds`, in ascending id order.
    ///
    /// # Panics
    /// Panics if `ds` is unknown.
    pub fn incompatible_ids_of(&self, ds: DsId) -> impl Iterator<Item = DsId> + '_ {
        self.node(ds).incompatible.keys().copied()
    }

    /// Number of partners `ds` is incompatible with.
    pub fn incompatibility_count(&self, ds: DsId) -> usize {
        self.node(ds).incompatible.len()
    }

    /// The edge linking `a` and `b`, if any.
    pub fn incompatibility_between(&self, a: DsId, b: DsId) -> Option<&Incompatibility> {
        let id = self.nodes.get(&a)?.incompatible.get(&b)?;
        self.edges.get(id)
    }

    /// Looks up an edge by id.
    pub fn incompatibility(&self, id: IncompatibilityId) -> Option<&Incompatibility> {
        self.edges.get(&id)
    }

    /// All edges in id order.
    pub fn incompatibilities(&self) -> impl Iterator<Item = &Incompatibility> {
        self.edges.values()
    }

    fn node(&self, ds: DsId) -> &DsNode {
        self.nodes
            .get(&ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"))
    }

    fn node_mut(&mut self, ds: DsId) -> &mut DsNode {
        self.nodes
            .get_mut(&ds)
            .unwrap_or_else(|| panic!("unknown design solution {ds}"))
    }
}
