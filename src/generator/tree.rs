//! Arena-backed solution trees and the shared branch budget.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::types::{Candidate, CandidateRow};
use crate::error::{MorphError, Result};
use crate::ids::{DsId, FrId};

/// Node-creation counter shared by every tree of one enumeration call.
///
/// Atomic so that seed trees built on different threads draw from the
/// same budget with the same immediate-abort contract.
#[derive(Debug)]
pub(crate) struct BranchBudget {
    limit: usize,
    created: AtomicUsize,
}

impl BranchBudget {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            created: AtomicUsize::new(0),
        }
    }

    /// Accounts for one new node; fails once the limit is exceeded.
    pub(crate) fn admit(&self) -> Result<()> {
        let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
        if created > self.limit {
            return Err(MorphError::GenerationCapacity { limit: self.limit });
        }
        Ok(())
    }

    pub(crate) fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed).min(self.limit)
    }
}

#[derive(Debug)]
struct TreeNode {
    parent: Option<usize>,
    fr: FrId,
    ds: DsId,
    /// Declared incompatibilities of this node and all its ancestors.
    excluded: Arc<HashSet<DsId>>,
}

/// One seed tree. Nodes address their parent by index into `nodes`.
#[derive(Debug)]
pub(crate) struct SolutionTree {
    nodes: Vec<TreeNode>,
    frontier: Vec<usize>,
}

impl SolutionTree {
    /// Starts a tree rooted at `root`, bound to the seed row `fr`.
    pub(crate) fn seed(fr: FrId, root: &Candidate, budget: &BranchBudget) -> Result<Self> {
        budget.admit()?;
        Ok(Self {
            nodes: vec![TreeNode {
                parent: None,
                fr,
                ds: root.ds,
                excluded: Arc::clone(&root.incompatible),
            }],
            frontier: vec![0],
        })
    }

    /// Extends the frontier by one row.
    ///
    /// Candidates are visited in row order and, for each, the frontier in
    /// its current order; a frontier node whose inherited set contains the
    /// candidate gets no child for it.
    pub(crate) fn grow(&mut self, row: &CandidateRow, budget: &BranchBudget) -> Result<()> {
        if self.frontier.is_empty() {
            return Ok(());
        }

        let mut next = Vec::new();
        for candidate in &row.candidates {
            for &parent in &self.frontier {
                let inherited = &self.nodes[parent].excluded;
                if inherited.contains(&candidate.ds) {
                    continue;
                }
                budget.admit()?;

                let excluded = if candidate.incompatible.is_empty() {
                    Arc::clone(inherited)
                } else {
                    let capacity = inherited.len() + candidate.incompatible.len();
                    let mut union = HashSet::with_capacity(capacity);
                    union.extend(inherited.iter().copied());
                    union.extend(candidate.incompatible.iter().copied());
                    Arc::new(union)
                };

                self.nodes.push(TreeNode {
                    parent: Some(parent),
                    fr: row.fr,
                    ds: candidate.ds,
                    excluded,
                });
                next.push(self.nodes.len() - 1);
            }
        }
        self.frontier = next;
        Ok(())
    }

    /// Number of complete branches (final frontier size).
    pub(crate) fn leaf_count(&self) -> usize {
        self.frontier.len()
    }

    /// Number of nodes built for this tree.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Bindings of each complete branch, in frontier order.
    pub(crate) fn leaves(&self) -> impl Iterator<Item = BTreeMap<FrId, DsId>> + '_ {
        self.frontier.iter().map(move |&leaf| {
            let mut bindings = BTreeMap::new();
            let mut cursor = Some(leaf);
            while let Some(index) = cursor {
                let node = &self.nodes[index];
                bindings.insert(node.fr, node.ds);
                cursor = node.parent;
            }
            bindings
        })
    }
}
