//! Plain-data snapshots of a session.
//!
//! A [`MatrixSnapshot`] mirrors the persisted layout of a matrix: rows with
//! their cells, labelled incompatibilities, and stored solutions. With the
//! `serde` feature every record derives `Serialize`/`Deserialize`.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::morphology::Morphology;
use crate::error::{MorphError, Result};
use crate::graph::Incompatibility;
use crate::ids::{DsId, FrId, IncompatibilityId, SolutionId};
use crate::solution::Solution;

/// Complete persisted state of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatrixSnapshot {
    pub frs: Vec<FrRecord>,
    pub incompatibilities: Vec<IncompatibilityRecord>,
    pub solutions: Vec<SolutionRecord>,
}

/// One functional requirement with its cells.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrRecord {
    pub id: FrId,
    /// 1-based row position.
    pub position: usize,
    pub description: String,
    pub design_solutions: Vec<DsRecord>,
}

/// One design solution cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DsRecord {
    pub id: DsId,
    /// 1-based position within the row.
    pub position: usize,
    #[cfg_attr(feature = "serde", serde(default))]
    pub disabled: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IncompatibilityRecord {
    pub id: IncompatibilityId,
    pub name: String,
    pub pair: (DsId, DsId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolutionRecord {
    pub id: SolutionId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub color: Option<String>,
    pub bindings: BTreeMap<FrId, DsId>,
}

impl Morphology {
    /// Captures the current state. Rows and cells are listed in position
    /// order, incompatibilities and solutions in id order.
    pub fn to_snapshot(&self) -> MatrixSnapshot {
        let frs = self
            .matrix
            .iter_frs()
            .map(|fr| FrRecord {
                id: fr.id,
                position: fr.position,
                description: fr.description.clone(),
                design_solutions: self
                    .matrix
                    .design_solutions(fr.id)
                    .map(|ds| DsRecord {
                        id: ds.id,
                        position: ds.position,
                        disabled: self.graph.is_disabled(ds.id),
                        image: ds.image.clone(),
                        description: ds.description.clone(),
                    })
                    .collect(),
            })
            .collect();

        let incompatibilities = self
            .graph
            .incompatibilities()
            .map(|edge| IncompatibilityRecord {
                id: edge.id,
                name: edge.name.clone(),
                pair: edge.pair(),
            })
            .collect();

        let solutions = self
            .solutions
            .iter()
            .map(|s| SolutionRecord {
                id: s.id,
                name: s.name.clone(),
                color: s.color.clone(),
                bindings: s.bindings().clone(),
            })
            .collect();

        MatrixSnapshot {
            frs,
            incompatibilities,
            solutions,
        }
    }

    /// Rebuilds a session from a snapshot.
    ///
    /// Rows and cells are ordered by their recorded positions. Structural
    /// damage (reused ids, ids equal to `u64::MAX`, references to unknown
    /// design solutions, a binding whose design solution belongs to another
    /// row) fails with [`MorphError::Snapshot`]. Entries that merely
    /// violate an invariant (same-row or duplicate incompatibilities,
    /// duplicate solutions) are logged and dropped. Conflict flags are
    /// recomputed from scratch, so bindings to disabled design solutions
    /// are kept and flagged.
    pub fn from_snapshot(snapshot: MatrixSnapshot) -> Result<Self> {
        let mut session = Self::new();
        let MatrixSnapshot {
            mut frs,
            incompatibilities,
            solutions,
        } = snapshot;

        frs.sort_by_key(|fr| fr.position);
        for mut fr in frs {
            session.matrix.insert_fr(fr.id, fr.description)?;

            fr.design_solutions.sort_by_key(|ds| ds.position);
            for ds in fr.design_solutions {
                session
                    .matrix
                    .insert_ds(fr.id, ds.id, ds.description, ds.image)?;
                session.graph.add_node(ds.id);
                if ds.disabled {
                    session.graph.set_disabled(ds.id, true);
                }
            }
        }

        for record in incompatibilities {
            let (a, b) = record.pair;
            let (Some(fr_a), Some(fr_b)) = (session.matrix.fr_of(a), session.matrix.fr_of(b)) else {
                return Err(MorphError::Snapshot(format!(
                    "{} links unknown design solutions {a} and {b}",
                    record.id
                )));
            };
            if a == b || fr_a == fr_b {
                warn!(id = %record.id, a = %a, b = %b, "dropping same-row incompatibility");
                continue;
            }
            match session
                .graph
                .insert_incompatibility(Incompatibility::new(record.id, record.name, a, b))
            {
                Ok(_) => {}
                Err(MorphError::IncompatibilityExists { a, b }) => {
                    warn!(id = %record.id, a = %a, b = %b, "dropping duplicate incompatibility");
                }
                Err(err) => return Err(err),
            }
        }

        for record in solutions {
            for (&fr, &ds) in &record.bindings {
                match session.matrix.fr_of(ds) {
                    Some(owner) if owner == fr => {}
                    Some(owner) => {
                        return Err(MorphError::Snapshot(format!(
                            "{} binds {ds} for {fr} but it belongs to {owner}",
                            record.id
                        )));
                    }
                    None => {
                        return Err(MorphError::Snapshot(format!(
                            "{} binds unknown design solution {ds}",
                            record.id
                        )));
                    }
                }
            }

            let mut solution = Solution::new(record.id, record.name, record.bindings);
            solution.color = record.color;
            match session.solutions.restore(solution) {
                Ok(id) => {
                    session.solutions.refresh_conflicts(id, &session.graph);
                }
                Err(MorphError::SolutionExists { signature }) => {
                    warn!(id = %record.id, signature = %signature, "dropping duplicate solution");
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            event = "snapshot_restored",
            frs = session.matrix.len(),
            design_solutions = session.matrix.ds_count(),
            incompatibilities = session.graph.incompatibilities().count(),
            solutions = session.solutions.len(),
        );
        Ok(session)
    }
}
