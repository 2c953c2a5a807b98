//! Editing session and incremental maintenance.
//!
//! [`Morphology`] ties the matrix, the constraint graph and the solution set
//! together. Each mutator applies its change to all three, re-evaluates
//! only the solutions the change can affect, and returns the resulting
//! [`MatrixEvent`]s in order.
//!
//! # Snapshots
//!
//! [`Morphology::to_snapshot`] and [`Morphology::from_snapshot`] convert
//! to and from [`MatrixSnapshot`], a plain-data record tree that derives
//! serde traits under the `serde` feature.

mod events;
mod morphology;
mod snapshot;

pub use events::{GenerationReport, MatrixEvent};
pub use morphology::Morphology;
pub use snapshot::{DsRecord, FrRecord, IncompatibilityRecord, MatrixSnapshot, SolutionRecord};
