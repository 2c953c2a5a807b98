//! Constraint graph over design solutions.
//!
//! Holds, per design solution, its `disabled` flag and the set of design
//! solutions it cannot be combined with. Incompatibility is symmetric: the
//! relation is stored once per endpoint and created or destroyed on both
//! sides in the same call.
//!
//! # Key Components
//!
//! - [`ConstraintGraph`]: id-keyed adjacency plus the labelled edge table
//! - [`Incompatibility`]: one labelled edge between two design solutions
//!
//! # Design
//!
//! The graph does not know which functional requirement owns a design
//! solution. Rejecting same-row pairs is the caller's job (see
//! [`crate::session::Morphology::set_incompatible`]).

mod constraint;
mod types;

pub use constraint::ConstraintGraph;
pub use types::Incompatibility;
