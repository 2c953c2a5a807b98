//! Materialized solutions.
//!
//! A [`Solution`] maps functional requirements to at most one design
//! solution each. The [`SolutionSet`] keeps solutions unique by their
//! canonical signature and tracks, per solution, which bound design
//! solutions have since become disabled or mutually incompatible.
//!
//! Conflict flags are advisory: a flagged binding stays in place until the
//! user rebinds or unbinds it.

mod set;
mod types;

pub use set::{ConflictDelta, SolutionSet};
pub use types::{signature_of, Solution};
