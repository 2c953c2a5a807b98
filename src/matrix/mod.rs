//! Matrix model: functional requirements and their design solutions.
//!
//! A morphological matrix is an ordered list of functional requirements
//! (rows). Each row owns an ordered list of mutually exclusive design
//! solutions (cells). Positions are 1-based and kept contiguous: deleting
//! a row or cell renumbers everything after it.
//!
//! # Key Components
//!
//! - [`MatrixModel`]: row/cell ownership, ordering and traversal
//! - [`FunctionalRequirement`]: one row
//! - [`DesignSolution`]: one cell
//!
//! Disabled flags live in the [`crate::graph::ConstraintGraph`]; traversal
//! that filters on them takes the graph as an argument.

mod model;
mod types;

pub use model::MatrixModel;
pub use types::{DesignSolution, FunctionalRequirement};
