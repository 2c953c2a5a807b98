//! Morphological matrix engine.
//!
//! A morphological matrix decomposes a design problem into functional
//! requirements (rows), each answered by one of several mutually exclusive
//! design solutions (cells). This crate provides:
//!
//! - **Matrix model**: ordered rows and cells with contiguous 1-based
//!   positions, descriptions and optional images.
//! - **Constraint graph**: per-cell `disabled` flags and symmetric,
//!   labelled incompatibilities between cells of different rows.
//! - **Solution generator**: tree-based enumeration of every valid
//!   combination, with incompatibility pruning and a global branch cap.
//!   Counting and materializing share one algorithm.
//! - **Solution set**: stored solutions, unique by canonical signature,
//!   with advisory conflict flags.
//! - **Session**: [`Morphology`] keeps all of the above consistent and
//!   re-evaluates only the solutions a change can affect.
//!
//! # Features
//!
//! - `serde`: serialization for ids and snapshot records.
//! - `parallel`: builds independent seed trees on the rayon thread pool.
//!
//! # Logging
//!
//! Diagnostics are emitted through [`tracing`]; the crate never installs a
//! subscriber.

pub mod error;
pub mod generator;
pub mod graph;
pub mod ids;
pub mod matrix;
pub mod session;
pub mod solution;

pub use error::{MorphError, Result};
pub use ids::{DsId, FrId, IncompatibilityId, SolutionId};
pub use session::Morphology;
