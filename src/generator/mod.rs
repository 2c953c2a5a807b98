//! Solution-space enumeration.
//!
//! Produces, or only counts, every combination that picks one enabled
//! design solution per participating functional requirement while
//! respecting incompatibilities.
//!
//! # Key Components
//!
//! - [`SolutionGenerator`]: builds one tree per seed candidate and reads
//!   the result off the final frontiers
//! - [`CandidateRow`] / [`Candidate`]: the generator's input, normally
//!   built with [`CandidateRow::collect`]
//! - [`GeneratorConfig`]: branch cap and parallelism
//!
//! # Design
//!
//! Trees are arenas of nodes addressed by index; each node stores its
//! parent index and a shared, immutable set of the incompatibilities
//! declared along its path, so pruning a candidate is one hash lookup.
//! The branch cap is a counter owned by the call, not global state, and
//! is checked as each node is created: the computation is blocking, and
//! the cap is what bounds its time and memory.

mod config;
mod runner;
mod tree;
mod types;

pub use config::{GeneratorConfig, DEFAULT_BRANCH_LIMIT};
pub use runner::SolutionGenerator;
pub use types::{Candidate, CandidateRow, Enumeration, GeneratedSolution, GenerationMode};
