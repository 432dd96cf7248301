//! Secret Santa assignment engine.
//!
//! Builds a compatibility graph from participants and exclusions, searches it
//! for a single gift cycle with seeded restarts, and re-validates the result
//! before handing it back. [`server`] exposes the same pipeline over HTTP.

pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod search;
pub mod server;
pub mod shuffle;
pub mod solver;
pub mod validate;

pub use data::{
    Assignment, AssignmentSet, ExclusionMap, ExclusionRecord, GenerationInput, GenerationOptions,
    GenerationOutput, Participant, ParticipantId, PreviousPair, PreviousPairs, Seed,
};
pub use error::{AssignmentError, Infeasibility, Violation};
pub use graph::CompatibilityGraph;
pub use search::CycleSearch;
pub use solver::{Generator, generate_assignments, solve};
pub use validate::validate;
