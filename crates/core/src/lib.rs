//! git-solver core library.
//!
//! This crate provides the pieces behind the `git-solver` tool: configuration,
//! a process-backed git gateway, naive union resolution of conflict markers,
//! and the merge workflow that integrates two branches into main.

pub mod config;
pub mod conflict;
pub mod errors;
pub mod git;
pub mod models;
pub mod workflow;

// Re-exports for convenience.
pub use config::SolverConfig;
pub use conflict::ConflictResolver;
pub use errors::CoreError;
pub use git::{GitClient, VcsGateway};
pub use workflow::{MergeOperator, MergeWorkflow};
