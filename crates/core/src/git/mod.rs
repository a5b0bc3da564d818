//! Git operations for git-solver.

pub mod client;
pub mod gateway;

pub use client::GitClient;
pub use gateway::VcsGateway;
