//! Automatic resolution of conflicted files left behind by a merge.

pub mod resolver;

pub use resolver::{resolve_text, ConflictResolver, ResolveSummary, ResolvedText};
