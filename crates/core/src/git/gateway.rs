//! The seam between the merge workflow and the version-control engine.

use std::path::PathBuf;

use crate::errors::GitError;
use crate::models::{BranchName, BranchRef, CommandOutput, MergeAttempt, RemoteUrl};

/// Operations the merge workflow needs from git.
///
/// All calls are synchronous and act on the real working tree; none are
/// idempotent with respect to repository state.
pub trait VcsGateway {
    /// Name of the remote fetched from and pushed to (usually `origin`).
    fn remote_name(&self) -> &str;

    /// Run a git subcommand. Fails with [`GitError::CommandFailed`] on a
    /// non-zero exit.
    fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError>;

    /// Merge `target` into the current branch without aborting on conflict.
    fn run_merge(&self, target: &BranchRef) -> Result<MergeAttempt, GitError>;

    /// Repo-relative paths currently in the unmerged state. Never cached.
    fn conflicted_files(&self) -> Result<Vec<PathBuf>, GitError>;

    fn has_conflicts(&self) -> Result<bool, GitError> {
        Ok(!self.conflicted_files()?.is_empty())
    }

    /// Whether the working directory is inside a git work tree.
    fn is_repo(&self) -> bool;

    /// Absolute path of the work-tree root.
    fn toplevel(&self) -> Result<PathBuf, GitError>;

    /// Any modified, added, staged or untracked entry.
    fn has_uncommitted_changes(&self) -> Result<bool, GitError>;

    /// Resolve `name` locally first, then as `<remote>/<name>`.
    fn branch_exists(&self, name: &BranchName) -> Result<Option<BranchRef>, GitError>;

    /// Delete a stale `index.lock`. Best-effort: returns whether one was
    /// removed and never fails.
    fn cleanup_lock_files(&self) -> bool;

    /// Push a stash entry tagged with the stash marker.
    fn stash(&self) -> Result<(), GitError>;

    /// Pop the most recent stash entry if an entry bearing the stash marker
    /// exists. Returns whether anything was popped.
    fn unstash(&self) -> Result<bool, GitError>;

    /// URL of the configured remote, `None` if it is not set up.
    fn origin_url(&self) -> Result<Option<String>, GitError>;

    /// Add the remote, or update its URL if it already exists.
    fn set_origin_url(&self, url: &RemoteUrl) -> Result<(), GitError>;
}
