//! Domain model types used throughout git-solver.
//!
//! Free-text operator input (branch names, remote URLs) is validated into the
//! wrapper types here at the workflow boundary so raw strings never reach the
//! gateway.

use std::fmt;
use std::path::PathBuf;

use crate::errors::{GitError, WorkflowError};

// ---------------------------------------------------------------------------
// Branch names
// ---------------------------------------------------------------------------

/// A validated git branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Validate `input` (surrounding whitespace is trimmed).
    pub fn parse(input: &str) -> Result<Self, WorkflowError> {
        let name = input.trim();
        if let Some(reason) = branch_name_problem(name) {
            return Err(WorkflowError::InvalidBranchName {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Subset of `git check-ref-format --branch` rules, plus no leading `-` so a
/// name can never be read as an option.
fn branch_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("must not be empty");
    }
    if name.starts_with('-') {
        return Some("must not start with '-'");
    }
    if name == "@" {
        return Some("must not be '@'");
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Some("must not contain whitespace or control characters");
    }
    if name.chars().any(|c| matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\')) {
        return Some("must not contain any of ~ ^ : ? * [ \\");
    }
    if name.contains("..") {
        return Some("must not contain '..'");
    }
    if name.contains("@{") {
        return Some("must not contain '@{'");
    }
    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return Some("must not have empty path components");
    }
    if name.ends_with('.') || name.ends_with(".lock") {
        return Some("must not end with '.' or '.lock'");
    }
    if name.split('/').any(|component| component.starts_with('.')) {
        return Some("path components must not start with '.'");
    }
    None
}

// ---------------------------------------------------------------------------
// Remote URLs
// ---------------------------------------------------------------------------

/// A validated remote URL (or local path) for `origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUrl(String);

impl RemoteUrl {
    pub fn parse(input: &str) -> Result<Self, WorkflowError> {
        let url = input.trim();
        let reason = if url.is_empty() {
            Some("must not be empty")
        } else if url.starts_with('-') {
            Some("must not start with '-'")
        } else if url.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(WorkflowError::InvalidRemoteUrl {
                url: url.to_string(),
                reason: reason.to_string(),
            }),
            None => Ok(Self(url.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Branch references
// ---------------------------------------------------------------------------

/// A branch name resolved against the repository.
///
/// `Remote` is only produced when the name was absent locally but present as
/// `<remote>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchRef {
    Local(BranchName),
    Remote { remote: String, name: BranchName },
}

impl BranchRef {
    /// The revision string handed to git.
    pub fn revision(&self) -> String {
        self.to_string()
    }

    pub fn name(&self) -> &BranchName {
        match self {
            Self::Local(name) | Self::Remote { name, .. } => name,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(name) => write!(f, "{}", name),
            Self::Remote { remote, name } => write!(f, "{}/{}", remote, name),
        }
    }
}

// ---------------------------------------------------------------------------
// Command results
// ---------------------------------------------------------------------------

/// Captured result of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Error detail: stderr, else stdout, else a generic message.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        "unknown error".to_string()
    }
}

/// Outcome of a conflict-tolerant merge invocation.
///
/// A conflicted merge exits non-zero but is expected; `error` is only set
/// when the merge failed and left no conflicted paths.
#[derive(Debug)]
pub struct MergeAttempt {
    /// The conflict set reported right after the merge, repo-relative.
    pub conflicts: Vec<PathBuf>,
    pub error: Option<GitError>,
}

impl MergeAttempt {
    pub fn clean() -> Self {
        Self {
            conflicts: Vec::new(),
            error: None,
        }
    }

    pub fn conflicted(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Collapse into `Ok(conflicted)` or the merge error.
    pub fn into_result(self) -> Result<bool, GitError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(!self.conflicts.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow vocabulary
// ---------------------------------------------------------------------------

/// Which of the two requested branches a step concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSide {
    Yours,
    Friend,
}

impl fmt::Display for MergeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yours => write!(f, "your"),
            Self::Friend => write!(f, "friend"),
        }
    }
}

/// How a branch landed on the integration branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    Clean,
    Resolved { files: usize },
}

impl fmt::Display for MergeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Resolved { files } => write!(f, "resolved ({} file(s))", files),
        }
    }
}

/// Progress of one merge workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    OriginConfigured,
    BranchesValidated,
    IntegrationBranchCreated,
    YourBranchMerged(MergeKind),
    FriendBranchMerged(MergeKind),
    Pushed,
    Done,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::OriginConfigured => write!(f, "origin_configured"),
            Self::BranchesValidated => write!(f, "branches_validated"),
            Self::IntegrationBranchCreated => write!(f, "integration_branch_created"),
            Self::YourBranchMerged(kind) => write!(f, "your_branch_merged ({})", kind),
            Self::FriendBranchMerged(kind) => write!(f, "friend_branch_merged ({})", kind),
            Self::Pushed => write!(f, "pushed"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_accepts_common_names() {
        for name in ["main", "feature-a", "feature/login", "release-1.2", "user/x_y"] {
            assert_eq!(BranchName::parse(name).unwrap().as_str(), name);
        }
        assert_eq!(BranchName::parse("  spaced  ").unwrap().as_str(), "spaced");
    }

    #[test]
    fn test_branch_name_rejects_bad_names() {
        for name in [
            "", "   ", "-rf", "two words", "a..b", "x~1", "x^", "a:b", "wild*", "a[b",
            "ends.lock", "ends.", "/lead", "trail/", "a//b", "@", "a@{1}", ".hidden",
            "dir/.hidden",
        ] {
            assert!(
                matches!(
                    BranchName::parse(name),
                    Err(WorkflowError::InvalidBranchName { .. })
                ),
                "expected '{}' to be rejected",
                name
            );
        }
    }

    #[test]
    fn test_remote_url_validation() {
        assert_eq!(
            RemoteUrl::parse(" git@github.com:acme/repo.git ").unwrap().as_str(),
            "git@github.com:acme/repo.git"
        );
        assert!(RemoteUrl::parse("").is_err());
        assert!(RemoteUrl::parse("--upload-pack=x").is_err());
        assert!(RemoteUrl::parse("https://x y").is_err());
    }

    #[test]
    fn test_branch_ref_display() {
        let name = BranchName::parse("feature-b").unwrap();
        assert_eq!(BranchRef::Local(name.clone()).to_string(), "feature-b");
        let remote = BranchRef::Remote {
            remote: "origin".into(),
            name,
        };
        assert_eq!(remote.revision(), "origin/feature-b");
        assert_eq!(remote.name().as_str(), "feature-b");
        assert!(remote.is_remote());
    }

    #[test]
    fn test_command_output_detail_fallbacks() {
        let mut out = CommandOutput {
            exit_code: 1,
            stdout: "  out \n".into(),
            stderr: " err\n".into(),
        };
        assert_eq!(out.detail(), "err");
        out.stderr = "\n".into();
        assert_eq!(out.detail(), "out");
        out.stdout.clear();
        assert_eq!(out.detail(), "unknown error");
        assert!(!out.success());
    }

    #[test]
    fn test_merge_attempt_into_result() {
        assert!(!MergeAttempt::clean().into_result().unwrap());

        let conflicted = MergeAttempt {
            conflicts: vec![PathBuf::from("a.txt")],
            error: None,
        };
        assert!(conflicted.conflicted());
        assert!(conflicted.into_result().unwrap());

        let failed = MergeAttempt {
            conflicts: Vec::new(),
            error: Some(GitError::MergeFailed {
                target: "x".into(),
                exit_code: 128,
                message: "not something we can merge".into(),
            }),
        };
        assert!(matches!(failed.into_result(), Err(GitError::MergeFailed { .. })));
    }
}
