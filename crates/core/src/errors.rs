//! Error types for the git-solver core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from invoking the external `git` binary.
#[derive(Debug, Error)]
pub enum GitError {
    /// The configured `git` executable could not be spawned.
    #[error("git binary not found: {0}")]
    BinaryNotFound(String),

    /// A `git` command exited with a non-zero status.
    ///
    /// `message` is the trimmed stderr, falling back to stdout, falling back
    /// to a generic message.
    #[error("git command failed: {message}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        message: String,
    },

    /// A merge exited non-zero without leaving any conflicted paths behind.
    #[error("merge of '{target}' failed: {message}")]
    MergeFailed {
        target: String,
        exit_code: i32,
        message: String,
    },

    /// Generic I/O wrapper (process spawn, pipe errors).
    #[error("git I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Conflict errors
// ---------------------------------------------------------------------------

/// Errors from rewriting conflicted files.
#[derive(Debug, Error)]
pub enum ConflictError {
    /// A conflicted file could not be read (missing, unreadable, not UTF-8).
    #[error("failed to read conflicted file '{}': {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resolved content could not be written back.
    #[error("failed to write resolved file '{}': {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Workflow errors
// ---------------------------------------------------------------------------

/// Hard failures of the merge workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The working directory is not inside a git work tree.
    #[error("not a git repository")]
    NotARepository,

    /// A requested branch resolved neither locally nor on the remote.
    #[error("branch '{name}' not found locally or on {remote}")]
    BranchNotFound { name: String, remote: String },

    /// Operator input is not a usable branch name.
    #[error("invalid branch name '{name}': {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// Operator input is not a usable remote URL.
    #[error("invalid remote URL '{url}': {reason}")]
    InvalidRemoteUrl { url: String, reason: String },

    /// The operator interrupted a prompt or closed its input.
    #[error("interrupted")]
    Interrupted,

    /// A prompt could not be shown or read.
    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

/// Non-fatal: the auto-stash could not be popped after a run.
#[derive(Debug, Error)]
#[error("could not restore stashed changes ({detail}); run 'git stash pop' manually")]
pub struct StashRestoreWarning {
    pub detail: String,
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = GitError::CommandFailed {
            command: "git push origin main".into(),
            exit_code: 1,
            message: "rejected".into(),
        };
        assert_eq!(err.to_string(), "git command failed: rejected");

        let err = WorkflowError::BranchNotFound {
            name: "nope".into(),
            remote: "origin".into(),
        };
        assert_eq!(err.to_string(), "branch 'nope' not found locally or on origin");

        let err = StashRestoreWarning {
            detail: "conflict in notes.txt".into(),
        };
        assert!(err.to_string().contains("git stash pop"));

        let err = ConflictError::ReadFailed {
            path: PathBuf::from("src/lib.rs"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("src/lib.rs"));
    }

    #[test]
    fn test_workflow_error_is_transparent_over_git() {
        let git = GitError::BinaryNotFound("/opt/git".into());
        let err: WorkflowError = git.into();
        assert_eq!(err.to_string(), "git binary not found: /opt/git");
    }

    #[test]
    fn test_core_error_from_subsystem() {
        let core_err: CoreError = ConfigError::FileNotFound("x.toml".into()).into();
        assert!(matches!(core_err, CoreError::Config(_)));

        let core_err: CoreError = WorkflowError::NotARepository.into();
        assert!(matches!(core_err, CoreError::Workflow(_)));
    }
}
