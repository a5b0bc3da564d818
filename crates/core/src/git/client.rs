//! Process-backed git client.
//!
//! Every operation shells out to the configured `git` executable with an
//! argument vector and captures stdout, stderr and the exit code.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument, warn};

use super::gateway::VcsGateway;
use crate::config::SolverConfig;
use crate::errors::GitError;
use crate::models::{BranchName, BranchRef, CommandOutput, MergeAttempt, RemoteUrl};

/// Name of git's index lock file inside the git directory.
const INDEX_LOCK: &str = "index.lock";

/// Git client invoking an injected executable.
#[derive(Debug, Clone)]
pub struct GitClient {
    executable: PathBuf,
    work_dir: Option<PathBuf>,
    remote: String,
    stash_marker: String,
}

impl GitClient {
    /// Create a client for `executable` acting on the process working
    /// directory, with the default remote and stash marker.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        let defaults = SolverConfig::default();
        Self {
            executable: executable.into(),
            work_dir: None,
            remote: defaults.workflow.remote,
            stash_marker: defaults.workflow.stash_marker,
        }
    }

    /// Create a client from configuration (executable, remote, stash marker).
    pub fn from_config(config: &SolverConfig) -> Self {
        let client = Self {
            executable: config.git_executable(),
            work_dir: None,
            remote: config.workflow.remote.clone(),
            stash_marker: config.workflow.stash_marker.clone(),
        };
        info!(executable = %client.executable.display(), "created GitClient");
        client
    }

    /// Pin the client to `dir` instead of following the process working
    /// directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_stash_marker(mut self, marker: impl Into<String>) -> Self {
        self.stash_marker = marker.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn stash_marker(&self) -> &str {
        &self.stash_marker
    }

    /// Run git and capture the result without judging the exit code.
    fn exec(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let mut cmd = Command::new(&self.executable);
        if let Some(ref dir) = self.work_dir {
            cmd.current_dir(dir);
        }
        cmd.args(args)
            .env("GIT_MERGE_AUTOEDIT", "no")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(cmd = %format_command(args), "running git command");
        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::BinaryNotFound(self.executable.display().to_string())
            } else {
                GitError::IoError(e)
            }
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Whether `refname` resolves to an object.
    fn ref_exists(&self, refname: &str) -> Result<bool, GitError> {
        let output = self.exec(&["rev-parse", "--verify", "--quiet", refname])?;
        Ok(output.success())
    }

    /// Path of the git metadata directory, `None` outside a repository.
    pub fn git_dir(&self) -> Option<PathBuf> {
        let output = self.exec(&["rev-parse", "--git-dir"]).ok()?;
        if !output.success() {
            return None;
        }
        let dir = PathBuf::from(output.stdout.trim());
        match self.work_dir {
            Some(ref base) if dir.is_relative() => Some(base.join(dir)),
            _ => Some(dir),
        }
    }

    /// Human-readable `git status`.
    pub fn status(&self) -> Result<String, GitError> {
        Ok(self.run(&["status"])?.stdout)
    }

    /// Short names of all local branches.
    pub fn local_branches(&self) -> Result<Vec<String>, GitError> {
        let output = self.run(&["branch", "--format=%(refname:short)"])?;
        Ok(non_empty_lines(&output.stdout))
    }

    /// Short names of all remote-tracking branches.
    pub fn remote_branches(&self) -> Result<Vec<String>, GitError> {
        let output = self.run(&["branch", "-r", "--format=%(refname:short)"])?;
        Ok(non_empty_lines(&output.stdout))
    }
}

impl VcsGateway for GitClient {
    fn remote_name(&self) -> &str {
        &self.remote
    }

    fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.exec(args)?;
        if !output.success() {
            let message = output.detail();
            warn!(cmd = %format_command(args), exit_code = output.exit_code, %message, "git command failed");
            return Err(GitError::CommandFailed {
                command: format_command(args),
                exit_code: output.exit_code,
                message,
            });
        }
        Ok(output)
    }

    #[instrument(skip_all, fields(target = %target))]
    fn run_merge(&self, target: &BranchRef) -> Result<MergeAttempt, GitError> {
        let revision = target.revision();
        // Two-way markers only; a diff3 base section would survive resolution.
        let output = self.exec(&[
            "-c",
            "merge.conflictStyle=merge",
            "merge",
            &revision,
            "--no-edit",
        ])?;
        if output.success() {
            info!("merge completed cleanly");
            return Ok(MergeAttempt::clean());
        }

        let conflicts = self.conflicted_files()?;
        if conflicts.is_empty() {
            let message = output.detail();
            warn!(exit_code = output.exit_code, %message, "merge failed without conflicts");
            return Ok(MergeAttempt {
                conflicts,
                error: Some(GitError::MergeFailed {
                    target: revision,
                    exit_code: output.exit_code,
                    message,
                }),
            });
        }

        info!(count = conflicts.len(), "merge stopped with conflicts");
        Ok(MergeAttempt {
            conflicts,
            error: None,
        })
    }

    fn conflicted_files(&self) -> Result<Vec<PathBuf>, GitError> {
        let output = self.run(&["diff", "--name-only", "--diff-filter=U", "-z"])?;
        let files: Vec<PathBuf> = output
            .stdout
            .split('\0')
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect();
        debug!(count = files.len(), "listed conflicted files");
        Ok(files)
    }

    fn is_repo(&self) -> bool {
        match self.exec(&["rev-parse", "--is-inside-work-tree"]) {
            Ok(output) => output.success() && output.stdout.trim() == "true",
            Err(e) => {
                debug!(error = %e, "repository detection failed");
                false
            }
        }
    }

    fn toplevel(&self) -> Result<PathBuf, GitError> {
        let output = self.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(output.stdout.trim()))
    }

    fn has_uncommitted_changes(&self) -> Result<bool, GitError> {
        let output = self.run(&["status", "--porcelain"])?;
        Ok(!output.stdout.trim().is_empty())
    }

    #[instrument(skip_all, fields(name = %name))]
    fn branch_exists(&self, name: &BranchName) -> Result<Option<BranchRef>, GitError> {
        if self.ref_exists(&format!("refs/heads/{}", name))? {
            debug!("found local branch");
            return Ok(Some(BranchRef::Local(name.clone())));
        }
        if self.ref_exists(&format!("refs/remotes/{}/{}", self.remote, name))? {
            debug!(remote = %self.remote, "found remote branch");
            return Ok(Some(BranchRef::Remote {
                remote: self.remote.clone(),
                name: name.clone(),
            }));
        }
        debug!("branch not found");
        Ok(None)
    }

    fn cleanup_lock_files(&self) -> bool {
        let Some(git_dir) = self.git_dir() else {
            return false;
        };
        let lock = git_dir.join(INDEX_LOCK);
        if !lock.exists() {
            return false;
        }
        match std::fs::remove_file(&lock) {
            Ok(()) => {
                info!(path = %lock.display(), "removed stale lock file");
                true
            }
            Err(e) => {
                warn!(path = %lock.display(), error = %e, "could not remove lock file");
                false
            }
        }
    }

    fn stash(&self) -> Result<(), GitError> {
        self.run(&["stash", "push", "-m", &self.stash_marker])?;
        info!(marker = %self.stash_marker, "stashed uncommitted changes");
        Ok(())
    }

    fn unstash(&self) -> Result<bool, GitError> {
        let list = self.run(&["stash", "list"])?;
        if !list.stdout.contains(&self.stash_marker) {
            debug!(marker = %self.stash_marker, "no auto-stash entry to restore");
            return Ok(false);
        }
        self.run(&["stash", "pop"])?;
        info!("restored stashed changes");
        Ok(true)
    }

    fn origin_url(&self) -> Result<Option<String>, GitError> {
        let output = self.exec(&["remote", "get-url", &self.remote])?;
        if !output.success() {
            return Ok(None);
        }
        let url = output.stdout.trim();
        Ok((!url.is_empty()).then(|| url.to_string()))
    }

    #[instrument(skip_all, fields(url = %url))]
    fn set_origin_url(&self, url: &RemoteUrl) -> Result<(), GitError> {
        if self.origin_url()?.is_some() {
            self.run(&["remote", "set-url", &self.remote, url.as_str()])?;
            info!(remote = %self.remote, "updated remote URL");
        } else {
            self.run(&["remote", "add", &self.remote, url.as_str()])?;
            info!(remote = %self.remote, "added remote");
        }
        Ok(())
    }
}

fn format_command(args: &[&str]) -> String {
    format!("git {}", args.join(" "))
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
