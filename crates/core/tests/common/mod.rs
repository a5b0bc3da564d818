//! Shared helpers for tests that drive the real `git` binary.
//!
//! Every repository lives in a `TempDir` with a local bare repository as
//! `origin`, so nothing touches the network.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tempfile::TempDir;

use gitsolver_core::GitClient;

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure. Returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Whether `refname` resolves in the repository at `dir`.
pub fn ref_exists(dir: &Path, refname: &str) -> bool {
    Command::new("git")
        .args(["rev-parse", "--verify", "--quiet", refname])
        .current_dir(dir)
        .stdout(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub struct Fixture {
    _tmp: TempDir,
    pub work: PathBuf,
    pub origin: PathBuf,
}

impl Fixture {
    /// A fresh work tree on an unborn `main` with a bare `origin`.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let origin = tmp.path().join("origin.git");
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&origin).unwrap();
        std::fs::create_dir_all(&work).unwrap();

        git(&origin, &["init", "--bare", "--quiet"]);
        git(&work, &["init", "--quiet"]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "commit.gpgsign", "false"]);
        git(&work, &["config", "pull.rebase", "false"]);
        git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);

        Self {
            _tmp: tmp,
            work,
            origin,
        }
    }

    /// A fixture with one commit on `main`, pushed to `origin`.
    pub fn with_initial_commit() -> Self {
        let fixture = Self::new();
        fixture.write("file.txt", "line1\nline2\nline3\n");
        fixture.write("scratch.txt", "scratch\n");
        fixture.commit_all("initial commit");
        fixture.git(&["push", "--quiet", "origin", "main"]);
        fixture
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(&self.work, args)
    }

    pub fn write(&self, file: &str, content: &str) {
        std::fs::write(self.work.join(file), content).unwrap();
    }

    pub fn read(&self, file: &str) -> String {
        std::fs::read_to_string(self.work.join(file)).unwrap()
    }

    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "-A"]);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    pub fn client(&self) -> GitClient {
        GitClient::new("git").with_work_dir(&self.work)
    }
}
