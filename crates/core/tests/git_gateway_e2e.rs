//! Tests for `GitClient` against real repositories.
//!
//! Tests skip gracefully if `git` is not installed.

mod common;

use std::path::PathBuf;

use common::{git_available, Fixture};
use gitsolver_core::errors::GitError;
use gitsolver_core::models::{BranchName, BranchRef, RemoteUrl};
use gitsolver_core::VcsGateway;

macro_rules! require_git {
    () => {
        if !git_available() {
            eprintln!("git not available, skipping");
            return;
        }
    };
}

fn branch(name: &str) -> BranchName {
    BranchName::parse(name).unwrap()
}

#[test]
fn test_repo_detection() {
    require_git!();
    let fixture = Fixture::new();
    let client = fixture.client();
    assert!(client.is_repo());
    assert_eq!(
        client.toplevel().unwrap().canonicalize().unwrap(),
        fixture.work.canonicalize().unwrap()
    );
}

#[test]
fn test_uncommitted_changes() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();
    assert!(!client.has_uncommitted_changes().unwrap());

    fixture.write("untracked.txt", "new\n");
    assert!(client.has_uncommitted_changes().unwrap());
}

#[test]
fn test_branch_lookup_prefers_local() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    fixture.git(&["branch", "shared"]);
    fixture.git(&["push", "--quiet", "origin", "shared"]);
    fixture.git(&["branch", "remote-only"]);
    fixture.git(&["push", "--quiet", "origin", "remote-only"]);
    fixture.git(&["branch", "-D", "remote-only"]);
    fixture.git(&["fetch", "--quiet", "origin"]);

    let client = fixture.client();
    assert_eq!(
        client.branch_exists(&branch("shared")).unwrap(),
        Some(BranchRef::Local(branch("shared")))
    );
    assert_eq!(
        client.branch_exists(&branch("remote-only")).unwrap(),
        Some(BranchRef::Remote {
            remote: "origin".into(),
            name: branch("remote-only"),
        })
    );
    assert_eq!(client.branch_exists(&branch("nope")).unwrap(), None);
}

#[test]
fn test_branch_listing() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    fixture.git(&["branch", "feature-a"]);
    fixture.git(&["fetch", "--quiet", "origin"]);

    let client = fixture.client();
    let local = client.local_branches().unwrap();
    assert!(local.contains(&"main".to_string()));
    assert!(local.contains(&"feature-a".to_string()));
    assert!(client
        .remote_branches()
        .unwrap()
        .contains(&"origin/main".to_string()));
}

#[test]
fn test_lock_file_cleanup() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();
    let lock = fixture.work.join(".git").join("index.lock");
    std::fs::write(&lock, "").unwrap();

    assert!(client.cleanup_lock_files());
    assert!(!lock.exists());
    assert!(!client.cleanup_lock_files());
}

#[test]
fn test_stash_round_trip() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();
    fixture.write("scratch.txt", "work in progress\n");

    client.stash().unwrap();
    assert!(!client.has_uncommitted_changes().unwrap());
    assert_eq!(fixture.read("scratch.txt"), "scratch\n");
    assert!(fixture.git(&["stash", "list"]).contains(client.stash_marker()));

    assert!(client.unstash().unwrap());
    assert_eq!(fixture.read("scratch.txt"), "work in progress\n");
    assert!(fixture.git(&["stash", "list"]).is_empty());
}

#[test]
fn test_unstash_ignores_foreign_stash() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();
    fixture.write("scratch.txt", "someone else's change\n");
    fixture.git(&["stash", "push", "--quiet", "-m", "manual stash"]);

    assert!(!client.unstash().unwrap());
    assert_eq!(fixture.git(&["stash", "list"]).lines().count(), 1);
    assert_eq!(fixture.read("scratch.txt"), "scratch\n");
}

#[test]
fn test_origin_url_get_and_set() {
    require_git!();
    let fixture = Fixture::new();
    fixture.git(&["remote", "remove", "origin"]);
    let client = fixture.client();
    assert_eq!(client.origin_url().unwrap(), None);

    let first = RemoteUrl::parse("https://example.com/first.git").unwrap();
    client.set_origin_url(&first).unwrap();
    assert_eq!(client.origin_url().unwrap().as_deref(), Some(first.as_str()));

    let second = RemoteUrl::parse("/srv/git/second.git").unwrap();
    client.set_origin_url(&second).unwrap();
    assert_eq!(client.origin_url().unwrap().as_deref(), Some(second.as_str()));
}

#[test]
fn test_failed_command_carries_stderr() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();

    match client.run(&["checkout", "no-such-branch"]) {
        Err(GitError::CommandFailed {
            command,
            exit_code,
            message,
        }) => {
            assert_eq!(command, "git checkout no-such-branch");
            assert_ne!(exit_code, 0);
            assert!(message.contains("no-such-branch"), "message: {}", message);
        }
        other => panic!("expected CommandFailed, got {:?}", other),
    }
}

#[test]
fn test_merge_reports_conflicts() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    fixture.git(&["checkout", "--quiet", "-b", "other"]);
    fixture.write("file.txt", "line1\ntheirs\nline3\n");
    fixture.commit_all("theirs");
    fixture.git(&["checkout", "--quiet", "main"]);
    fixture.write("file.txt", "line1\nours\nline3\n");
    fixture.commit_all("ours");

    let client = fixture.client();
    let attempt = client.run_merge(&BranchRef::Local(branch("other"))).unwrap();
    assert!(attempt.error.is_none());
    assert_eq!(attempt.conflicts, vec![PathBuf::from("file.txt")]);
    assert!(client.has_conflicts().unwrap());

    let text = fixture.read("file.txt");
    assert!(text.contains("<<<<<<< HEAD"));
    assert!(!text.contains("|||||||"));
}

#[test]
fn test_merge_of_unknown_ref_is_an_error() {
    require_git!();
    let fixture = Fixture::with_initial_commit();
    let client = fixture.client();

    let attempt = client.run_merge(&BranchRef::Local(branch("ghost"))).unwrap();
    assert!(attempt.conflicts.is_empty());
    assert!(matches!(
        attempt.into_result(),
        Err(GitError::MergeFailed { ref target, .. }) if target == "ghost"
    ));
}
