//! The merge workflow.
//!
//! [`MergeWorkflow`] drives the fixed integration sequence: make sure the
//! remote is configured, validate both branches, rebuild the integration
//! branch from main, merge "your" branch then "friend" branch into it
//! (resolving conflicts by union), fold the result back into main and push.
//! Uncommitted work is stashed up front and restored exactly once at the end,
//! whether the run succeeded or not.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::WorkflowConfig;
use crate::conflict::ConflictResolver;
use crate::errors::{StashRestoreWarning, WorkflowError};
use crate::git::VcsGateway;
use crate::models::{BranchName, BranchRef, MergeKind, MergeSide, RemoteUrl, WorkflowState};

// ---------------------------------------------------------------------------
// Operator seam
// ---------------------------------------------------------------------------

/// The two branches to integrate, in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub your: BranchName,
    pub friend: BranchName,
}

/// Progress notifications emitted while the workflow runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The remote URL was written; `replaced` is false when it was added.
    OriginSet { url: RemoteUrl, replaced: bool },
    LockFileRemoved,
    Stashing,
    Fetching { remote: String },
    BranchFound { side: MergeSide, reference: BranchRef },
    Merging { side: MergeSide, target: BranchRef },
    ResolvingConflicts { side: MergeSide, files: Vec<PathBuf> },
    Publishing { branch: BranchName },
    RestoringStash,
}

/// The person (or script) driving a run.
pub trait MergeOperator {
    /// Ask for a remote URL when none is configured. `None` cancels the run.
    fn origin_url(&mut self) -> Result<Option<RemoteUrl>, WorkflowError>;

    /// Offer to replace the configured remote URL. `None` keeps `current`.
    fn review_origin(&mut self, current: &str) -> Result<Option<RemoteUrl>, WorkflowError> {
        let _ = current;
        Ok(None)
    }

    fn merge_request(&mut self) -> Result<MergeRequest, WorkflowError>;

    /// Last chance to back out before anything in the repository changes.
    fn confirm(&mut self, request: &MergeRequest) -> Result<bool, WorkflowError>;

    fn notify(&mut self, event: &WorkflowEvent) {
        let _ = event;
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to the auto-stash at the end of a run.
#[derive(Debug)]
pub enum StashRestore {
    /// Nothing was stashed.
    NotNeeded,
    Restored,
    /// A stash was made but no entry bearing the marker was left to pop.
    NotFound,
    Failed(StashRestoreWarning),
}

impl StashRestore {
    pub fn warning(&self) -> Option<&StashRestoreWarning> {
        match self {
            Self::Failed(warning) => Some(warning),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct WorkflowReport {
    pub your: MergeKind,
    pub friend: MergeKind,
    pub stash: StashRestore,
}

#[derive(Debug)]
pub enum WorkflowOutcome {
    /// The operator declined before any repository change.
    Cancelled,
    Completed(WorkflowReport),
}

/// A run that stopped early. Commits and branches made before the failure
/// are left in place.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct WorkflowFailure {
    pub error: WorkflowError,
    /// Last state reached before the failure.
    pub state: WorkflowState,
    pub stash: StashRestore,
}

impl WorkflowFailure {
    fn before_changes(error: WorkflowError, state: WorkflowState) -> Self {
        Self {
            error,
            state,
            stash: StashRestore::NotNeeded,
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Per-run bookkeeping needed to report a failure.
struct Progress {
    state: WorkflowState,
    stashed: bool,
}

impl Progress {
    fn advance(&mut self, state: WorkflowState) {
        info!(from = %self.state, to = %state, "workflow state transition");
        self.state = state;
    }
}

pub struct MergeWorkflow<'a, G: VcsGateway + ?Sized> {
    gateway: &'a G,
    main_branch: BranchName,
    integration_branch: BranchName,
}

impl<'a, G: VcsGateway + ?Sized> MergeWorkflow<'a, G> {
    pub fn new(gateway: &'a G, settings: &WorkflowConfig) -> Result<Self, WorkflowError> {
        Ok(Self {
            gateway,
            main_branch: BranchName::parse(&settings.main_branch)?,
            integration_branch: BranchName::parse(&settings.integration_branch)?,
        })
    }

    pub fn main_branch(&self) -> &BranchName {
        &self.main_branch
    }

    pub fn integration_branch(&self) -> &BranchName {
        &self.integration_branch
    }

    /// Run the whole workflow, prompting `operator` for the remote, the two
    /// branches and a confirmation.
    #[instrument(skip_all)]
    pub fn run(&self, operator: &mut dyn MergeOperator) -> Result<WorkflowOutcome, WorkflowFailure> {
        if !self.gateway.is_repo() {
            return Err(WorkflowFailure::before_changes(
                WorkflowError::NotARepository,
                WorkflowState::Idle,
            ));
        }

        match self.ensure_origin(operator) {
            Ok(true) => {}
            Ok(false) => {
                info!("no remote URL given, cancelling");
                return Ok(WorkflowOutcome::Cancelled);
            }
            Err(e) => return Err(WorkflowFailure::before_changes(e, WorkflowState::Idle)),
        }
        info!(to = %WorkflowState::OriginConfigured, "workflow state transition");

        let fail = |e| WorkflowFailure::before_changes(e, WorkflowState::OriginConfigured);
        let request = operator.merge_request().map_err(fail)?;
        if !operator.confirm(&request).map_err(fail)? {
            info!("merge not confirmed, cancelling");
            return Ok(WorkflowOutcome::Cancelled);
        }

        self.execute(&request, operator).map(WorkflowOutcome::Completed)
    }

    /// Run the repository-changing part of the workflow for `request`,
    /// assuming the remote is already configured.
    #[instrument(skip_all, fields(your = %request.your, friend = %request.friend))]
    pub fn execute(
        &self,
        request: &MergeRequest,
        operator: &mut dyn MergeOperator,
    ) -> Result<WorkflowReport, WorkflowFailure> {
        let mut progress = Progress {
            state: WorkflowState::OriginConfigured,
            stashed: false,
        };

        let result = self.integrate(request, operator, &mut progress);

        let stash = if progress.stashed {
            self.restore_stash(operator)
        } else {
            StashRestore::NotNeeded
        };

        match result {
            Ok((your, friend)) => {
                progress.advance(WorkflowState::Done);
                Ok(WorkflowReport {
                    your,
                    friend,
                    stash,
                })
            }
            Err(error) => {
                warn!(state = %progress.state, error = %error, "merge workflow failed");
                Err(WorkflowFailure {
                    error,
                    state: progress.state,
                    stash,
                })
            }
        }
    }

    /// Returns `false` when the operator declined to provide a URL.
    fn ensure_origin(&self, operator: &mut dyn MergeOperator) -> Result<bool, WorkflowError> {
        match self.gateway.origin_url()? {
            None => {
                let Some(url) = operator.origin_url()? else {
                    return Ok(false);
                };
                self.gateway.set_origin_url(&url)?;
                operator.notify(&WorkflowEvent::OriginSet {
                    url,
                    replaced: false,
                });
            }
            Some(current) => {
                debug!(url = %current, "remote already configured");
                if let Some(url) = operator.review_origin(&current)? {
                    self.gateway.set_origin_url(&url)?;
                    operator.notify(&WorkflowEvent::OriginSet {
                        url,
                        replaced: true,
                    });
                }
            }
        }
        Ok(true)
    }

    fn integrate(
        &self,
        request: &MergeRequest,
        operator: &mut dyn MergeOperator,
        progress: &mut Progress,
    ) -> Result<(MergeKind, MergeKind), WorkflowError> {
        let git = self.gateway;
        let remote = git.remote_name().to_string();
        let main = self.main_branch.as_str();
        let integration = self.integration_branch.as_str();

        if git.cleanup_lock_files() {
            operator.notify(&WorkflowEvent::LockFileRemoved);
        }

        if git.has_uncommitted_changes()? {
            operator.notify(&WorkflowEvent::Stashing);
            git.stash()?;
            progress.stashed = true;
        }

        operator.notify(&WorkflowEvent::Fetching {
            remote: remote.clone(),
        });
        git.run(&["fetch", &remote])?;

        let your = self.find_branch(&request.your, MergeSide::Yours, operator)?;
        let friend = self.find_branch(&request.friend, MergeSide::Friend, operator)?;
        progress.advance(WorkflowState::BranchesValidated);

        git.run(&["checkout", main])?;
        git.run(&["pull", &remote, main])?;

        if let Err(e) = git.run(&["branch", "-D", integration]) {
            debug!(branch = integration, error = %e, "no previous integration branch to delete");
        }
        git.run(&["checkout", "-b", integration])?;
        progress.advance(WorkflowState::IntegrationBranchCreated);

        let your_kind = self.merge_side(MergeSide::Yours, &your, operator)?;
        progress.advance(WorkflowState::YourBranchMerged(your_kind));

        let friend_kind = self.merge_side(MergeSide::Friend, &friend, operator)?;
        progress.advance(WorkflowState::FriendBranchMerged(friend_kind));

        operator.notify(&WorkflowEvent::Publishing {
            branch: self.main_branch.clone(),
        });
        git.run(&["checkout", main])?;
        git.run(&["merge", integration, "--no-edit"])?;
        git.run(&["push", &remote, main])?;
        progress.advance(WorkflowState::Pushed);

        Ok((your_kind, friend_kind))
    }

    fn find_branch(
        &self,
        name: &BranchName,
        side: MergeSide,
        operator: &mut dyn MergeOperator,
    ) -> Result<BranchRef, WorkflowError> {
        let reference = self
            .gateway
            .branch_exists(name)?
            .ok_or_else(|| WorkflowError::BranchNotFound {
                name: name.to_string(),
                remote: self.gateway.remote_name().to_string(),
            })?;
        operator.notify(&WorkflowEvent::BranchFound {
            side,
            reference: reference.clone(),
        });
        Ok(reference)
    }

    /// Merge `target` into the current branch, resolving and committing any
    /// conflicts it leaves.
    fn merge_side(
        &self,
        side: MergeSide,
        target: &BranchRef,
        operator: &mut dyn MergeOperator,
    ) -> Result<MergeKind, WorkflowError> {
        operator.notify(&WorkflowEvent::Merging {
            side,
            target: target.clone(),
        });

        let attempt = self.gateway.run_merge(target)?;
        let files = attempt.conflicts.clone();
        if !attempt.into_result()? {
            return Ok(MergeKind::Clean);
        }

        operator.notify(&WorkflowEvent::ResolvingConflicts {
            side,
            files: files.clone(),
        });
        let root = self.gateway.toplevel()?;
        ConflictResolver::new(root).resolve(&files)?;

        self.gateway.run(&["add", "-A"])?;
        self.gateway.run(&["commit", "--no-edit"])?;
        info!(side = %side, files = files.len(), "committed resolved merge");

        Ok(MergeKind::Resolved { files: files.len() })
    }

    fn restore_stash(&self, operator: &mut dyn MergeOperator) -> StashRestore {
        operator.notify(&WorkflowEvent::RestoringStash);
        match self.gateway.unstash() {
            Ok(true) => StashRestore::Restored,
            Ok(false) => {
                warn!("auto-stash entry missing, nothing restored");
                StashRestore::NotFound
            }
            Err(e) => {
                warn!(error = %e, "failed to restore stashed changes");
                StashRestore::Failed(StashRestoreWarning {
                    detail: e.to_string(),
                })
            }
        }
    }
}
