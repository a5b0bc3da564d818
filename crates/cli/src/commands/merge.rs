//! The `merge` command: drive [`MergeWorkflow`] from the terminal.

use std::time::Duration;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};

use gitsolver_core::errors::WorkflowError;
use gitsolver_core::models::{BranchName, MergeKind, RemoteUrl};
use gitsolver_core::workflow::{
    MergeRequest, StashRestore, WorkflowEvent, WorkflowFailure, WorkflowOutcome, WorkflowReport,
};
use gitsolver_core::{MergeOperator, MergeWorkflow};

use super::Context;
use crate::prompt::Prompter;
use crate::style;

/// Values supplied on the command line instead of prompting.
#[derive(Debug, Default)]
pub struct MergeOptions {
    pub your: Option<String>,
    pub friend: Option<String>,
    pub assume_yes: bool,
    /// Offer to replace an already configured remote URL.
    pub review_origin: bool,
}

/// Run the workflow. Returns whether it succeeded (or was cancelled); a
/// failure has already been reported when this returns `Ok(false)`.
pub fn run(ctx: &Context, options: MergeOptions) -> Result<bool> {
    let workflow = MergeWorkflow::new(&ctx.client, &ctx.config.workflow)
        .context("invalid workflow configuration")?;
    let mut operator = TerminalOperator::new(&ctx.prompter, options, workflow.main_branch().clone());

    let result = workflow.run(&mut operator);
    operator.finish_spinner();

    match result {
        Ok(WorkflowOutcome::Cancelled) => {
            println!("{}", style::warn("Merge cancelled"));
            Ok(true)
        }
        Ok(WorkflowOutcome::Completed(report)) => {
            print_report(&report, workflow.main_branch());
            Ok(true)
        }
        Err(WorkflowFailure {
            error: WorkflowError::Interrupted,
            stash,
            ..
        }) => {
            print_stash(&stash);
            Err(WorkflowError::Interrupted.into())
        }
        Err(failure) => {
            println!("{}", style::error(&format!("Error: {}", failure)));
            tracing::debug!(state = %failure.state, "workflow stopped");
            print_stash(&failure.stash);
            Ok(false)
        }
    }
}

fn print_report(report: &WorkflowReport, main: &BranchName) {
    println!(
        "{}",
        style::success(&format!("Successfully merged branches into {}", main))
    );
    println!("  Your branch   : {}", describe(report.your));
    println!("  Friend branch : {}", describe(report.friend));
    print_stash(&report.stash);
}

fn describe(kind: MergeKind) -> String {
    match kind {
        MergeKind::Clean => "merged cleanly".to_string(),
        MergeKind::Resolved { files } => {
            format!("conflicts auto-resolved in {} file(s)", files)
        }
    }
}

fn print_stash(stash: &StashRestore) {
    match stash {
        StashRestore::NotNeeded => {}
        StashRestore::Restored => println!("{}", style::success("Restored your stashed changes")),
        StashRestore::NotFound => println!(
            "{}",
            style::warn("Stashed changes were not found in the stash list; check 'git stash list'")
        ),
        StashRestore::Failed(warning) => println!("{}", style::warn(&warning.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Terminal operator
// ---------------------------------------------------------------------------

struct TerminalOperator<'p> {
    prompter: &'p Prompter,
    options: MergeOptions,
    main_branch: BranchName,
    spinner: Option<ProgressBar>,
}

impl<'p> TerminalOperator<'p> {
    fn new(prompter: &'p Prompter, options: MergeOptions, main_branch: BranchName) -> Self {
        Self {
            prompter,
            options,
            main_branch,
            spinner: None,
        }
    }

    fn start_spinner(&mut self, message: String) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            spinner.set_style(
                template.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn finish_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn branch(&mut self, preset: Option<String>, prompt: &str) -> Result<BranchName, WorkflowError> {
        let input = match preset {
            Some(name) => name,
            None => self.prompter.text(prompt)?,
        };
        BranchName::parse(&input)
    }
}

impl MergeOperator for TerminalOperator<'_> {
    fn origin_url(&mut self) -> Result<Option<RemoteUrl>, WorkflowError> {
        println!("{}", style::warn("No origin remote configured"));
        if !self.prompter.confirm("Set up origin now?", true)? {
            return Ok(None);
        }
        let url = self.prompter.text("Enter origin URL")?;
        RemoteUrl::parse(&url).map(Some)
    }

    fn review_origin(&mut self, current: &str) -> Result<Option<RemoteUrl>, WorkflowError> {
        if !self.options.review_origin {
            return Ok(None);
        }
        println!("Current origin: {}", current);
        if self.options.assume_yes || self.prompter.confirm("Use this origin?", true)? {
            return Ok(None);
        }
        RemoteUrl::parse(&self.prompter.text("Enter new origin URL")?).map(Some)
    }

    fn merge_request(&mut self) -> Result<MergeRequest, WorkflowError> {
        let friend = self.options.friend.take();
        let friend = self.branch(friend, "Enter FRIEND branch name")?;
        let your = self.options.your.take();
        let your = self.branch(your, "Enter YOUR branch name")?;
        Ok(MergeRequest { your, friend })
    }

    fn confirm(&mut self, request: &MergeRequest) -> Result<bool, WorkflowError> {
        println!(
            "Will merge {} then {} into {}",
            style::branch(request.your.as_str()),
            style::branch(request.friend.as_str()),
            style::branch(self.main_branch.as_str()),
        );
        if self.options.assume_yes {
            return Ok(true);
        }
        self.prompter.confirm("Proceed with merge?", true)
    }

    fn notify(&mut self, event: &WorkflowEvent) {
        self.finish_spinner();
        match event {
            WorkflowEvent::OriginSet { url, replaced } => {
                let verb = if *replaced { "updated" } else { "added" };
                println!("{}", style::success(&format!("Origin {}: {}", verb, url)));
            }
            WorkflowEvent::LockFileRemoved => {
                println!("{}", style::step("Cleaned up stale git lock file"))
            }
            WorkflowEvent::Stashing => println!("{}", style::step("Stashing uncommitted changes")),
            WorkflowEvent::Fetching { remote } => {
                println!("{}", style::step(&format!("Fetching from {}", remote)));
                self.start_spinner(format!("Fetching from {}...", remote));
            }
            WorkflowEvent::BranchFound { side, reference } => println!(
                "{}",
                style::step(&format!("Found {} branch: {}", side, style::branch(&reference.to_string())))
            ),
            WorkflowEvent::Merging { side, target } => println!(
                "{}",
                style::step(&format!("Merging {} branch ({})", side, target))
            ),
            WorkflowEvent::ResolvingConflicts { side, files } => {
                println!(
                    "{}",
                    style::step(&format!(
                        "Resolving conflicts from {} branch in {} file(s)",
                        side,
                        files.len()
                    ))
                );
                for file in files {
                    println!("    {}", style::dim(&file.display().to_string()));
                }
            }
            WorkflowEvent::Publishing { branch } => {
                println!("{}", style::step(&format!("Publishing {}", branch)));
                self.start_spinner(format!("Merging and pushing {}...", branch));
            }
            WorkflowEvent::RestoringStash => {
                println!("{}", style::step("Restoring your stashed changes"))
            }
        }
    }
}
