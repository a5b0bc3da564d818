//! Command implementations shared by the one-shot subcommands and the
//! interactive shell.

pub mod config;
pub mod merge;
pub mod navigation;
pub mod repo;

use anyhow::Result;

use gitsolver_core::errors::WorkflowError;
use gitsolver_core::{GitClient, SolverConfig, VcsGateway};

use crate::prompt::Prompter;
use crate::signals::{self, InterruptFlag};

/// Everything a command needs: resolved configuration, the git client and
/// the operator's input channel.
pub struct Context {
    pub config: SolverConfig,
    pub client: GitClient,
    pub prompter: Prompter,
    interrupts: InterruptFlag,
}

impl Context {
    pub fn new(config: SolverConfig, prompter: Prompter, interrupts: InterruptFlag) -> Self {
        let client = GitClient::from_config(&config);
        Self {
            config,
            client,
            prompter,
            interrupts,
        }
    }

    /// Whether the operator pressed Ctrl-C at any point so far.
    pub fn interrupted(&self) -> bool {
        signals::is_interrupt_requested(&self.interrupts)
    }

    /// Fail unless the working directory is inside a git work tree.
    pub fn require_repo(&self) -> Result<()> {
        if !self.client.is_repo() {
            return Err(WorkflowError::NotARepository.into());
        }
        Ok(())
    }
}

/// Whether `err` is the operator interrupting a prompt.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<WorkflowError>(),
        Some(WorkflowError::Interrupted)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_interrupted() {
        assert!(is_interrupted(&WorkflowError::Interrupted.into()));
        assert!(!is_interrupted(&WorkflowError::NotARepository.into()));
        assert!(!is_interrupted(&anyhow::anyhow!("interrupted")));
    }
}
