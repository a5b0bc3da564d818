//! The interactive shell.
//!
//! Reads one command per line until `exit`, end of input or Ctrl-C.
//! Command failures are printed and the loop carries on; a Ctrl-C that lands
//! while a command runs ends the shell once that command returns.

use anyhow::Result;
use console::Style;

use gitsolver_core::errors::WorkflowError;
use gitsolver_core::VcsGateway;

use crate::commands::{self, merge::MergeOptions, navigation, repo, Context};
use crate::style;

/// One parsed shell input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Cd(String),
    Pwd,
    Ls,
    Setup,
    Merge,
    Status,
    Branches,
    Stash,
    Unstash,
    Cleanup,
    Help,
    Exit,
    Unknown(String),
}

impl ShellCommand {
    /// Command words are case-insensitive; the `cd` argument is kept as typed.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let word = word.to_lowercase();

        if word == "cd" {
            return Self::Cd(rest.to_string());
        }
        if !rest.is_empty() {
            return Self::Unknown(line.to_string());
        }

        match word.as_str() {
            "pwd" => Self::Pwd,
            "ls" => Self::Ls,
            "setup" => Self::Setup,
            "merge" => Self::Merge,
            "status" => Self::Status,
            "branches" => Self::Branches,
            "stash" => Self::Stash,
            "unstash" => Self::Unstash,
            "cleanup" => Self::Cleanup,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

pub fn run(ctx: &Context) -> Result<()> {
    print_banner();
    if !ctx.client.is_repo() {
        println!("{}", style::warn("Current directory is not a git repository"));
        println!("Navigate to a git repository to use git commands");
    }

    loop {
        let line = match ctx.prompter.command_line(&prompt_prefix()) {
            Ok(Some(line)) => line,
            Ok(None) | Err(WorkflowError::Interrupted) => {
                println!();
                goodbye();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let result = dispatch(ctx, ShellCommand::parse(&line));
        if ctx.interrupted() {
            if let Err(e) = result {
                tracing::debug!(error = %format!("{:#}", e), "command ended by interrupt");
            }
            println!();
            goodbye();
            return Ok(());
        }

        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => {
                goodbye();
                return Ok(());
            }
            Err(e) if commands::is_interrupted(&e) => {
                println!();
                goodbye();
                return Ok(());
            }
            Err(e) => println!("{}", style::error(&format!("Error: {:#}", e))),
        }
    }
}

fn dispatch(ctx: &Context, command: ShellCommand) -> Result<Flow> {
    tracing::debug!(?command, "shell command");
    match command {
        ShellCommand::Empty => {}
        ShellCommand::Cd(target) => navigation::cd(&target)?,
        ShellCommand::Pwd => navigation::pwd()?,
        ShellCommand::Ls => navigation::ls()?,
        ShellCommand::Setup => repo::setup(ctx, None)?,
        ShellCommand::Merge => {
            commands::merge::run(ctx, MergeOptions::default())?;
        }
        ShellCommand::Status => repo::status(ctx)?,
        ShellCommand::Branches => repo::branches(ctx)?,
        ShellCommand::Stash => repo::stash(ctx)?,
        ShellCommand::Unstash => repo::unstash(ctx)?,
        ShellCommand::Cleanup => repo::cleanup(ctx)?,
        ShellCommand::Help => print_help(),
        ShellCommand::Exit => return Ok(Flow::Exit),
        ShellCommand::Unknown(input) => {
            println!("{}", style::error(&format!("Unknown command: '{}'", input)));
            println!("Type 'help' to see available commands");
        }
    }
    Ok(Flow::Continue)
}

fn prompt_prefix() -> String {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_string());
    format!("git-solver ({})>", cwd)
}

fn print_banner() {
    let accent = Style::new().cyan().bold();
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("{}", accent.apply_to("GIT CONFLICT SOLVER - Interactive CLI"));
    println!("{}", rule);
    println!("Type 'help' to see available commands");
    println!("Type 'exit' to quit");
    println!("{}", rule);
    println!();
}

const HELP: &[(&str, &str)] = &[
    ("cd <path>", "Change working directory"),
    ("pwd", "Show current working directory"),
    ("ls", "List items in current directory"),
    ("setup", "Configure origin remote URL"),
    ("merge", "Merge two branches with auto conflict resolution"),
    ("status", "Show git repository status"),
    ("branches", "List all branches (local and remote)"),
    ("stash", "Stash uncommitted changes"),
    ("unstash", "Restore stashed changes"),
    ("cleanup", "Remove stale git lock files"),
    ("help", "Show this help message"),
    ("exit", "Exit the program"),
];

fn print_help() {
    println!();
    println!("{}", style::header("Available Commands:"));
    println!("{}", "-".repeat(60));
    for (command, description) in HELP {
        println!("  {:<14} - {}", command, description);
    }
    println!("{}", "-".repeat(60));
}

fn goodbye() {
    println!("Goodbye!");
}
