//! git-solver command-line tool.
//!
//! Merges two branches into main through a disposable integration branch,
//! resolving textual conflicts automatically. Runs as an interactive shell by
//! default; every shell command is also available as a one-shot subcommand.

mod commands;
mod prompt;
mod shell;
mod signals;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitsolver_core::SolverConfig;

use commands::merge::MergeOptions;
use commands::{config, repo, Context};
use prompt::Prompter;
use signals::InterruptFlag;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "GIT_SOLVER_LOG";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// git-solver command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "git-solver",
    version,
    about = "Merge two branches into main with automatic conflict resolution"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Git executable to use instead of searching for one.
    #[arg(long, global = true, value_name = "PATH")]
    git: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive shell (the default).
    Shell,

    /// Merge two branches into main with auto conflict resolution.
    Merge {
        /// Your branch, merged first.
        #[arg(long)]
        your: Option<String>,

        /// Your friend's branch, merged second.
        #[arg(long)]
        friend: Option<String>,

        /// Skip the confirmation prompts.
        #[arg(short, long)]
        yes: bool,
    },

    /// Add or change the origin remote URL.
    Setup {
        /// New URL; prompts when omitted.
        url: Option<String>,
    },

    /// Show git repository status.
    Status,

    /// List local and remote branches.
    Branches,

    /// Stash uncommitted changes.
    Stash,

    /// Restore changes stashed by git-solver.
    Unstash,

    /// Remove a stale git index lock file.
    Cleanup,

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = "./git-solver.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let session = Session::start(cli.config, cli.git, cli.verbose)?;

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Init { output } => {
            session.init_logging(None);
            config::init(&output, &session.prompter)?;
        }
        Commands::Validate => {
            session.init_logging(None);
            config::validate(session.config_path.as_deref())?;
        }
        Commands::Shell => shell::run(&session.context()?)?,
        Commands::Merge { your, friend, yes } => {
            let options = MergeOptions {
                your,
                friend,
                assume_yes: yes,
                review_origin: true,
            };
            if !commands::merge::run(&session.context()?, options)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Setup { url } => repo::setup(&session.context()?, url.as_deref())?,
        Commands::Status => repo::status(&session.context()?)?,
        Commands::Branches => repo::branches(&session.context()?)?,
        Commands::Stash => repo::stash(&session.context()?)?,
        Commands::Unstash => repo::unstash(&session.context()?)?,
        Commands::Cleanup => repo::cleanup(&session.context()?)?,
    }

    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// Config & logging helpers
// ---------------------------------------------------------------------------

/// Process-wide input and interrupt handling, plus the global flags needed
/// to load configuration once a command asks for it.
struct Session {
    config_path: Option<PathBuf>,
    git: Option<PathBuf>,
    verbose: u8,
    prompter: Prompter,
    interrupts: InterruptFlag,
}

impl Session {
    fn start(config_path: Option<PathBuf>, git: Option<PathBuf>, verbose: u8) -> Result<Self> {
        let prompter = Prompter::detect();
        let interrupts = signals::setup_signal_handlers(prompter.interrupt_notifier())?;
        Ok(Self {
            config_path,
            git,
            verbose,
            prompter,
            interrupts,
        })
    }

    fn init_logging(&self, config_level: Option<&str>) {
        init_logging(self.verbose, config_level);
    }

    /// Load configuration, start logging and build the command context.
    fn context(self) -> Result<Context> {
        let config = load_config(self.config_path.as_deref(), self.git)?;
        init_logging(self.verbose, Some(&config.logging.level));
        tracing::debug!(executable = %config.git_executable().display(), "configuration loaded");
        Ok(Context::new(config, self.prompter, self.interrupts))
    }
}

fn load_config(path: Option<&Path>, git: Option<PathBuf>) -> Result<SolverConfig> {
    let mut config = SolverConfig::load(path).context("failed to load configuration file")?;
    config.apply_env_overrides();
    if let Some(git) = git {
        config.git.executable = Some(git);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Filter precedence: `GIT_SOLVER_LOG`, then `-v`, then the configured level.
fn log_filter(verbose: u8, config_level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return filter;
    }
    let level = match verbose {
        0 => config_level.unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(level)
}

fn init_logging(verbose: u8, config_level: Option<&str>) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, config_level))
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
