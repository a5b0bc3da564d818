//! `init` and `validate`: generate and check the configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use gitsolver_core::SolverConfig;

use crate::prompt::Prompter;
use crate::style;

pub fn init(output: &Path, prompter: &Prompter) -> Result<()> {
    if output.exists() {
        let overwrite = prompter
            .confirm(&format!("{} already exists. Overwrite?", output.display()), false)
            .context("failed to read confirmation")?;
        if !overwrite {
            println!("{}", style::warn("Init cancelled. Existing file was not modified."));
            return Ok(());
        }
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(output, SolverConfig::default_toml()).context("failed to write config file")?;

    println!("{}", style::success(&format!("Default configuration written to {}", output.display())));
    println!();
    println!("Next steps:");
    println!("  1. Edit the branch and remote names to match your repository");
    println!("  2. Validate with: git-solver validate --config {}", output.display());
    if let Some(default) = SolverConfig::default_path() {
        println!("  3. Copy it to {} to use it by default", default.display());
    }
    Ok(())
}

pub fn validate(path: Option<&Path>) -> Result<()> {
    let source: Option<PathBuf> = match path {
        Some(path) => Some(path.to_path_buf()),
        None => SolverConfig::default_path().filter(|p| p.exists()),
    };
    match source {
        Some(ref path) => println!("Validating configuration: {}", path.display()),
        None => println!("No configuration file found; validating built-in defaults"),
    }
    println!();

    let mut config = SolverConfig::load(source.as_deref()).context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    config.apply_env_overrides();
    println!("  [OK] Environment overrides applied");

    match config.validate() {
        Ok(()) => println!("  [OK] All values are valid"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    let wf = &config.workflow;
    println!();
    println!("Configuration summary:");
    println!("  Git executable    : {}", config.git_executable().display());
    println!("  Main branch       : {}", wf.main_branch);
    println!("  Remote            : {}", wf.remote);
    println!("  Integration branch: {}", wf.integration_branch);
    println!("  Stash marker      : {}", wf.stash_marker);
    println!("  Log level         : {}", config.logging.level);
    println!();
    println!("{}", style::success("Configuration is valid."));
    Ok(())
}
