//! TOML-based configuration for git-solver.
//!
//! The file is optional: every field has a default, so a missing file behaves
//! exactly like an empty one. Environment overrides are applied afterwards via
//! [`SolverConfig::apply_env_overrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;
use crate::models::BranchName;

/// Environment variable overriding `git.executable`.
pub const GIT_EXECUTABLE_ENV: &str = "GIT_SOLVER_GIT";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Locating the git executable.
    #[serde(default)]
    pub git: GitConfig,

    /// Names used by the merge workflow.
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

/// Where to find the `git` binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Explicit executable path; skips the search when set.
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Well-known install locations, checked in order before falling back to
    /// plain `git` on the search path.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

#[cfg(windows)]
fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files\Git\cmd\git.exe"),
        PathBuf::from(r"C:\Program Files (x86)\Git\cmd\git.exe"),
        PathBuf::from(r"C:\Git\cmd\git.exe"),
    ]
}

#[cfg(not(windows))]
fn default_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/git"),
        PathBuf::from("/usr/local/bin/git"),
        PathBuf::from("/opt/homebrew/bin/git"),
    ]
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            executable: None,
            search_paths: default_search_paths(),
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// Branch, remote and stash names used by the merge workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Mainline branch that receives the integration result. Default `main`.
    #[serde(default = "default_main_branch")]
    pub main_branch: String,

    /// Remote fetched from and pushed to. Default `origin`.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Disposable branch recreated on every run.
    #[serde(default = "default_integration_branch")]
    pub integration_branch: String,

    /// Label embedded in the auto-stash message.
    #[serde(default = "default_stash_marker")]
    pub stash_marker: String,
}

fn default_main_branch() -> String {
    "main".into()
}
fn default_remote() -> String {
    "origin".into()
}
fn default_integration_branch() -> String {
    "auto-integration-branch".into()
}
fn default_stash_marker() -> String {
    "git-conflict-solver-auto-stash".into()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            main_branch: default_main_branch(),
            remote: default_remote(),
            integration_branch: default_integration_branch(),
            stash_marker: default_stash_marker(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & resolving
// ---------------------------------------------------------------------------

impl SolverConfig {
    /// Load a [`SolverConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: SolverConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Load from an explicit path, or from [`default_path`](Self::default_path)
    /// if that file exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from_file(path),
                _ => {
                    debug!("no configuration file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Platform config location, e.g. `~/.config/git-solver/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("git-solver").join("config.toml"))
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(GIT_EXECUTABLE_ENV) {
            if !value.trim().is_empty() {
                debug!(env = GIT_EXECUTABLE_ENV, "git executable overridden from environment");
                self.git.executable = Some(PathBuf::from(value.trim()));
            }
        }
    }

    /// Validate that all names are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wf = &self.workflow;

        for (field, value) in [
            ("workflow.main_branch", &wf.main_branch),
            ("workflow.integration_branch", &wf.integration_branch),
        ] {
            BranchName::parse(value).map_err(|e| ConfigError::InvalidValue {
                field: field.into(),
                detail: e.to_string(),
            })?;
        }
        if wf.main_branch.trim() == wf.integration_branch.trim() {
            return Err(ConfigError::InvalidValue {
                field: "workflow.integration_branch".into(),
                detail: "integration branch must differ from the main branch".into(),
            });
        }
        if wf.remote.trim().is_empty() || wf.remote.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "workflow.remote".into(),
                detail: "remote name must be non-empty without whitespace".into(),
            });
        }
        if wf.stash_marker.is_empty() || wf.stash_marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "workflow.stash_marker".into(),
                detail: "stash marker must be non-empty without whitespace".into(),
            });
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".into(),
                detail: format!("must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Convenience: load, apply overrides, and validate in one call.
    pub fn load_and_resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// The git executable to invoke: explicit override, else the first
    /// existing search path, else `git` from the ambient search path.
    pub fn git_executable(&self) -> PathBuf {
        if let Some(ref exe) = self.git.executable {
            return exe.clone();
        }
        self.git
            .search_paths
            .iter()
            .find(|candidate| candidate.is_file())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("git"))
    }

    /// Sample configuration written by `git-solver init`.
    pub fn default_toml() -> &'static str {
        r#"# git-solver configuration
# Every value below is optional; these are the defaults.

[git]
# executable = "/usr/bin/git"
# search_paths = ["/usr/bin/git", "/usr/local/bin/git"]

[workflow]
main_branch = "main"
remote = "origin"
integration_branch = "auto-integration-branch"
stash_marker = "git-conflict-solver-auto-stash"

[logging]
level = "warn"
"#
    }
}
