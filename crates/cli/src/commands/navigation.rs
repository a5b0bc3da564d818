//! Directory navigation for the shell: `cd`, `pwd`, `ls`.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::style;

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(target: &str) -> PathBuf {
    if target == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = target.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(target)
}

/// Resolve `target` against `cwd` to an existing directory.
pub fn resolve_dir(cwd: &Path, target: &str) -> Option<PathBuf> {
    let path = expand_tilde(target);
    let path = if path.is_absolute() { path } else { cwd.join(path) };
    let path = path.canonicalize().ok()?;
    path.is_dir().then_some(path)
}

pub fn cd(target: &str) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let target = target.trim();
    if target.is_empty() {
        println!("{}", cwd.display());
        return Ok(());
    }

    match resolve_dir(&cwd, target) {
        Some(dir) => {
            std::env::set_current_dir(&dir)
                .with_context(|| format!("failed to change directory to {}", dir.display()))?;
            println!("{}", style::success(&format!("Now in: {}", dir.display())));
        }
        None => {
            println!(
                "{}",
                style::error(&format!("Path not found: {}", cwd.join(expand_tilde(target)).display()))
            );
        }
    }
    Ok(())
}

pub fn pwd() -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    println!("{}", cwd.display());
    Ok(())
}

/// Entry names in `dir`: directories first with a trailing `/`, then files,
/// each group ordered case-insensitively.
pub fn list_entries(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries: Vec<(bool, String)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_dir = entry.path().is_dir();
        entries.push((is_dir, entry.file_name().to_string_lossy().into_owned()));
    }
    entries.sort_by(|(a_dir, a), (b_dir, b)| {
        b_dir
            .cmp(a_dir)
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
    });
    Ok(entries
        .into_iter()
        .map(|(is_dir, name)| if is_dir { format!("{}/", name) } else { name })
        .collect())
}

pub fn ls() -> Result<()> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let entries = list_entries(&cwd)
        .with_context(|| format!("failed to list {}", cwd.display()))?;
    if entries.is_empty() {
        println!("{}", style::dim("(empty)"));
        return Ok(());
    }
    for entry in entries {
        println!("{}", entry);
    }
    Ok(())
}
