//! Repository maintenance commands: setup, status, branches, stash,
//! unstash and cleanup.

use anyhow::{Context as _, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use gitsolver_core::models::RemoteUrl;
use gitsolver_core::VcsGateway;

use super::Context;
use crate::style;

/// Add or change the remote URL. `url` skips the prompts.
pub fn setup(ctx: &Context, url: Option<&str>) -> Result<()> {
    ctx.require_repo()?;
    let client = &ctx.client;
    let remote = client.remote_name();

    match client.origin_url().context("failed to read remote URL")? {
        Some(current) => {
            println!("Current {}: {}", remote, current);
            let new_url = match url {
                Some(url) => url.to_string(),
                None => {
                    if !ctx.prompter.confirm(&format!("Change {} URL?", remote), false)? {
                        return Ok(());
                    }
                    ctx.prompter.text(&format!("Enter new {} URL", remote))?
                }
            };
            client.set_origin_url(&RemoteUrl::parse(&new_url)?)?;
            println!("{}", style::success(&format!("Updated {} to {}", remote, new_url.trim())));
        }
        None => {
            println!("{}", style::warn(&format!("No {} remote found", remote)));
            let new_url = match url {
                Some(url) => url.to_string(),
                None => ctx.prompter.text(&format!("Enter {} URL", remote))?,
            };
            client.set_origin_url(&RemoteUrl::parse(&new_url)?)?;
            println!("{}", style::success(&format!("Added {} {}", remote, new_url.trim())));
        }
    }
    Ok(())
}

pub fn status(ctx: &Context) -> Result<()> {
    ctx.require_repo()?;
    let output = ctx.client.status()?;
    print!("{}", output);
    Ok(())
}

pub fn branches(ctx: &Context) -> Result<()> {
    ctx.require_repo()?;
    let local = ctx.client.local_branches()?;
    let remote = ctx.client.remote_branches()?;

    if local.is_empty() && remote.is_empty() {
        println!("{}", style::dim("No branches yet"));
        return Ok(());
    }

    println!("{}", style::header(&format!("Branches ({} local, {} remote)", local.len(), remote.len())));
    println!("{}", branch_table(&local, &remote));
    Ok(())
}

fn branch_table(local: &[String], remote: &[String]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Branch", "Location"]);

    for name in local {
        table.add_row(vec![Cell::new(name), Cell::new("local")]);
    }
    for name in remote {
        table.add_row(vec![Cell::new(name), Cell::new("remote")]);
    }
    table
}

pub fn stash(ctx: &Context) -> Result<()> {
    ctx.require_repo()?;
    if !ctx.client.has_uncommitted_changes()? {
        println!("{}", style::dim("No uncommitted changes to stash"));
        return Ok(());
    }
    ctx.client.stash()?;
    println!("{}", style::success("Changes stashed"));
    Ok(())
}

pub fn unstash(ctx: &Context) -> Result<()> {
    ctx.require_repo()?;
    if ctx.client.unstash()? {
        println!("{}", style::success("Stashed changes restored"));
    } else {
        println!(
            "{}",
            style::dim(&format!(
                "No stash entry marked '{}' to restore",
                ctx.client.stash_marker()
            ))
        );
    }
    Ok(())
}

pub fn cleanup(ctx: &Context) -> Result<()> {
    ctx.require_repo()?;
    if ctx.client.cleanup_lock_files() {
        println!("{}", style::success("Removed stale git lock file"));
    } else {
        println!("{}", style::dim("No lock files found"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_table_rows() {
        let table = branch_table(
            &["main".to_string(), "feature-a".to_string()],
            &["origin/main".to_string()],
        );
        assert_eq!(table.row_iter().count(), 3);
        let rendered = table.to_string();
        assert!(rendered.contains("feature-a"));
        assert!(rendered.contains("origin/main"));
        assert!(rendered.contains("remote"));
    }
}
