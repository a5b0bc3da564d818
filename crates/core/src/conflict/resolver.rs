//! Naive union resolution of textual merge conflicts.
//!
//! Every line starting with one of the three two-way conflict markers is
//! dropped; every other line is kept verbatim and in order. Inside a conflict
//! region this yields the "ours" lines followed by the "theirs" lines. No
//! hunk is chosen over another and nothing is deduplicated.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::ConflictError;

/// Opens a conflict region (`<<<<<<< HEAD`).
pub const OURS_MARKER: &str = "<<<<<<<";
/// Separates the two sides.
pub const DIVIDER_MARKER: &str = "=======";
/// Closes a conflict region (`>>>>>>> branch`).
pub const THEIRS_MARKER: &str = ">>>>>>>";

/// Result of filtering one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    pub text: String,
    /// Marker lines dropped.
    pub markers_removed: usize,
    /// Opening markers seen.
    pub regions: usize,
    /// A region was still open at end of input. Informational only.
    pub unterminated: bool,
}

/// Drop all conflict-marker lines from `content`.
///
/// Lines are split on `\n` or `\r\n` and rejoined with `\n`; a trailing
/// newline on the input is kept. Whether a line sits inside a conflict is
/// tracked for reporting but never decides whether the line is kept.
pub fn resolve_text(content: &str) -> ResolvedText {
    let mut kept: Vec<&str> = Vec::new();
    let mut markers_removed = 0;
    let mut regions = 0;
    let mut in_conflict = false;

    for line in content.lines() {
        if line.starts_with(OURS_MARKER) {
            in_conflict = true;
            regions += 1;
            markers_removed += 1;
        } else if line.starts_with(DIVIDER_MARKER) {
            markers_removed += 1;
        } else if line.starts_with(THEIRS_MARKER) {
            in_conflict = false;
            markers_removed += 1;
        } else {
            kept.push(line);
        }
    }

    let mut text = kept.join("\n");
    if content.ends_with('\n') && !kept.is_empty() {
        text.push('\n');
    }

    ResolvedText {
        text,
        markers_removed,
        regions,
        unterminated: in_conflict,
    }
}

/// Totals for one [`ConflictResolver::resolve`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveSummary {
    pub files: usize,
    pub markers_removed: usize,
}

/// Rewrites conflicted files under a work-tree root.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    root: PathBuf,
}

impl ConflictResolver {
    /// `root` is the directory repo-relative conflict paths are joined to.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rewrite every file in `files`, even those without markers.
    pub fn resolve(&self, files: &[PathBuf]) -> Result<ResolveSummary, ConflictError> {
        let mut summary = ResolveSummary::default();

        for file in files {
            let path = self.root.join(file);
            let content = std::fs::read_to_string(&path).map_err(|source| {
                ConflictError::ReadFailed {
                    path: file.clone(),
                    source,
                }
            })?;

            let resolved = resolve_text(&content);
            if resolved.unterminated {
                warn!(file = %file.display(), "conflict region not closed before end of file");
            }

            std::fs::write(&path, &resolved.text).map_err(|source| ConflictError::WriteFailed {
                path: file.clone(),
                source,
            })?;

            debug!(
                file = %file.display(),
                regions = resolved.regions,
                markers = resolved.markers_removed,
                "resolved file"
            );
            summary.files += 1;
            summary.markers_removed += resolved.markers_removed;
        }

        info!(
            files = summary.files,
            markers = summary.markers_removed,
            "conflict resolution complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFLICTED: &str = "\
header
<<<<<<< HEAD
ours one
ours two
=======
theirs one
>>>>>>> feature-b
footer
";

    #[test]
    fn test_union_keeps_both_sides_in_order() {
        let resolved = resolve_text(CONFLICTED);
        assert_eq!(
            resolved.text,
            "header\nours one\nours two\ntheirs one\nfooter\n"
        );
        assert_eq!(resolved.markers_removed, 3);
        assert_eq!(resolved.regions, 1);
        assert!(!resolved.unterminated);
    }

    #[test]
    fn test_multiple_regions_and_no_dedup() {
        let content = "<<<<<<< HEAD\nsame\n=======\nsame\n>>>>>>> x\nmid\n<<<<<<< HEAD\na\n=======\n>>>>>>> x\n";
        let resolved = resolve_text(content);
        assert_eq!(resolved.text, "same\nsame\nmid\na\n");
        assert_eq!(resolved.regions, 2);
        assert_eq!(resolved.markers_removed, 6);
    }

    #[test]
    fn test_lines_kept_verbatim() {
        let content = "  indented  \n\n<<<<<<< HEAD\n\tx \n=======\n y\n>>>>>>> b\n";
        let resolved = resolve_text(content);
        assert_eq!(resolved.text, "  indented  \n\n\tx \n y\n");
    }

    #[test]
    fn test_no_markers_is_unchanged() {
        let content = "fn main() {\n    println!(\"hi\");\n}\n";
        let resolved = resolve_text(content);
        assert_eq!(resolved.text, content);
        assert_eq!(resolved.markers_removed, 0);

        let no_trailing = "a\nb";
        assert_eq!(resolve_text(no_trailing).text, no_trailing);
    }

    #[test]
    fn test_crlf_lines_are_split() {
        let content = "a\r\n<<<<<<< HEAD\r\nb\r\n=======\r\nc\r\n>>>>>>> x\r\n";
        assert_eq!(resolve_text(content).text, "a\nb\nc\n");
    }

    #[test]
    fn test_malformed_markers_are_still_dropped() {
        // Missing closing marker.
        let open = resolve_text("<<<<<<< HEAD\nours\n=======\ntheirs\n");
        assert_eq!(open.text, "ours\ntheirs\n");
        assert!(open.unterminated);

        // Stray divider and closer with no opener.
        let stray = resolve_text("a\n=======\nb\n>>>>>>> x\nc\n");
        assert_eq!(stray.text, "a\nb\nc\n");
        assert_eq!(stray.regions, 0);

        // Nested openers.
        let nested = resolve_text("<<<<<<< A\n<<<<<<< B\nx\n>>>>>>> B\n>>>>>>> A\n");
        assert_eq!(nested.text, "x\n");
        assert_eq!(nested.regions, 2);
    }

    #[test]
    fn test_marker_prefix_matches_at_line_start_only() {
        let content = "x <<<<<<< not a marker\n========== is a marker\n";
        assert_eq!(resolve_text(content).text, "x <<<<<<< not a marker\n");
    }

    #[test]
    fn test_resolver_rewrites_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/conflicted.txt"), CONFLICTED).unwrap();
        std::fs::write(dir.path().join("clean.txt"), "untouched\n").unwrap();

        let resolver = ConflictResolver::new(dir.path());
        let summary = resolver
            .resolve(&[PathBuf::from("src/conflicted.txt"), PathBuf::from("clean.txt")])
            .unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.markers_removed, 3);
        let text = std::fs::read_to_string(dir.path().join("src/conflicted.txt")).unwrap();
        assert!(!text.lines().any(|l| l.starts_with("<<<<<<<")
            || l.starts_with("=======")
            || l.starts_with(">>>>>>>")));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("clean.txt")).unwrap(),
            "untouched\n"
        );
    }

    #[test]
    fn test_resolver_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ConflictResolver::new(dir.path());
        let result = resolver.resolve(&[PathBuf::from("gone.txt")]);
        assert!(matches!(
            result,
            Err(ConflictError::ReadFailed { ref path, .. }) if path == Path::new("gone.txt")
        ));
    }
}
