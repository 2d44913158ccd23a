//! Per-file diff parsing and synthetic whole-file diffs.

use tracing::debug;

use super::hunk::DiffHunk;
use super::line::DiffLine;
use crate::status::{FileChange, FileChangeStatus};

/// The full diff for one file: an ordered list of hunks plus a binary flag.
///
/// A binary diff carries no hunks. A non-binary diff with no hunks means the
/// file has no textual changes to display (e.g. a mode-only change).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// The change this diff belongs to
    pub file_change: FileChange,
    /// Hunks in source order
    pub hunks: Vec<DiffHunk>,
    /// True when git reported a binary difference (or content is undecodable)
    pub is_binary: bool,
}

impl FileDiff {
    /// Parse raw `git diff` output for a single file.
    ///
    /// Binary diffs are detected by git's `Binary files` notice. Whole-file
    /// adds and deletes that git renders without `@@` headers get a single
    /// synthesized hunk. Everything else goes through standard multi-hunk
    /// parsing, where malformed headers degrade to zeroed coordinates
    /// instead of failing the parse.
    #[must_use]
    pub fn parse(text: &str, file_change: FileChange) -> Self {
        if text.contains("Binary files") {
            return Self::binary(file_change);
        }

        let has_hunk_header = text.lines().any(|line| line.starts_with("@@"));
        if !has_hunk_header
            && matches!(
                file_change.status,
                FileChangeStatus::Added | FileChangeStatus::Deleted
            )
        {
            return Self::parse_headerless(text, file_change);
        }

        let mut hunks = Vec::new();
        let mut current: Option<DiffHunk> = None;

        for line in text.lines() {
            if line.starts_with("@@") {
                if let Some(hunk) = current.take() {
                    hunks.push(hunk);
                }
                current = Some(DiffHunk::from_header(line));
            } else if line.starts_with(['+', '-', ' '])
                && let Some(hunk) = current.as_mut()
            {
                // Marker lines before the first header are the file headers
                // (--- a/..., +++ b/...) and are dropped with it.
                hunk.lines.push(DiffLine::new(line));
            }
            // Everything else (diff --git, index, \ No newline) is ignored.
        }
        if let Some(hunk) = current.take() {
            hunks.push(hunk);
        }

        Self {
            file_change,
            hunks,
            is_binary: false,
        }
    }

    /// Synthesize the diff for a file git has no baseline for.
    ///
    /// Used for untracked files: the whole content becomes one all-addition
    /// hunk, shaped like the headerless add case. Interior empty lines are
    /// preserved; the single empty element produced by a trailing newline is
    /// dropped. Empty content yields no hunks.
    #[must_use]
    pub fn synthesize_added(content: &str, file_change: FileChange) -> Self {
        if content.is_empty() {
            return Self {
                file_change,
                hunks: Vec::new(),
                is_binary: false,
            };
        }

        let mut parts: Vec<&str> = content.split('\n').collect();
        if content.ends_with('\n') {
            parts.pop();
        }

        let lines: Vec<DiffLine> = parts
            .into_iter()
            .map(|line| DiffLine::new(format!("+{line}")))
            .collect();

        debug!(path = %file_change.path, lines = lines.len(), "synthesized whole-file diff");
        Self {
            file_change,
            hunks: vec![DiffHunk::whole_file_added(lines)],
            is_binary: false,
        }
    }

    /// A binary diff: no hunks to display.
    #[must_use]
    pub fn binary(file_change: FileChange) -> Self {
        Self {
            file_change,
            hunks: Vec::new(),
            is_binary: true,
        }
    }

    /// Whether there is anything to display for this file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    fn parse_headerless(text: &str, file_change: FileChange) -> Self {
        // Whole-file add/delete with no @@ headers: every marker-prefixed
        // line belongs to the one synthesized hunk. Metadata lines (diff
        // --git, index ...) carry no marker and drop out here.
        let lines: Vec<DiffLine> = text
            .lines()
            .filter(|line| line.starts_with(['+', '-', ' ']))
            .map(DiffLine::new)
            .collect();

        let hunks = if lines.is_empty() {
            Vec::new()
        } else if file_change.status == FileChangeStatus::Added {
            vec![DiffHunk::whole_file_added(lines)]
        } else {
            vec![DiffHunk::whole_file_deleted(lines)]
        };

        Self {
            file_change,
            hunks,
            is_binary: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::line::LineKind;
    use similar_asserts::assert_eq;

    fn modified(path: &str) -> FileChange {
        FileChange::new(path, FileChangeStatus::Modified)
    }

    #[test]
    fn parse_single_hunk() {
        let text = "diff --git a/gtk.nix b/gtk.nix\n\
                    index 2ce966d..93d8dbc 100644\n\
                    --- a/gtk.nix\n\
                    +++ b/gtk.nix\n\
                    @@ -10,2 +10,3 @@ line 9\n\
                    -    gtk.theme.name = \"Adwaita\";\n\
                    +    # Theme managed elsewhere\n\
                    +    gtk.cursorTheme.size = 24;\n";
        let diff = FileDiff::parse(text, modified("gtk.nix"));

        assert!(!diff.is_binary);
        assert_eq!(diff.hunks.len(), 1);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.header, "@@ -10,2 +10,3 @@ line 9");
        assert_eq!(hunk.lines.len(), 3);
        assert_eq!(hunk.lines[0].raw(), "-    gtk.theme.name = \"Adwaita\";");
        assert_eq!(hunk.lines[0].kind(), LineKind::Deletion);
    }

    #[test]
    fn parse_two_hunks_split_in_source_order() {
        let text = "--- a/flake.nix\n\
                    +++ b/flake.nix\n\
                    @@ -136,0 +137,1 @@\n\
                    +      debug = true;\n\
                    @@ -140,0 +142,1 @@\n\
                    +        ./modules/home.nix\n";
        let diff = FileDiff::parse(text, modified("flake.nix"));

        assert_eq!(diff.hunks.len(), 2);
        assert_eq!(diff.hunks[0].header, "@@ -136,0 +137,1 @@");
        assert_eq!(diff.hunks[0].lines.len(), 1);
        assert_eq!(diff.hunks[0].lines[0].raw(), "+      debug = true;");
        assert_eq!(diff.hunks[1].header, "@@ -140,0 +142,1 @@");
        assert_eq!(diff.hunks[1].lines.len(), 1);
    }

    #[test]
    fn parse_ignores_no_newline_marker() {
        let text = "@@ -3,1 +3,1 @@\n\
                    -old version\n\
                    \\ No newline at end of file\n\
                    +new version\n";
        let diff = FileDiff::parse(text, modified("a.txt"));
        assert_eq!(diff.hunks[0].lines.len(), 2);
    }

    #[test]
    fn parse_binary_notice() {
        let text = "diff --git a/logo.png b/logo.png\n\
                    index 1111111..2222222 100644\n\
                    Binary files a/logo.png and b/logo.png differ\n";
        let diff = FileDiff::parse(text, modified("logo.png"));
        assert!(diff.is_binary);
        assert_eq!(diff.hunks, vec![]);
    }

    #[test]
    fn parse_mode_only_change_has_no_hunks() {
        let text = "diff --git a/run.sh b/run.sh\n\
                    old mode 100644\n\
                    new mode 100755\n";
        let diff = FileDiff::parse(text, modified("run.sh"));
        assert!(!diff.is_binary);
        assert!(diff.is_empty());
    }

    #[test]
    fn parse_headerless_add() {
        let text = "+line1\n+line2\n";
        let change = FileChange::new("new.txt", FileChangeStatus::Added);
        let diff = FileDiff::parse(text, change);

        assert_eq!(diff.hunks.len(), 1);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.header, "@@ -0,0 +1,2 @@");
        assert_eq!(hunk.lines[0].raw(), "+line1");
        assert_eq!(hunk.lines[1].raw(), "+line2");
    }

    #[test]
    fn parse_headerless_add_drops_metadata() {
        let text = "diff --git a/new.txt b/new.txt\n\
                    index 0000000..e69de29\n\
                    +only line\n";
        let change = FileChange::new("new.txt", FileChangeStatus::Added);
        let diff = FileDiff::parse(text, change);

        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].lines.len(), 1);
        assert_eq!(diff.hunks[0].lines[0].raw(), "+only line");
    }

    #[test]
    fn parse_headerless_delete() {
        let text = "-line1\n-line2\n-line3\n";
        let change = FileChange::new("gone.txt", FileChangeStatus::Deleted);
        let diff = FileDiff::parse(text, change);

        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].header, "@@ -1,3 +0,0 @@");
    }

    #[test]
    fn parse_headerless_with_no_marker_lines() {
        let text = "diff --git a/empty.txt b/empty.txt\nindex 0000000..e69de29\n";
        let change = FileChange::new("empty.txt", FileChangeStatus::Added);
        let diff = FileDiff::parse(text, change);
        assert!(diff.is_empty());
        assert!(!diff.is_binary);
    }

    #[test]
    fn parse_headerless_only_for_add_and_delete() {
        // A modified file with no @@ header yields no hunks rather than a
        // synthesized one.
        let text = "+stray line\n";
        let diff = FileDiff::parse(text, modified("odd.txt"));
        assert!(diff.is_empty());
    }

    #[test]
    fn synthesize_untracked_without_trailing_newline() {
        let change = FileChange::new("notes.md", FileChangeStatus::Untracked);
        let diff = FileDiff::synthesize_added("first\nsecond\nthird", change);

        assert_eq!(diff.hunks.len(), 1);
        let hunk = &diff.hunks[0];
        assert_eq!(hunk.header, "@@ -0,0 +1,3 @@");
        assert_eq!(hunk.new_count, 3);
        for (line, content) in hunk.lines.iter().zip(["first", "second", "third"]) {
            assert_eq!(line.kind(), LineKind::Addition);
            assert_eq!(line.content(), content);
        }
    }

    #[test]
    fn synthesize_untracked_drops_trailing_newline_element() {
        let change = FileChange::new("notes.md", FileChangeStatus::Untracked);
        let diff = FileDiff::synthesize_added("one\ntwo\n", change);
        assert_eq!(diff.hunks[0].new_count, 2);
    }

    #[test]
    fn synthesize_untracked_preserves_interior_empty_lines() {
        let change = FileChange::new("notes.md", FileChangeStatus::Untracked);
        let diff = FileDiff::synthesize_added("a\n\nb\n", change);

        let raws: Vec<&str> = diff.hunks[0].lines.iter().map(|l| l.raw()).collect();
        assert_eq!(raws, vec!["+a", "+", "+b"]);
    }

    #[test]
    fn synthesize_empty_content_yields_no_hunks() {
        let change = FileChange::new("empty.txt", FileChangeStatus::Untracked);
        let diff = FileDiff::synthesize_added("", change);
        assert!(diff.is_empty());
        assert!(!diff.is_binary);
    }

    #[test]
    fn binary_constructor() {
        let diff = FileDiff::binary(FileChange::new("blob.bin", FileChangeStatus::Untracked));
        assert!(diff.is_binary);
        assert!(diff.is_empty());
    }
}
