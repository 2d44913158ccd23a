//! Parsing for git name-status listings into structured file changes.
//!
//! This module handles the tab-separated output of `git diff --name-status`
//! (and `git diff --cached --name-status`) plus the bare-path output of
//! `git ls-files --others --exclude-standard` for untracked files.
//!
//! Parsing is deliberately lenient: git output is well-formed in the
//! overwhelming common case, and one garbled line must not abort an entire
//! listing. Malformed lines and unknown status codes are skipped, never
//! raised.
//!
//! # Examples
//!
//! ```
//! use git_staging::status::{FileChangeStatus, parse_name_status};
//!
//! let changes = parse_name_status("M\tsrc/lib.rs\nR100\told.rs\tnew.rs\n");
//! assert_eq!(changes.len(), 2);
//! assert_eq!(changes[0].path, "new.rs");
//! assert_eq!(changes[0].old_path.as_deref(), Some("old.rs"));
//! assert_eq!(changes[1].status, FileChangeStatus::Modified);
//! ```

use std::fmt;

/// Status of a changed file, mirroring git's single-letter name-status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeStatus {
    /// `A` - added to the index
    Added,
    /// `M` - modified
    Modified,
    /// `D` - deleted
    Deleted,
    /// `R` - renamed (code may carry a similarity score, e.g. `R100`)
    Renamed,
    /// `C` - copied
    Copied,
    /// `?` - untracked (from the separate ls-files listing)
    Untracked,
    /// `T` - type changed (e.g. regular file to symlink)
    TypeChanged,
    /// `U` - unmerged / conflicted
    Conflicted,
}

impl FileChangeStatus {
    /// Map a name-status code to a status.
    ///
    /// Only the first character is significant; rename and copy codes carry
    /// a similarity score suffix (`R100`, `C75`) that is ignored. Unknown
    /// codes yield `None` so callers can skip the line.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            'A' => Some(Self::Added),
            'M' => Some(Self::Modified),
            'D' => Some(Self::Deleted),
            'R' => Some(Self::Renamed),
            'C' => Some(Self::Copied),
            '?' => Some(Self::Untracked),
            'T' => Some(Self::TypeChanged),
            'U' => Some(Self::Conflicted),
            _ => None,
        }
    }

    /// The canonical single-letter code for this status.
    #[must_use]
    pub fn code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Untracked => '?',
            Self::TypeChanged => 'T',
            Self::Conflicted => 'U',
        }
    }
}

impl fmt::Display for FileChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One changed file from a status listing.
///
/// Identity is the current `path`; the record is an immutable snapshot,
/// created fresh on every fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path (for renames, the new path)
    pub path: String,
    /// Change status
    pub status: FileChangeStatus,
    /// Previous path, set only for renames
    pub old_path: Option<String>,
}

impl FileChange {
    /// Construct a change with no previous path.
    #[must_use]
    pub fn new(path: impl Into<String>, status: FileChangeStatus) -> Self {
        Self {
            path: path.into(),
            status,
            old_path: None,
        }
    }
}

/// Parse name-status output into file changes.
///
/// Each line is `<code>\t<path>` or, for renames, `<code>\t<old>\t<new>`.
/// Lines with fewer than two fields, unknown status codes, or a rename code
/// without its third field are skipped. The result is sorted by path (byte
/// order) so callers see a deterministic listing.
#[must_use]
pub fn parse_name_status(listing: &str) -> Vec<FileChange> {
    let mut changes: Vec<FileChange> = listing.lines().filter_map(parse_line).collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

/// Parse the bare-path listing of untracked files.
///
/// `git ls-files --others --exclude-standard` emits one path per line with
/// no status code; every entry is tagged [`FileChangeStatus::Untracked`].
/// The result is sorted by path.
#[must_use]
pub fn parse_untracked(listing: &str) -> Vec<FileChange> {
    let mut changes: Vec<FileChange> = listing
        .lines()
        .filter(|line| !line.is_empty())
        .map(|path| FileChange::new(path, FileChangeStatus::Untracked))
        .collect();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    changes
}

fn parse_line(line: &str) -> Option<FileChange> {
    let mut fields = line.split('\t');
    let code = fields.next()?;
    let first_path = fields.next()?;
    let status = FileChangeStatus::from_code(code)?;

    if status == FileChangeStatus::Renamed {
        // Rename lines are <code>\t<old>\t<new>; without the new path the
        // record is unusable.
        let new_path = fields.next()?;
        return Some(FileChange {
            path: new_path.to_string(),
            status,
            old_path: Some(first_path.to_string()),
        });
    }

    Some(FileChange::new(first_path, status))
}
