//! Hunk model and `@@` header parsing.
//!
//! A hunk header looks like `@@ -oldStart,oldCount +newStart,newCount @@`,
//! optionally followed by a function-context trailer that git appends. The
//! verbatim header line doubles as the hunk's identity key within a file, so
//! it is stored untouched alongside the parsed coordinates.

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, u32 as number},
    combinator::opt,
    sequence::preceded,
};

use super::line::{DiffLine, LineKind};

/// A contiguous change region of a unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// Verbatim header line, identity key within a file
    pub header: String,
    /// First line of the region in the old version
    pub old_start: u32,
    /// Number of old-side lines (context + deletions)
    pub old_count: u32,
    /// First line of the region in the new version
    pub new_start: u32,
    /// Number of new-side lines (context + additions)
    pub new_count: u32,
    /// Body lines in source order
    pub lines: Vec<DiffLine>,
}

/// Old/new line numbers shown next to one diff line.
///
/// Context lines carry both numbers, deletions only the old one, additions
/// only the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumbers {
    pub old: Option<u32>,
    pub new: Option<u32>,
}

impl DiffHunk {
    /// Start a hunk from its verbatim header line.
    ///
    /// A header that fails to parse still produces a hunk, with all four
    /// coordinates zeroed; downstream numbering degrades instead of the
    /// whole diff being rejected.
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let (old_start, old_count, new_start, new_count) =
            parse_header(header).unwrap_or((0, 0, 0, 0));
        Self {
            header: header.to_string(),
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// Synthesize the single hunk for a whole-file addition.
    ///
    /// Used for untracked files and for add diffs that git renders without
    /// `@@` headers.
    #[must_use]
    pub fn whole_file_added(lines: Vec<DiffLine>) -> Self {
        let count = lines.len() as u32;
        Self {
            header: format!("@@ -0,0 +1,{count} @@"),
            old_start: 0,
            old_count: 0,
            new_start: 1,
            new_count: count,
            lines,
        }
    }

    /// Synthesize the single hunk for a whole-file deletion.
    #[must_use]
    pub fn whole_file_deleted(lines: Vec<DiffLine>) -> Self {
        let count = lines.len() as u32;
        Self {
            header: format!("@@ -1,{count} +0,0 @@"),
            old_start: 1,
            old_count: count,
            new_start: 0,
            new_count: 0,
            lines,
        }
    }

    /// Old/new line numbers for the body line at `index`.
    ///
    /// Pure projection over the hunk: the counters start at `old_start` /
    /// `new_start` and every line strictly before `index` advances them
    /// according to its kind. Returns `None` for an out-of-range index.
    #[must_use]
    pub fn line_numbers_at(&self, index: usize) -> Option<LineNumbers> {
        let target = self.lines.get(index)?;

        let mut old_line = self.old_start;
        let mut new_line = self.new_start;
        for line in &self.lines[..index] {
            match line.kind() {
                LineKind::Context => {
                    old_line += 1;
                    new_line += 1;
                }
                LineKind::Deletion => old_line += 1,
                LineKind::Addition => new_line += 1,
            }
        }

        Some(match target.kind() {
            LineKind::Context => LineNumbers {
                old: Some(old_line),
                new: Some(new_line),
            },
            LineKind::Deletion => LineNumbers {
                old: Some(old_line),
                new: None,
            },
            LineKind::Addition => LineNumbers {
                old: None,
                new: Some(new_line),
            },
        })
    }
}

/// Parse `(old_start, old_count, new_start, new_count)` from a hunk header.
///
/// An absent comma-count defaults to 0. Git's own convention treats an
/// omitted count as 1; the zero default here pins the behavior the rest of
/// the engine was built against, and the tests lock it down rather than
/// silently adopting the git convention.
#[must_use]
pub fn parse_header(header: &str) -> Option<(u32, u32, u32, u32)> {
    header_coords(header).ok().map(|(_, coords)| coords)
}

fn header_coords(input: &str) -> IResult<&str, (u32, u32, u32, u32)> {
    let (input, _) = tag("@@ -").parse(input)?;
    let (input, old_start) = number(input)?;
    let (input, old_count) = opt(preceded(char(','), number)).parse(input)?;
    let (input, _) = tag(" +").parse(input)?;
    let (input, new_start) = number(input)?;
    let (input, new_count) = opt(preceded(char(','), number)).parse(input)?;
    let (input, _) = tag(" @@").parse(input)?;
    Ok((
        input,
        (
            old_start,
            old_count.unwrap_or(0),
            new_start,
            new_count.unwrap_or(0),
        ),
    ))
}
