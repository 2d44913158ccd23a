//! Single-hunk patch document generation.
//!
//! The output is fed back into `git apply`, which is whitespace- and
//! byte-sensitive, so body lines are emitted verbatim from the stored raw
//! line text; nothing is re-derived from parsed content.

use crate::diff::DiffHunk;

/// Build a minimal `git apply`-compatible patch for one hunk of one file.
///
/// Layout:
///
/// ```text
/// diff --git a/<path> b/<path>
/// --- a/<path>
/// +++ b/<path>
/// <hunk header>
/// <body lines, verbatim>
/// ```
#[must_use]
pub fn build_patch(path: &str, hunk: &DiffHunk) -> String {
    let mut patch = String::new();
    patch.push_str(&format!("diff --git a/{path} b/{path}\n"));
    patch.push_str(&format!("--- a/{path}\n"));
    patch.push_str(&format!("+++ b/{path}\n"));
    patch.push_str(&hunk.header);
    patch.push('\n');
    for line in &hunk.lines {
        patch.push_str(line.raw());
        patch.push('\n');
    }
    patch
}
