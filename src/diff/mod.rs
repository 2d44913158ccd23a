//! Structured model of unified-diff text.
//!
//! Raw `git diff` output for one file is parsed into a [`FileDiff`] holding
//! ordered [`DiffHunk`]s of [`DiffLine`]s. Every line keeps its exact
//! original text so a patch rebuilt from the model is byte-identical to
//! what git emitted.

pub mod file;
pub mod hunk;
pub mod line;

pub use file::FileDiff;
pub use hunk::{DiffHunk, LineNumbers};
pub use line::{DiffLine, LineKind};
