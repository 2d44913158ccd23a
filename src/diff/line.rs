use std::fmt;

/// Kind of a physical diff line, derived from its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Leading space - line present in both versions
    Context,
    /// Leading `+` - line present only in the new version
    Addition,
    /// Leading `-` - line present only in the old version
    Deletion,
}

/// One physical line of a hunk body.
///
/// The exact original text is stored, marker included, because rebuilding a
/// byte-identical patch later depends on it; `git apply` is whitespace- and
/// byte-sensitive. [`kind`](Self::kind) and [`content`](Self::content) are
/// always derived from the raw text, never set independently, so a patch
/// built from these lines round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    raw: String,
}

impl DiffLine {
    /// Wrap a raw diff line, marker included.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The exact original line, including its `+`/`-`/space marker.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Line kind derived from the first character.
    ///
    /// Anything that is not `+` or `-` (including an empty line) counts as
    /// context.
    #[must_use]
    pub fn kind(&self) -> LineKind {
        match self.raw.as_bytes().first() {
            Some(b'+') => LineKind::Addition,
            Some(b'-') => LineKind::Deletion,
            _ => LineKind::Context,
        }
    }

    /// The line with its leading marker stripped.
    #[must_use]
    pub fn content(&self) -> &str {
        match self.raw.as_bytes().first() {
            Some(b'+' | b'-' | b' ') => &self.raw[1..],
            _ => &self.raw,
        }
    }
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
