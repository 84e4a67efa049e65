//! Stage 1: strip trailing newlines, ANSI-aware tab expansion, ANSI parsing.

use crate::error::DiffMoveError;
use crate::styled::{StyledString, expand_tabs_ansi_aware};

/// Normalize a single raw line into a styled string.
pub fn normalize_line(raw: &str, line_number: usize) -> Result<StyledString, DiffMoveError> {
    let stripped = raw.strip_suffix('\n').unwrap_or(raw);
    let stripped = stripped.strip_suffix('\r').unwrap_or(stripped);
    let expanded = expand_tabs_ansi_aware(stripped);
    StyledString::parse_ansi(&expanded, line_number)
}

/// Pull-based iterator adapter: raw text lines in, styled strings out.
/// Line numbers are assigned downstream by the Enumerator so this stage
/// stays a pure text transform, per spec.
pub struct NormalizeIter<I> {
    inner: I,
    next_line_number: usize,
}

impl<I> NormalizeIter<I> {
    pub fn new(inner: I) -> Self {
        NormalizeIter {
            inner,
            next_line_number: 1,
        }
    }
}

impl<I, S> Iterator for NormalizeIter<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Result<StyledString, DiffMoveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;
        let line_number = self.next_line_number;
        self.next_line_number += 1;
        Some(normalize_line(raw.as_ref(), line_number))
    }
}
