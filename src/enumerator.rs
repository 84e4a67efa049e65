//! Stage 2: pair each normalized line with its 1-based line number.

use crate::error::DiffMoveError;
use crate::styled::StyledString;

pub struct EnumerateIter<I> {
    inner: I,
    next_line_number: usize,
}

impl<I> EnumerateIter<I> {
    pub fn new(inner: I) -> Self {
        EnumerateIter {
            inner,
            next_line_number: 1,
        }
    }
}

impl<I> Iterator for EnumerateIter<I>
where
    I: Iterator<Item = Result<StyledString, DiffMoveError>>,
{
    type Item = Result<(usize, StyledString), DiffMoveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        let line_number = self.next_line_number;
        self.next_line_number += 1;
        Some(item.map(|text| (line_number, text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::NormalizeIter;

    #[test]
    fn line_numbers_are_dense_and_increasing() {
        let lines = vec!["a", "b", "c"];
        let out: Vec<_> = EnumerateIter::new(NormalizeIter::new(lines.into_iter()))
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(out, vec![1, 2, 3]);
    }
}
