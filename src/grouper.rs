//! Stage 4: collapse consecutive records sharing the same top-level type
//! (`diff` vs `non-diff`) into groups. Buffers exactly one record of
//! lookahead to detect the boundary.

use std::iter::Peekable;

use crate::error::DiffMoveError;
#[cfg(test)]
use crate::record::GroupType;
use crate::record::{Group, Record};

pub struct GroupIter<I: Iterator> {
    inner: Peekable<I>,
}

impl<I> GroupIter<I>
where
    I: Iterator<Item = Result<Record, DiffMoveError>>,
{
    pub fn new(inner: I) -> Self {
        GroupIter {
            inner: inner.peekable(),
        }
    }
}

impl<I> Iterator for GroupIter<I>
where
    I: Iterator<Item = Result<Record, DiffMoveError>>,
{
    type Item = Result<Group, DiffMoveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.inner.next()? {
            Ok(r) => r,
            Err(e) => return Some(Err(e)),
        };
        let group_type = first.top_type();
        let mut items = vec![first];

        while let Some(Ok(r)) = self
            .inner
            .next_if(|r| matches!(r, Ok(rec) if rec.top_type() == group_type))
        {
            items.push(r);
        }

        Some(Ok(Group { group_type, items }))
    }
}
