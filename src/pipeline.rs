//! Ties the five stages into the single entry point most callers want.

use crate::classifier::ClassifyIter;
use crate::enumerator::EnumerateIter;
use crate::error::DiffMoveError;
use crate::grouper::GroupIter;
use crate::linker::link_headers;
use crate::mover::{self, threshold_from_env};
use crate::normalizer::NormalizeIter;
use crate::record::{Group, GroupType};

/// Run the full pipeline over a sequence of raw text lines, using the
/// similarity threshold from the `T` environment variable.
pub fn process_lines<I, S>(lines: I) -> Result<Vec<Group>, DiffMoveError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    process_lines_with_threshold(lines, threshold_from_env())
}

/// As [`process_lines`], but with an explicit threshold rather than reading
/// the `T` environment variable.
pub fn process_lines_with_threshold<I, S>(
    lines: I,
    threshold: f64,
) -> Result<Vec<Group>, DiffMoveError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized = NormalizeIter::new(lines.into_iter());
    let enumerated = EnumerateIter::new(normalized);
    let classified = ClassifyIter::new(enumerated);
    let grouped = GroupIter::new(classified);

    grouped
        .map(|group| {
            group.map(|mut g| {
                if g.group_type == GroupType::Diff {
                    link_headers(&mut g);
                    mover::apply_moves(&mut g, threshold);
                }
                g
            })
        })
        .collect()
}
