//! Stage 5: within a `diff` group, track the running file-header set and
//! current hunk, and back-reference each body item to them.

use std::rc::Rc;

use crate::record::{BodyInfo, DiffInfo, FileHeaderInfo, FileHeaderSet, Group, HeaderLink, Info};

/// Link headers for a diff group in place. `non-diff` groups are untouched.
pub fn link_headers(group: &mut Group) {
    if group.items.is_empty() {
        return;
    }

    let mut current_header = FileHeaderSet::default();
    let mut current_ref: Option<Rc<HeaderLink>> = None;
    let mut prev_was_file_header = false;

    for item in group.items.iter_mut() {
        let is_file_header = item.is_file_header();

        if is_file_header && !prev_was_file_header {
            current_header = FileHeaderSet::default();
            current_ref = None;
        }

        match item.info.clone() {
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Git { .. })) => {
                current_header.git = Some(item.clone());
            }
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::From { .. })) => {
                current_header.from = Some(item.clone());
            }
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::To { .. })) => {
                current_header.to = Some(item.clone());
            }
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Generic)) => {}
            Info::Diff(DiffInfo::Body(BodyInfo::HunkLines)) => {
                let link = Rc::new(HeaderLink {
                    file_header: current_header.clone(),
                    hunk_lines: Some(item.clone()),
                });
                current_ref = Some(link.clone());
                item.diff_ref = Some(link);
            }
            Info::Diff(DiffInfo::Body(_)) => {
                // Lazily snapshot a ref with no hunk yet (e.g. a binary-file
                // comment that appears before any `@@` line), sharing it
                // across body items until the next hunk or header reset.
                if current_ref.is_none() {
                    current_ref = Some(Rc::new(HeaderLink {
                        file_header: current_header.clone(),
                        hunk_lines: None,
                    }));
                }
                item.diff_ref = current_ref.clone();
            }
            Info::Diff(DiffInfo::Comment(_)) | Info::NonDiff => {}
        }

        prev_was_file_header = is_file_header;
    }
}
