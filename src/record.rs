//! The data model: `Record`, its `Info` classification, and the `Group`s the
//! top-grouper produces.

use std::rc::Rc;

use crate::styled::StyledString;

/// One line of input, after normalization, classification, and (for diff
/// body lines) header-linking.
#[derive(Debug, Clone)]
pub struct Record {
    pub line_number: usize,
    pub text: StyledString,
    pub info: Info,
    /// Populated by the header-linker for body records inside a diff group.
    pub diff_ref: Option<Rc<HeaderLink>>,
}

impl Record {
    pub fn new(line_number: usize, text: StyledString, info: Info) -> Self {
        Record {
            line_number,
            text,
            info,
            diff_ref: None,
        }
    }

    pub fn is_file_header(&self) -> bool {
        matches!(self.info, Info::Diff(DiffInfo::FileHeader(_)))
    }

    pub fn top_type(&self) -> GroupType {
        match self.info {
            Info::NonDiff => GroupType::NonDiff,
            Info::Diff(_) => GroupType::Diff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Info {
    NonDiff,
    Diff(DiffInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffInfo {
    FileHeader(FileHeaderInfo),
    Body(BodyInfo),
    /// Synthesized by the Mover.
    Comment(CommentInfo),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileHeaderInfo {
    Git { from_file: String, to_file: String },
    From { from_file: String },
    To { to_file: String },
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyInfo {
    CommentBinary { from_file: String, to_file: String },
    HunkLines,
    Added,
    Removed,
    Context,
    /// The "\ No newline at end of file" marker.
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentInfo {
    Moved,
}

/// `info.diff.ref`: back-reference to the enclosing header set and hunk.
/// `hunk_lines` is `None` for body items that precede any `@@` line in
/// their diff group (e.g. a `Binary files ... differ` comment).
#[derive(Debug, Clone)]
pub struct HeaderLink {
    pub file_header: FileHeaderSet,
    pub hunk_lines: Option<Record>,
}

#[derive(Debug, Clone, Default)]
pub struct FileHeaderSet {
    pub git: Option<Record>,
    pub from: Option<Record>,
    pub to: Option<Record>,
}

impl FileHeaderSet {
    pub fn is_empty(&self) -> bool {
        self.git.is_none() && self.from.is_none() && self.to.is_none()
    }

    /// Resolve the effective (from_file, to_file) pair, preferring the
    /// dedicated `---`/`+++` lines over the `diff --git` line, matching
    /// how the dedicated lines are the "definitive" path for a rename.
    pub fn paths(&self) -> (Option<String>, Option<String>) {
        let from = self
            .from
            .as_ref()
            .and_then(|r| match &r.info {
                Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::From { from_file })) => {
                    Some(from_file.clone())
                }
                _ => None,
            })
            .or_else(|| {
                self.git.as_ref().and_then(|r| match &r.info {
                    Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Git { from_file, .. })) => {
                        Some(from_file.clone())
                    }
                    _ => None,
                })
            });
        let to = self
            .to
            .as_ref()
            .and_then(|r| match &r.info {
                Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::To { to_file })) => {
                    Some(to_file.clone())
                }
                _ => None,
            })
            .or_else(|| {
                self.git.as_ref().and_then(|r| match &r.info {
                    Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Git { to_file, .. })) => {
                        Some(to_file.clone())
                    }
                    _ => None,
                })
            });
        (from, to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
    Diff,
    NonDiff,
}

#[derive(Debug, Clone)]
pub struct Group {
    pub group_type: GroupType,
    pub items: Vec<Record>,
}
