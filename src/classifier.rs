//! Stage 3: attach an `info` tag to each record identifying its role in a
//! unified diff, via a small stateful scan over a fixed rule set.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DiffMoveError;
use crate::record::{BodyInfo, DiffInfo, FileHeaderInfo, Info, Record};
use crate::styled::StyledString;

static GIT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^diff --git (a/.+?) (b/.+?)$").unwrap());
static PLUS_MINUS_HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-+]{3} ").unwrap());
static FROM_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--- (.+?)(?:\t.*)?$").unwrap());
static TO_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\+\+ (.+?)(?:\t.*)?$").unwrap());
static BINARY_FILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Binary files (\S*) and (\S*)").unwrap());

/// Stateful classifier scan. One instance per input pass (spec.md §4.2:
/// `diff_start` and `in_header` persist across records within a pass).
#[derive(Debug, Default)]
pub struct ClassifierState {
    diff_start: bool,
    in_header: bool,
}

impl ClassifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one line's color-stripped text, returning the `Info` to
    /// attach to its record.
    pub fn classify(&mut self, plain: &str, line_number: usize) -> Result<Info, DiffMoveError> {
        if let Some(caps) = GIT_HEADER.captures(plain) {
            self.diff_start = true;
            self.in_header = true;
            return Ok(Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Git {
                from_file: caps[1].to_string(),
                to_file: caps[2].to_string(),
            })));
        }

        if self.in_header || PLUS_MINUS_HEADER.is_match(plain) {
            self.diff_start = true;
            self.in_header = true;

            if let Some(caps) = FROM_HEADER.captures(plain) {
                return Ok(Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::From {
                    from_file: caps[1].to_string(),
                })));
            }
            if let Some(caps) = TO_HEADER.captures(plain) {
                self.in_header = false;
                return Ok(Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::To {
                    to_file: caps[1].to_string(),
                })));
            }
            if let Some(caps) = BINARY_FILES.captures(plain) {
                self.in_header = false;
                return Ok(Info::Diff(DiffInfo::Body(BodyInfo::CommentBinary {
                    from_file: caps[1].to_string(),
                    to_file: caps[2].to_string(),
                })));
            }
            return Ok(Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Generic)));
        }

        if self.diff_start && !self.in_header && !plain.is_empty() {
            let first = plain.as_bytes()[0];
            let body = match first {
                b'@' if plain.starts_with("@@") => BodyInfo::HunkLines,
                b'-' => BodyInfo::Removed,
                b'+' => BodyInfo::Added,
                b' ' => BodyInfo::Context,
                b'\\' => BodyInfo::Comment,
                _ => {
                    return Err(DiffMoveError::ClassifierUnreachable {
                        line_number,
                        line: plain.to_string(),
                    });
                }
            };
            return Ok(Info::Diff(DiffInfo::Body(body)));
        }

        self.diff_start = false;
        Ok(Info::NonDiff)
    }
}

/// Pull-based adapter: (line_number, styled text) in, classified `Record` out.
pub struct ClassifyIter<I> {
    inner: I,
    state: ClassifierState,
}

impl<I> ClassifyIter<I> {
    pub fn new(inner: I) -> Self {
        ClassifyIter {
            inner,
            state: ClassifierState::new(),
        }
    }
}

impl<I> Iterator for ClassifyIter<I>
where
    I: Iterator<Item = Result<(usize, StyledString), DiffMoveError>>,
{
    type Item = Result<Record, DiffMoveError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        Some(item.and_then(|(line_number, text)| {
            let plain = text.to_plain_string();
            let info = self.state.classify(&plain, line_number)?;
            Ok(Record::new(line_number, text, info))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_all(lines: &[&str]) -> Vec<Info> {
        let mut state = ClassifierState::new();
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| state.classify(l, i + 1).unwrap())
            .collect()
    }

    #[test]
    fn git_header_then_body() {
        let infos = classify_all(&[
            "diff --git a/x b/x",
            "index 111..222 100644",
            "--- a/x",
            "+++ b/x",
            "@@ -1,1 +1,1 @@",
            "-alpha",
            "+beta",
        ]);
        assert!(matches!(
            infos[0],
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Git { .. }))
        ));
        assert!(matches!(
            infos[1],
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::Generic))
        ));
        assert!(matches!(
            infos[2],
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::From { .. }))
        ));
        assert!(matches!(
            infos[3],
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::To { .. }))
        ));
        assert!(matches!(
            infos[4],
            Info::Diff(DiffInfo::Body(BodyInfo::HunkLines))
        ));
        assert!(matches!(
            infos[5],
            Info::Diff(DiffInfo::Body(BodyInfo::Removed))
        ));
        assert!(matches!(
            infos[6],
            Info::Diff(DiffInfo::Body(BodyInfo::Added))
        ));
    }

    #[test]
    fn binary_files_line() {
        let infos = classify_all(&[
            "diff --git a/x b/x",
            "index 111..222 100644",
            "Binary files a/x and b/x differ",
        ]);
        assert!(matches!(
            infos[2],
            Info::Diff(DiffInfo::Body(BodyInfo::CommentBinary { .. }))
        ));
    }

    #[test]
    fn dev_null_addition() {
        let infos = classify_all(&["--- /dev/null", "+++ b/new", "@@ -0,0 +1,1 @@", "+hello"]);
        match &infos[0] {
            Info::Diff(DiffInfo::FileHeader(FileHeaderInfo::From { from_file })) => {
                assert_eq!(from_file, "/dev/null")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_line_outside_diff_is_non_diff() {
        let infos = classify_all(&["just some text", ""]);
        assert_eq!(infos, vec![Info::NonDiff, Info::NonDiff]);
    }

    #[test]
    fn unrecognized_body_char_is_fatal() {
        let mut state = ClassifierState::new();
        state.classify("--- a/x", 1).unwrap();
        state.classify("+++ b/x", 2).unwrap();
        state.classify("@@ -1 +1 @@", 3).unwrap();
        let err = state.classify("?garbage", 4).unwrap_err();
        assert!(matches!(
            err,
            DiffMoveError::ClassifierUnreachable { line_number: 4, .. }
        ));
    }

    #[test]
    fn idempotent_on_already_classified_plain_text() {
        let mut state_a = ClassifierState::new();
        let mut state_b = ClassifierState::new();
        let lines = [
            "diff --git a/x b/x",
            "--- a/x",
            "+++ b/x",
            "@@ -1 +1 @@",
            "-old",
            "+new",
        ];
        let first_pass: Vec<_> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| state_a.classify(l, i + 1).unwrap())
            .collect();
        let second_pass: Vec<_> = lines
            .iter()
            .enumerate()
            .map(|(i, l)| state_b.classify(l, i + 1).unwrap())
            .collect();
        assert_eq!(first_pass, second_pass);
    }
}
