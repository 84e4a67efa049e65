use thiserror::Error;

/// Errors the pipeline can raise. A fatal error aborts the enclosing
/// consumer; no partial group is emitted for the group in which it occurred.
#[derive(Debug, Error)]
pub enum DiffMoveError {
    /// A non-SGR escape sequence that isn't one of the recognized
    /// fallback shapes (CSI cursor/erase commands, OSC) was encountered.
    #[error("line {line_number}: unrecoverable ANSI escape sequence: {detail}")]
    ParseSgrNonrecoverable { line_number: usize, detail: String },

    /// A line inside a diff body started with a character the classifier
    /// doesn't know how to handle.
    #[error("line {line_number}: unrecognized diff body line: {line:?}")]
    ClassifierUnreachable { line_number: usize, line: String },

    #[error("input error: {0}")]
    Io(String),
}
