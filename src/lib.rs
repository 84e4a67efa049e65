//! Turns a stream of unified-diff text into an annotated, move-aware
//! structured form.
//!
//! The pipeline is five pull-based stages — normalize, enumerate, classify,
//! group, and (within each diff group) link headers and detect moves — each
//! exposed as its own module so callers can compose a subset if they don't
//! need the full thing. [`process_lines`] runs all five for the common case.

pub mod classifier;
pub mod enumerator;
pub mod error;
pub mod grouper;
pub mod linker;
pub mod mover;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod styled;
pub mod tokenizer;

pub use error::DiffMoveError;
pub use pipeline::{process_lines, process_lines_with_threshold};
pub use record::{BodyInfo, CommentInfo, DiffInfo, FileHeaderInfo, Group, GroupType, Info, Record};
