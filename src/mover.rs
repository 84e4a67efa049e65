//! Stage 6: within a `diff` group, pair removed lines with near-identical
//! added lines (possibly in a different file) and splice in styled
//! cross-reference annotations.

use similar::{Algorithm, ChangeTag, DiffOp, TextDiff, capture_diff_slices};
use strsim::generic_levenshtein;

use crate::record::{BodyInfo, CommentInfo, DiffInfo, Group, Info, Record};
use crate::styled::{StyledString, TagName, TagValue};
use crate::tokenizer::tokenize_delimited;

pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Read the similarity threshold from the `T` environment variable,
/// falling back to the default on absence or malformed input.
pub fn threshold_from_env() -> f64 {
    std::env::var("T")
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t >= 0.0)
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Auxiliary match info carried per retained candidate. `ses` isn't
/// currently consulted by the narrowing step but is cheap to compute
/// alongside the distance and is spec'd for downstream consumers.
#[derive(Debug, Clone)]
pub struct MatchInfo {
    pub distance: usize,
    pub ses: Vec<DiffOp>,
}

struct Entry {
    original_index: usize,
    record: Record,
    tokens: Vec<String>,
    payload: String,
}

struct Candidate {
    added_idx: usize,
    distance: usize,
    ses: Vec<DiffOp>,
}

#[derive(Clone, Copy)]
enum Role {
    Source,
    Destination,
}

/// Detect and splice move annotations into `group` in place. No-op for
/// `non-diff` groups or groups with nothing on one side of the ledger.
pub fn apply_moves(group: &mut Group, threshold: f64) {
    let removed_entries = collect_entries(group, BodyInfo::Removed);
    let added_entries = collect_entries(group, BodyInfo::Added);

    if removed_entries.is_empty() || added_entries.is_empty() {
        return;
    }

    let mut annotations: Vec<(usize, Record)> = Vec::new();

    for removed in &removed_entries {
        let mut candidates: Vec<Candidate> = Vec::new();
        for (added_idx, added) in added_entries.iter().enumerate() {
            let distance = generic_levenshtein(&removed.tokens, &added.tokens);
            let longest = removed.tokens.len().max(added.tokens.len());
            let cap = (threshold * longest as f64).floor() as usize;
            if distance <= cap {
                let ses = capture_diff_slices(Algorithm::Myers, &removed.tokens, &added.tokens);
                candidates.push(Candidate {
                    added_idx,
                    distance,
                    ses,
                });
            }
        }
        candidates.sort_by_key(|c| c.distance);

        let zero_prefix = candidates.iter().take_while(|c| c.distance == 0).count();
        let take_n = if zero_prefix > 0 { zero_prefix } else { 2 };

        for cand in candidates.into_iter().take(take_n) {
            let added = &added_entries[cand.added_idx];
            let match_info = MatchInfo {
                distance: cand.distance,
                ses: cand.ses,
            };
            let (src, dst) = render_annotation(removed, added, &match_info);
            annotations.push((removed.original_index, src));
            annotations.push((added.original_index, dst));
        }
    }

    splice(group, annotations);
}

fn collect_entries(group: &Group, want: BodyInfo) -> Vec<Entry> {
    group
        .items
        .iter()
        .enumerate()
        .filter_map(|(idx, rec)| {
            if rec.info != Info::Diff(DiffInfo::Body(want.clone())) {
                return None;
            }
            let plain = rec.text.to_plain_string();
            let payload: String = plain.chars().skip(1).collect::<String>().trim().to_string();
            let tokens = tokenize_delimited(&payload);
            if tokens.is_empty() {
                return None;
            }
            Some(Entry {
                original_index: idx,
                record: rec.clone(),
                tokens,
                payload,
            })
        })
        .collect()
}

fn render_annotation(removed: &Entry, added: &Entry, match_info: &MatchInfo) -> (Record, Record) {
    let (removed_from, _) = removed
        .record
        .diff_ref
        .as_ref()
        .map(|l| l.file_header.paths())
        .unwrap_or_default();
    let (_, added_to) = added
        .record
        .diff_ref
        .as_ref()
        .map(|l| l.file_header.paths())
        .unwrap_or_default();

    let source_path = added_to.unwrap_or_else(|| "?".to_string());
    let dest_path = removed_from.unwrap_or_else(|| "?".to_string());

    let source_text = build_comment(
        "#\u{2192}",
        &source_path,
        Role::Source,
        &removed.payload,
        &added.payload,
        match_info,
    );
    let dest_text = build_comment(
        "#\u{2190}",
        &dest_path,
        Role::Destination,
        &removed.payload,
        &added.payload,
        match_info,
    );

    let source_rec = Record::new(
        removed.record.line_number,
        source_text,
        Info::Diff(DiffInfo::Comment(CommentInfo::Moved)),
    );
    let dest_rec = Record::new(
        added.record.line_number,
        dest_text,
        Info::Diff(DiffInfo::Comment(CommentInfo::Moved)),
    );

    (source_rec, dest_rec)
}

fn build_comment(
    sigil: &str,
    path: &str,
    role: Role,
    old_payload: &str,
    new_payload: &str,
    match_info: &MatchInfo,
) -> StyledString {
    let mut label = StyledString::from_plain(&format!("{sigil} {path}"));
    let label_len = label.len();
    label.apply_tag(0..label_len, TagName::Bold, TagValue::Flag);
    label.apply_tag(0..label_len, TagName::BgIndex, TagValue::Index(8));
    let label_fg = match role {
        Role::Source => 8 + 1,
        Role::Destination => 8 + 2,
    };
    label.apply_tag(0..label_len, TagName::FgIndex, TagValue::Index(label_fg));

    let body = if match_info.distance == 0 {
        let mut b = StyledString::from_plain(": (unchanged)");
        let len = b.len();
        b.apply_tag(0..len, TagName::Fg, TagValue::Rgb(0x87, 0xCE, 0xEB));
        b
    } else {
        let mut b = StyledString::from_plain(":\n");
        b = b.concat(&StyledString::from_plain(&format!("{sigil}\t")));
        b.concat(&render_word_diff(old_payload, new_payload))
    };

    label.concat(&body)
}

fn render_word_diff(old: &str, new: &str) -> StyledString {
    let diff = TextDiff::from_words(old, new);
    let mut out = StyledString::new();
    for change in diff.iter_all_changes() {
        let value = change.value();
        let mut piece = StyledString::from_plain(value);
        let len = piece.len();
        piece.apply_tag(0..len, TagName::BgIndex, TagValue::Index(8));
        piece.apply_tag(0..len, TagName::Bold, TagValue::Flag);
        let fg = match change.tag() {
            ChangeTag::Delete => 8 + 1,
            ChangeTag::Insert => 8 + 2,
            ChangeTag::Equal => 8 + 7,
        };
        piece.apply_tag(0..len, TagName::FgIndex, TagValue::Index(fg));
        out = out.concat(&piece);
    }
    out
}

/// Stable-sort annotations by the original index they attach to, then
/// splice each in immediately after that item, carrying a running offset.
fn splice(group: &mut Group, mut annotations: Vec<(usize, Record)>) {
    if annotations.is_empty() {
        return;
    }
    annotations.sort_by_key(|(idx, _)| *idx);
    let mut offset = 0;
    for (idx, rec) in annotations {
        let pos = idx + 1 + offset;
        group.items.insert(pos, rec);
        offset += 1;
    }
}
