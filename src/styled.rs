//! A string that carries per-position style metadata (fg/bg/bold), able to
//! round-trip through ANSI SGR escape sequences.
//!
//! This is the "styled string" primitive other stages build records out of.
//! Indices are codepoint offsets, not byte offsets.

use std::ops::Range;

use anstyle::{Ansi256Color, Color, Effects, RgbColor, Style};
use anstyle_parse::{Params, Parser, Perform};

use crate::error::DiffMoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagName {
    Fg,
    Bg,
    FgIndex,
    BgIndex,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagValue {
    Rgb(u8, u8, u8),
    Index(u8),
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExtent {
    pub start: usize,
    pub end: usize,
    pub name: TagName,
    pub value: TagValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledString {
    chars: Vec<char>,
    tags: Vec<TagExtent>,
}

impl StyledString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plain(s: &str) -> Self {
        StyledString {
            chars: s.chars().collect(),
            tags: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn tags(&self) -> &[TagExtent] {
        &self.tags
    }

    pub fn to_plain_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Apply a tag over `range` (codepoint offsets, end-exclusive). Ranges
    /// outside the string are clamped.
    pub fn apply_tag(&mut self, range: Range<usize>, name: TagName, value: TagValue) {
        let start = range.start.min(self.chars.len());
        let end = range.end.min(self.chars.len());
        if start >= end {
            return;
        }
        self.tags.push(TagExtent {
            start,
            end,
            name,
            value,
        });
    }

    /// A codepoint-range slice, tags clipped and re-based to the new start.
    pub fn substring(&self, range: Range<usize>) -> StyledString {
        let start = range.start.min(self.chars.len());
        let end = range.end.min(self.chars.len()).max(start);
        let chars = self.chars[start..end].to_vec();
        let tags = self
            .tags
            .iter()
            .filter_map(|t| {
                let s = t.start.max(start);
                let e = t.end.min(end);
                if s < e {
                    Some(TagExtent {
                        start: s - start,
                        end: e - start,
                        name: t.name,
                        value: t.value,
                    })
                } else {
                    None
                }
            })
            .collect();
        StyledString { chars, tags }
    }

    /// Append `other` after `self`, shifting its tag offsets.
    pub fn concat(mut self, other: &StyledString) -> StyledString {
        let offset = self.chars.len();
        self.chars.extend_from_slice(&other.chars);
        self.tags
            .extend(other.tags.iter().cloned().map(|mut t| {
                t.start += offset;
                t.end += offset;
                t
            }));
        self
    }

    /// Find whether `name` is tagged at codepoint position `pos`, returning
    /// the tag's value if so.
    pub fn tag_at(&self, pos: usize, name: TagName) -> Option<TagValue> {
        self.tags
            .iter()
            .rev()
            .find(|t| t.name == name && t.start <= pos && pos < t.end)
            .map(|t| t.value)
    }

    /// Strip all tags, keeping the text.
    pub fn strip_style(&self) -> StyledString {
        StyledString {
            chars: self.chars.clone(),
            tags: Vec::new(),
        }
    }

    /// Parse a raw line (already tab-expanded) into a styled string. SGR
    /// sequences become tags; any other recognized escape (cursor movement,
    /// OSC title-setting, single-char ESC commands) is a "known fallback
    /// shape" and causes the whole line to fall back to stripped plain text,
    /// per spec. A DCS sequence is the one case this crate treats as
    /// genuinely unrecoverable.
    pub fn parse_ansi(s: &str, line_number: usize) -> Result<StyledString, DiffMoveError> {
        if !s.contains('\u{1b}') {
            return Ok(StyledString::from_plain(s));
        }

        let mut performer = AnsiBuilder::default();
        let mut parser = Parser::<anstyle_parse::Utf8Parser>::new();
        for byte in s.as_bytes() {
            parser.advance(&mut performer, *byte);
        }
        performer.finish();

        if performer.fatal {
            return Err(DiffMoveError::ParseSgrNonrecoverable {
                line_number,
                detail: "unterminated device-control sequence".to_string(),
            });
        }

        if performer.fallback {
            return Ok(StyledString::from_plain(
                &performer.chars.into_iter().collect::<String>(),
            ));
        }

        Ok(StyledString {
            chars: performer.chars,
            tags: performer.tags,
        })
    }

    /// Render back to a string carrying ANSI SGR escapes reproducing the tags.
    pub fn render_ansi(&self) -> String {
        let mut out = String::new();
        let mut prev: Option<Style> = None;
        for (i, c) in self.chars.iter().enumerate() {
            let style = self.style_at(i);
            if prev != Some(style) {
                if prev.is_some() {
                    out.push_str("\x1b[0m");
                }
                if style != Style::new() {
                    out.push_str(&style.to_string());
                }
                prev = Some(style);
            }
            out.push(*c);
        }
        if prev.is_some() && prev != Some(Style::new()) {
            out.push_str("\x1b[0m");
        }
        out
    }

    fn style_at(&self, pos: usize) -> Style {
        let mut style = Style::new();
        if let Some(v) = self.tag_at(pos, TagName::Fg) {
            style = style.fg_color(Some(tag_value_to_color(v)));
        } else if let Some(v) = self.tag_at(pos, TagName::FgIndex) {
            style = style.fg_color(Some(tag_value_to_color(v)));
        }
        if let Some(v) = self.tag_at(pos, TagName::Bg) {
            style = style.bg_color(Some(tag_value_to_color(v)));
        } else if let Some(v) = self.tag_at(pos, TagName::BgIndex) {
            style = style.bg_color(Some(tag_value_to_color(v)));
        }
        if self.tag_at(pos, TagName::Bold).is_some() {
            style = style.effects(Effects::BOLD);
        }
        style
    }
}

fn tag_value_to_color(v: TagValue) -> Color {
    match v {
        TagValue::Rgb(r, g, b) => Color::Rgb(RgbColor(r, g, b)),
        TagValue::Index(n) => Color::Ansi256(Ansi256Color(n)),
        TagValue::Flag => Color::Ansi256(Ansi256Color(0)),
    }
}

/// Expand tabs to spaces on 8-column stops, treating ANSI escape sequences
/// as zero-width so they don't perturb the visible column count.
pub fn expand_tabs_ansi_aware(s: &str) -> String {
    use unicode_width::UnicodeWidthChar;

    const TAB_STOP: usize = 8;
    let mut out = String::with_capacity(s.len());
    let mut col = 0usize;
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            out.push(c);
            // Copy the escape sequence through untouched; don't count it.
            match chars.peek() {
                Some('[') => {
                    out.push(chars.next().unwrap());
                    for c2 in chars.by_ref() {
                        out.push(c2);
                        if c2.is_ascii_alphabetic() || c2 == '@' || c2 == '~' {
                            break;
                        }
                    }
                }
                Some(']') => {
                    out.push(chars.next().unwrap());
                    for c2 in chars.by_ref() {
                        out.push(c2);
                        if c2 == '\u{7}' {
                            break;
                        }
                    }
                }
                _ => {
                    if let Some(c2) = chars.next() {
                        out.push(c2);
                    }
                }
            }
            continue;
        }
        if c == '\t' {
            let next_stop = (col / TAB_STOP + 1) * TAB_STOP;
            let spaces = next_stop - col;
            out.extend(std::iter::repeat_n(' ', spaces));
            col = next_stop;
        } else {
            out.push(c);
            col += c.width().unwrap_or(0);
        }
    }

    out
}

#[derive(Default)]
struct AnsiBuilder {
    chars: Vec<char>,
    tags: Vec<TagExtent>,
    run_start: usize,
    fg: Option<TagValue>,
    bg: Option<TagValue>,
    bold: bool,
    fallback: bool,
    fatal: bool,
}

impl AnsiBuilder {
    fn close_run(&mut self) {
        let end = self.chars.len();
        if self.run_start >= end {
            self.run_start = end;
            return;
        }
        if let Some(v) = self.fg {
            let name = if matches!(v, TagValue::Index(_)) {
                TagName::FgIndex
            } else {
                TagName::Fg
            };
            self.tags.push(TagExtent {
                start: self.run_start,
                end,
                name,
                value: v,
            });
        }
        if let Some(v) = self.bg {
            let name = if matches!(v, TagValue::Index(_)) {
                TagName::BgIndex
            } else {
                TagName::Bg
            };
            self.tags.push(TagExtent {
                start: self.run_start,
                end,
                name,
                value: v,
            });
        }
        if self.bold {
            self.tags.push(TagExtent {
                start: self.run_start,
                end,
                name: TagName::Bold,
                value: TagValue::Flag,
            });
        }
        self.run_start = end;
    }

    fn finish(&mut self) {
        self.close_run();
    }

    fn apply_sgr(&mut self, params: &Params) {
        let flat: Vec<u16> = params
            .iter()
            .map(|sub| *sub.first().unwrap_or(&0))
            .collect();
        if flat.is_empty() {
            self.close_run();
            self.fg = None;
            self.bg = None;
            self.bold = false;
            return;
        }

        self.close_run();
        let mut i = 0;
        while i < flat.len() {
            match flat[i] {
                0 => {
                    self.fg = None;
                    self.bg = None;
                    self.bold = false;
                }
                1 => self.bold = true,
                22 => self.bold = false,
                n @ 30..=37 => self.fg = Some(TagValue::Index((n - 30) as u8)),
                38 => {
                    if let Some((value, consumed)) = read_extended_color(&flat[i + 1..]) {
                        self.fg = Some(value);
                        i += consumed;
                    }
                }
                39 => self.fg = None,
                n @ 40..=47 => self.bg = Some(TagValue::Index((n - 40) as u8)),
                48 => {
                    if let Some((value, consumed)) = read_extended_color(&flat[i + 1..]) {
                        self.bg = Some(value);
                        i += consumed;
                    }
                }
                49 => self.bg = None,
                n @ 90..=97 => self.fg = Some(TagValue::Index((8 + n - 90) as u8)),
                n @ 100..=107 => self.bg = Some(TagValue::Index((8 + n - 100) as u8)),
                _ => {}
            }
            i += 1;
        }
    }
}

/// Parses `5;N` (indexed) or `2;r;g;b` (truecolor) following a 38/48 code.
/// Returns the value and how many extra params were consumed.
fn read_extended_color(rest: &[u16]) -> Option<(TagValue, usize)> {
    match rest.first() {
        Some(5) => rest.get(1).map(|n| (TagValue::Index(*n as u8), 2)),
        Some(2) => {
            if rest.len() >= 4 {
                Some((
                    TagValue::Rgb(rest[1] as u8, rest[2] as u8, rest[3] as u8),
                    4,
                ))
            } else {
                None
            }
        }
        _ => None,
    }
}

impl Perform for AnsiBuilder {
    fn print(&mut self, c: char) {
        self.chars.push(c);
    }

    fn execute(&mut self, _byte: u8) {}

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _c: u8) {
        self.fatal = true;
    }

    fn put(&mut self, _byte: u8) {
        self.fatal = true;
    }

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {
        self.fallback = true;
    }

    fn csi_dispatch(&mut self, params: &Params, _intermediates: &[u8], _ignore: bool, c: u8) {
        if c == b'm' {
            self.apply_sgr(params);
        } else {
            self.fallback = true;
        }
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {
        self.fallback = true;
    }
}
