//! Row extraction for Nairi drop announcements.
//!
//! Nairi posts one row per card, fields separated by the broken-bar glyph
//! `¦` (U+00A6), numbers usually wrapped in inline code and surrounded by
//! custom emoji shortcodes:
//!
//! ```text
//! ` 20 ` :nwl_s: ¦ ` 150 ` ¦ **Aya Tanaka** · Show Title
//! ```
//!
//! The parser:
//! 1. Rejects lines without the delimiter (fast path, no allocation)
//! 2. Strips invisible characters and collapses whitespace
//! 3. Splits off the trailing label segment, if the line has one
//! 4. Takes backtick-wrapped numbers, or falls back to bare digit runs
//! 5. Uses the first number as `left` and the last one as `right`
//!
//! # Error Handling
//!
//! Nothing here returns an error. A line that cannot be read with confidence
//! yields `None` and is dropped: a missed alert is preferred over a false one.

use regex::Regex;
use std::sync::LazyLock;

/// Glyph separating the fields of a data row.
pub const ROW_DELIMITER: char = '¦';

/// Placeholder shown when a row carries no label.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Numbers longer than this are ids or timestamps, never row values.
const MAX_DIGITS: usize = 5;

/// Separators introducing a "· source" suffix after the label.
const LABEL_SEPARATORS: &[char] = &['·', '•', '・'];

/// Emphasis markers, longest first so `***x***` is not read as `*` + `**x**`.
const EMPHASIS_MARKERS: &[&str] = &["***", "**", "__", "*", "_"];

/// Stray quote and code characters left around a label.
const WRAPPING_CHARS: &[char] = &['`', '"', '\'', '“', '”', '‘', '’'];

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]*)`").expect("valid regex"));

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// One data row recovered from a message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// First number on the line.
    pub left: u32,
    /// Last number on the line, before any label text.
    pub right: u32,
    /// Free-text name attached to the row, when the format has one.
    pub label: Option<String>,
}

impl Row {
    /// Label for display, `Unknown` when the row has none.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }
}

/// Parse every line of a message, keeping rows in source order.
pub fn parse_message(text: &str) -> Vec<Row> {
    text.lines().filter_map(parse_row).collect()
}

/// Parse a single line into a [`Row`].
///
/// Returns `None` when the line has no `¦` or fewer than two numbers.
pub fn parse_row(line: &str) -> Option<Row> {
    if !line.contains(ROW_DELIMITER) {
        return None;
    }

    let normalized = normalize(line);
    let (values, label) = split_label(&normalized);

    // Label text never contributes numbers, even when values are short.
    let tokens = numeric_tokens(values);
    if tokens.len() < 2 {
        return None;
    }

    let left = tokens.first()?.parse::<u32>().ok()?;
    let right = tokens.last()?.parse::<u32>().ok()?;

    Some(Row { left, right, label })
}

/// Strip invisible characters, collapse whitespace runs and trim.
pub fn normalize(line: &str) -> String {
    let visible: String = line.chars().filter(|c| !is_invisible(*c)).collect();
    WHITESPACE_RUN.replace_all(&visible, " ").trim().to_string()
}

/// Clean a raw label segment.
///
/// Drops the "· source" suffix, emphasis markup fully wrapping the text and
/// stray quotes or backticks. An empty result is `None`.
pub fn extract_label(segment: &str) -> Option<String> {
    let mut label = segment.split(LABEL_SEPARATORS).next().unwrap_or("").trim();

    loop {
        let before = label;
        label = strip_emphasis(label).trim();
        label = label.trim_matches(WRAPPING_CHARS).trim();
        if label == before {
            break;
        }
    }

    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}' | '\u{00AD}' | '\u{180E}'
    )
}

/// Split a normalized line into its value part and its label.
///
/// The label is the last non-empty segment, provided there are at least two
/// segments and the last one is not itself a value.
fn split_label(line: &str) -> (&str, Option<String>) {
    let trimmed = line.trim_end_matches(|c: char| c == ROW_DELIMITER || c == ' ');
    let Some(idx) = trimmed.rfind(ROW_DELIMITER) else {
        return (line, None);
    };

    let head = &trimmed[..idx];
    let candidate = trimmed[idx + ROW_DELIMITER.len_utf8()..].trim();

    let head_is_empty = head
        .trim_matches(|c: char| c == ROW_DELIMITER || c == ' ')
        .is_empty();
    if head_is_empty || is_value_segment(candidate) {
        return (line, None);
    }

    (head, extract_label(candidate))
}

/// A segment holding a wrapped number, or nothing but digits, is a value.
fn is_value_segment(segment: &str) -> bool {
    let has_wrapped_number = CODE_SPAN
        .captures_iter(segment)
        .filter_map(|c| c.get(1))
        .any(|m| is_numeric_token(m.as_str().trim()));
    if has_wrapped_number {
        return true;
    }

    let bare: String = segment
        .chars()
        .filter(|c| *c != '`' && !c.is_whitespace())
        .collect();
    !bare.is_empty() && bare.chars().all(|c| c.is_ascii_digit())
}

/// Numbers in left-to-right order: backtick-wrapped first, bare as fallback.
fn numeric_tokens(text: &str) -> Vec<&str> {
    let wrapped: Vec<&str> = CODE_SPAN
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| is_numeric_token(s))
        .collect();

    if wrapped.len() >= 2 {
        return wrapped;
    }

    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| s.len() <= MAX_DIGITS)
        .collect()
}

fn is_numeric_token(s: &str) -> bool {
    !s.is_empty() && s.len() <= MAX_DIGITS && s.chars().all(|c| c.is_ascii_digit())
}

fn strip_emphasis(s: &str) -> &str {
    for marker in EMPHASIS_MARKERS {
        let m = marker.len();
        if s.len() > 2 * m && s.starts_with(marker) && s.ends_with(marker) {
            return &s[m..s.len() - m];
        }
    }
    s
}
