//! parse::split
//!
//! Decompose one raw instruction into ordered segments.
//!
//! Splitting happens in four passes:
//! 1. Newlines and `;` always split.
//! 2. The connectors `and`, `then`, `and then` and `, then` split only when
//!    the text after them starts with a command verb, so "80 and 120 mm"
//!    stays whole.
//! 3. `with` splits when a hole, fillet or chamfer follows within a few
//!    words, so "a plate with a 2mm fillet" becomes two operations while
//!    "a plate with added ribs" stays whole.
//! 4. A segment that starts with a leading verb (`create`, `make`, `add`,
//!    `drill`, `build`) is split again where that same verb recurs. A
//!    different verb inside the clause ("add 4 holes to make a bolt
//!    circle") does not split.
//!
//! Empty segments are dropped; order is preserved.
//!
//! # Example
//!
//! ```
//! use textcad::parse::split::split_instruction;
//!
//! let segments = split_instruction(
//!     "create base plate 120x80x6 mm and add 4 holes diameter 6mm",
//! );
//! assert_eq!(segments, vec!["create base plate 120x80x6 mm", "add 4 holes diameter 6mm"]);
//! ```

use regex::Regex;
use std::sync::LazyLock;

/// Verbs that start a new command after a connector.
pub const COMMAND_VERBS: &[&str] = &[
    "create", "make", "add", "drill", "build", "extrude", "fillet", "chamfer", "round", "bevel",
    "cut", "pattern", "place", "put", "insert",
];

/// Verbs whose repetition inside one segment starts a new segment.
pub const LEADING_VERBS: &[&str] = &["create", "make", "add", "drill", "build"];

static CONNECTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,?\s*\b(?:and\s+then|and|then)\b\s+").unwrap());

static LEADING_VERB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:create|make|add|drill|build)\b").unwrap());

static WITH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+\bwith\b\s+").unwrap());

static FEATURE_AHEAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:an?\s+)?(?:[\w.-]+\s+){0,3}?(?:holes?|fillets?|chamfers?)\b").unwrap()
});

/// Split an instruction into its non-empty command segments.
pub fn split_instruction(text: &str) -> Vec<String> {
    text.split(['\n', ';'])
        .flat_map(split_on_connectors)
        .flat_map(|segment| split_on_with_feature(&segment))
        .flat_map(|segment| split_on_repeated_verb(&segment))
        .map(|segment| clean(&segment))
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn split_on_connectors(piece: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;

    for m in CONNECTOR_RE.find_iter(piece) {
        if starts_with_command_verb(&piece[m.end()..]) {
            segments.push(piece[start..m.start()].to_string());
            start = m.end();
        }
    }
    segments.push(piece[start..].to_string());
    segments
}

fn split_on_with_feature(segment: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut start = 0;

    for m in WITH_RE.find_iter(segment) {
        if m.start() > start && FEATURE_AHEAD_RE.is_match(&segment[m.end()..]) {
            segments.push(segment[start..m.start()].to_string());
            start = m.end();
        }
    }
    segments.push(segment[start..].to_string());
    segments
}

fn split_on_repeated_verb(segment: &str) -> Vec<String> {
    let trimmed = segment.trim_start();
    let leading = first_word(trimmed);
    if !LEADING_VERBS.contains(&leading.as_str()) {
        return vec![segment.to_string()];
    }

    let mut segments = Vec::new();
    let mut start = 0;
    for m in LEADING_VERB_RE.find_iter(trimmed) {
        if m.start() == 0 || !m.as_str().eq_ignore_ascii_case(&leading) {
            continue;
        }
        segments.push(trimmed[start..m.start()].to_string());
        start = m.start();
    }
    segments.push(trimmed[start..].to_string());
    segments
}

/// True when `text` begins with a command verb as a whole word.
pub fn starts_with_command_verb(text: &str) -> bool {
    starts_with_any(text.trim_start(), COMMAND_VERBS)
}

fn starts_with_any(text: &str, verbs: &[&str]) -> bool {
    verbs.contains(&first_word(text).as_str())
}

fn first_word(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn clean(segment: &str) -> String {
    segment
        .trim()
        .trim_end_matches(['.', ',', '!'])
        .trim()
        .to_string()
}
