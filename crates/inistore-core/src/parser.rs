//! INI line parser
//!
//! Handles the dialect accepted by inistore:
//! - `; comment` to end of line (a `;` inside a trailing `"quoted"` value is kept)
//! - `[Section]` headers, stored with their brackets
//! - `key=value` pairs split on the first `=`, both sides trimmed
//! - blank lines ignored
//!
//! There is no escaping for `=`, `[`, `]` or `;`.

use crate::diagnostics::DiagnosticSink;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::store::{OverridePolicy, Store, DEFAULT_SECTION};

/// A classified, comment-free line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Nothing left after comment stripping
    Blank,
    /// `[Section]` header, trimmed
    Header(&'a str),
    /// `key=value`, both trimmed
    Pair { key: &'a str, value: &'a str },
    /// `=value` with no key
    EmptyKey,
    /// Neither a header nor a pair
    Malformed,
}

/// Counters for one parse run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines kept in the raw text log
    pub lines: usize,
    /// Key/value pairs stored
    pub pairs: usize,
    /// Lines skipped with a diagnostic
    pub skipped: usize,
}

/// Truncate a line at its comment marker
///
/// The first `;` starts the comment. When the line contains a `"` and that
/// `;` sits before the last quote, the first `;` after the last quote is used
/// instead, and if there is none the line is kept whole. Only a single
/// trailing quoted field is handled; multiple or unbalanced quotes are
/// best-effort.
pub fn strip_comment(line: &str) -> &str {
    let Some(first) = line.find(';') else {
        return line;
    };

    let cut = match line.rfind('"') {
        Some(quote) if first < quote => match line[quote + 1..].find(';') {
            Some(offset) => quote + 1 + offset,
            None => return line,
        },
        _ => first,
    };

    &line[..cut]
}

/// Classify a line that has already had its comment stripped
pub fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }

    if trimmed.starts_with('[') {
        return Line::Header(trimmed);
    }

    match trimmed.split_once('=') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                Line::EmptyKey
            } else {
                Line::Pair {
                    key,
                    value: value.trim(),
                }
            }
        }
        None => Line::Malformed,
    }
}

/// Parse INI text into `store`
///
/// `[Default]` is created (or resumed) before the first line so pairs that
/// precede any header have a home. Headers already present in the store are
/// resumed rather than duplicated. Problem lines are reported to `sink` and
/// skipped. A leading UTF-8 byte-order mark is ignored.
pub fn parse_into(
    store: &mut Store,
    text: &str,
    policy: OverridePolicy,
    sink: &dyn DiagnosticSink,
) -> ParseStats {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut stats = ParseStats::default();
    let mut current = DEFAULT_SECTION.to_string();
    store.section_mut_or_insert(&current);

    for (idx, raw) in text.lines().enumerate() {
        let line = strip_comment(raw);

        let parsed = classify(line);
        if parsed == Line::Blank {
            continue;
        }

        store.push_raw_line(line);
        stats.lines += 1;

        match parsed {
            Line::Blank => {}
            Line::Header(name) => {
                store.section_mut_or_insert(name);
                current = name.to_string();
            }
            Line::Pair { key, value } => {
                store.section_mut_or_insert(&current).set(key, value, policy);
                stats.pairs += 1;
            }
            Line::EmptyKey => {
                stats.skipped += 1;
                sink.report(&Diagnostic::now(DiagnosticKind::EmptyKey {
                    line_number: idx + 1,
                    text: line.to_string(),
                }));
            }
            Line::Malformed => {
                stats.skipped += 1;
                sink.report(&Diagnostic::now(DiagnosticKind::MalformedLine {
                    line_number: idx + 1,
                    text: line.to_string(),
                }));
            }
        }
    }

    stats
}

/// Parse INI text into a fresh store
pub fn parse_str(text: &str, policy: OverridePolicy, sink: &dyn DiagnosticSink) -> Store {
    let mut store = Store::new();
    parse_into(&mut store, text, policy, sink);
    store
}
