//! Rendering of checker diagnostics with `codemap-diagnostic`, so they print
//! the same way as [`crate::reader::ReaderError`]s.

use crate::sink::{Diagnostic, Level};
use codemap::{CodeMap, File, Span};
use codemap_diagnostic::{SpanLabel, SpanStyle};

/// Byte offset of a 1-based line and column, clamped to the file.
fn offset_of(file: &File, line: u32, column: u32) -> Option<u64> {
    let index = (line as usize).checked_sub(1)?;
    if index >= file.num_lines() {
        return None;
    }
    let text = file.source_line(index);
    let skip = (column as usize).saturating_sub(1);
    let within = text
        .char_indices()
        .nth(skip)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let line_start = file.line_span(index).low() - file.span.low();
    Some(line_start + within as u64)
}

/// Locators point just past the construct they describe, so the highlighted
/// range ends there; it starts at the hint when there is one, otherwise one
/// character earlier.
fn span_of(file: &File, d: &Diagnostic) -> Option<Span> {
    let end = offset_of(file, d.locator.line, d.locator.column)?;
    let start = match d.start {
        Some(hint) => offset_of(file, hint.line, hint.column + hint.column_offset)
            .filter(|s| *s <= end)
            .unwrap_or(end),
        None => {
            let before = &file.source()[..end as usize];
            end - before.chars().next_back().map_or(0, |c| c.len_utf8() as u64)
        }
    };
    Some(file.span.subspan(start, end))
}

pub fn diagnostics(
    name: String,
    source: String,
    found: &[Diagnostic],
) -> (CodeMap, Vec<codemap_diagnostic::Diagnostic>) {
    let mut map = CodeMap::new();
    let file = map.add_file(name, source);
    let rendered = found
        .iter()
        .map(|d| codemap_diagnostic::Diagnostic {
            level: match d.level {
                Level::Error => codemap_diagnostic::Level::Error,
                Level::Warning => codemap_diagnostic::Level::Warning,
            },
            message: d.message.clone(),
            code: None,
            spans: span_of(&file, d)
                .map(|span| SpanLabel {
                    span,
                    label: None,
                    style: SpanStyle::Primary,
                })
                .into_iter()
                .collect(),
        })
        .collect();
    (map, rendered)
}
