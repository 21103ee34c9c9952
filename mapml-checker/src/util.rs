//! String helpers shared by the start- and end-element rules.
//!
//! Whitespace throughout MapML attribute processing is the HTML set of ASCII
//! whitespace characters, not Unicode whitespace, so `str::trim()` and
//! `str::split_whitespace()` are deliberately not used here.

use crate::tables::VARIABLE_NAME_RE;

pub(crate) fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0c' | '\r')
}

/// Compares two strings, folding only `A`-`Z` to lower case.
pub fn equals_ignore_ascii_case(one: &str, other: &str) -> bool {
    if one.len() != other.len() {
        return false;
    }
    one.bytes()
        .zip(other.bytes())
        .all(|(a, b)| a.to_ascii_lowercase() == b.to_ascii_lowercase())
}

pub fn trim_spaces(s: &str) -> &str {
    s.trim_matches(is_space)
}

/// Splits an attribute value into its space-separated tokens, skipping the
/// empty tokens produced by leading, trailing or repeated separators.
pub fn split_on_spaces(s: &str) -> impl Iterator<Item = &str> {
    s.split(is_space).filter(|t| !t.is_empty())
}

/// Extracts each `{name}` variable of a URI template, in order of appearance.
///
/// A variable may not contain `/`, so `{a/b}` is not a variable while the
/// shortest match wins for `{a}{b}`.
pub fn template_variables(template: &str) -> impl Iterator<Item = &str> {
    VARIABLE_NAME_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Renders a list of keywords for a message, e.g. `“a”, “b”, or “c”`.
pub fn render_type_list(types: &[&str]) -> String {
    let mut out = String::new();
    let len = types.len();
    for (i, t) in types.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
            if i == len - 1 {
                out.push_str("or ");
            }
        }
        out.push('\u{201C}');
        out.push_str(t);
        out.push('\u{201D}');
    }
    out
}

/// Parses a floating point attribute value the way the host checker family
/// does: anything unparsable (or absent) becomes NaN, which compares false
/// against every bound and so switches off the rule that wanted the number.
pub fn parse_double(value: Option<&str>) -> f64 {
    value
        .and_then(|v| trim_spaces(v).parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}
