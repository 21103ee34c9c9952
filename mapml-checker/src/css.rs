//! The boundary with the CSS parser.
//!
//! The checker does not parse CSS. It hands `style` attribute values and
//! `<style>` element contents to a [`CssParser`] and maps the positions of the
//! returned diagnostics, which are relative to the CSS text, back onto the
//! host document.

use crate::locator::Locator;
use crate::sink::StartHint;

/// Error type the CSS parser uses for input it could not make sense of at all.
pub const UNRECOGNIZED: &str = "generator.unrecognize";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CssError {
    /// A syntax or value error tied to the CSS grammar.
    Parse {
        error_type: Option<String>,
        property: Option<String>,
        message: Option<String>,
    },
    /// Anything else the parser reports; only the message is known.
    Other(String),
}

/// One problem found by the CSS parser. Lines and columns are 1-based and
/// relative to the CSS text; a `begin_line` of 0 means the position is
/// unknown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CssDiagnostic {
    pub begin_line: u32,
    pub begin_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub error: CssError,
}

impl CssDiagnostic {
    pub fn property(&self) -> Option<&str> {
        match self.error {
            CssError::Parse { ref property, .. } => property.as_deref(),
            CssError::Other(_) => None,
        }
    }

    /// The message as shown to users, or `None` if the parser gave nothing
    /// worth showing.
    pub fn message(&self) -> Option<String> {
        let message = match self.error {
            CssError::Parse {
                ref error_type,
                ref property,
                ref message,
            } => {
                let css_message = match message {
                    Some(m) => m.as_str(),
                    None if error_type.as_deref() == Some(UNRECOGNIZED) => "Parse Error",
                    None => "",
                };
                if css_message.is_empty() {
                    return None;
                }
                match property {
                    Some(p) => format!("\u{201C}{p}\u{201D}: {css_message}."),
                    None => format!("{css_message}."),
                }
            }
            CssError::Other(ref m) => m.clone(),
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

pub trait CssParser {
    /// Parses the full contents of a `<style>` element.
    fn parse_stylesheet(&self, css: &str) -> Vec<CssDiagnostic>;

    /// Parses the value of a `style` attribute found on `line` of the
    /// document.
    fn parse_style_attribute(&self, css: &str, line: u32) -> Vec<CssDiagnostic>;
}

/// A [`CssParser`] that finds nothing wrong with any input.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoCss;

impl CssParser for NoCss {
    fn parse_stylesheet(&self, _css: &str) -> Vec<CssDiagnostic> {
        vec![]
    }

    fn parse_style_attribute(&self, _css: &str, _line: u32) -> Vec<CssDiagnostic> {
        vec![]
    }
}

/// A CSS problem positioned in the host document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PlacedCssError {
    pub message: String,
    pub locator: Locator,
    pub start: StartHint,
}

/// Places the diagnostics of a `<style>` element whose start tag ended at
/// `origin`. `line_offset` is 1 when a leading newline was removed from the
/// contents before parsing.
pub(crate) fn place_style_element_errors(
    diagnostics: &[CssDiagnostic],
    origin: &Locator,
    line_offset: u32,
    prefix: &str,
) -> Vec<PlacedCssError> {
    let mut placed = vec![];
    for d in diagnostics {
        let begin_line = d.begin_line + line_offset;
        if begin_line == 0 {
            continue;
        }
        let Some(message) = d.message() else {
            continue;
        };
        let end_line = d.end_line + line_offset;
        let column_offset = if d.begin_line == 1 && line_offset == 0 {
            origin.column
        } else {
            0
        };
        let locator = Locator {
            line: (origin.line + end_line).saturating_sub(1),
            column: d.end_column,
            ..origin.clone()
        };
        placed.push(PlacedCssError {
            message: format!("{prefix}{message}"),
            locator,
            start: StartHint {
                line: (origin.line + begin_line).saturating_sub(1),
                column: d.begin_column,
                column_offset,
            },
        });
    }
    placed
}
