//! Where diagnostics go.
//!
//! The checker never stores what it reports; every message is handed to a
//! [`DiagnosticSink`] owned by the host as soon as the rule fires.

use crate::locator::Locator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
    Warning,
}

/// Start of the source range an error covers, for sinks able to highlight a
/// range rather than a single point. `column_offset` is added to `column` by
/// the sink when the range starts on the first line of an embedded
/// stylesheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StartHint {
    pub line: u32,
    pub column: u32,
    pub column_offset: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub locator: Locator,
    pub start: Option<StartHint>,
}

pub trait DiagnosticSink {
    fn error(&mut self, message: String, locator: &Locator);

    fn warning(&mut self, message: String, locator: &Locator);

    /// Whether [`DiagnosticSink::error_with_start`] does anything more than
    /// [`DiagnosticSink::error`].
    fn accepts_start_hint(&self) -> bool {
        false
    }

    fn error_with_start(&mut self, message: String, locator: &Locator, _start: StartHint) {
        self.error(message, locator)
    }

    /// Records that some observable condition happened while checking this
    /// document. `property` is the full property URI.
    fn use_counter(&mut self, _property: &str) {}
}

/// A sink that keeps everything it is given, in order.
#[derive(Clone, Debug, Default)]
pub struct Collector {
    pub diagnostics: Vec<Diagnostic>,
    pub use_counters: Vec<String>,
    start_hints: bool,
}

impl Collector {
    pub fn new() -> Collector {
        Collector::default()
    }

    /// A collector that keeps start hints for range-capable output.
    pub fn with_start_hints() -> Collector {
        Collector {
            start_hints: true,
            ..Collector::default()
        }
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.use_counters.clear();
    }
}

impl DiagnosticSink for Collector {
    fn error(&mut self, message: String, locator: &Locator) {
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            message,
            locator: locator.clone(),
            start: None,
        });
    }

    fn warning(&mut self, message: String, locator: &Locator) {
        self.diagnostics.push(Diagnostic {
            level: Level::Warning,
            message,
            locator: locator.clone(),
            start: None,
        });
    }

    fn accepts_start_hint(&self) -> bool {
        self.start_hints
    }

    fn error_with_start(&mut self, message: String, locator: &Locator, start: StartHint) {
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            message,
            locator: locator.clone(),
            start: Some(start),
        });
    }

    fn use_counter(&mut self, property: &str) {
        if !self.use_counters.iter().any(|p| p == property) {
            self.use_counters.push(property.to_string());
        }
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn error(&mut self, message: String, locator: &Locator) {
        (**self).error(message, locator)
    }

    fn warning(&mut self, message: String, locator: &Locator) {
        (**self).warning(message, locator)
    }

    fn accepts_start_hint(&self) -> bool {
        (**self).accepts_start_hint()
    }

    fn error_with_start(&mut self, message: String, locator: &Locator, start: StartHint) {
        (**self).error_with_start(message, locator, start)
    }

    fn use_counter(&mut self, property: &str) {
        (**self).use_counter(property)
    }
}
