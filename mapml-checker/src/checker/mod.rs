//! The assertion engine.
//!
//! A [`Checker`] is fed the events of one document at a time, in order, and
//! reports what it finds to its [`DiagnosticSink`] as soon as each rule can be
//! decided. Rules that need a whole subtree run when the element ends; rules
//! about references run when the owning scope (an `<extent>`, or the
//! document) ends.

mod end;
mod start;

use crate::css::{CssParser, NoCss};
use crate::locator::Locator;
use crate::registry::Registries;
use crate::sink::DiagnosticSink;
use crate::stack::ElementStack;
use crate::tables::USE_COUNTER_PREFIX;
use fnv::{FnvHashMap, FnvHashSet};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckerConfig {
    /// The document being checked is itself a stylesheet, so CSS messages
    /// don't need to say they are about CSS.
    pub source_is_css: bool,
}

pub struct Checker<S> {
    sink: S,
    css: Box<dyn CssParser>,
    config: CheckerConfig,
    stack: ElementStack,
    registries: Registries,
    /// Depth of each open element with an `aria-activedescendant` that no
    /// descendant has matched yet, and where the attribute was.
    open_active_descendants: FnvHashMap<usize, Locator>,
    /// Depth of each open `<select>` without `multiple`.
    open_single_selects: FnvHashSet<usize>,
}

impl<S: DiagnosticSink> Checker<S> {
    pub fn new(sink: S, config: CheckerConfig) -> Checker<S> {
        Checker {
            sink,
            css: Box::new(NoCss),
            config,
            stack: ElementStack::default(),
            registries: Registries::default(),
            open_active_descendants: FnvHashMap::default(),
            open_single_selects: FnvHashSet::default(),
        }
    }

    pub fn with_css_parser(mut self, css: Box<dyn CssParser>) -> Checker<S> {
        self.css = css;
        self
    }

    pub fn set_source_is_css(&mut self, source_is_css: bool) {
        self.config.source_is_css = source_is_css;
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn start_document(&mut self) {
        debug!("start document");
        self.reset();
        self.stack.clear();
    }

    /// Character data of the current element. Only kept for elements whose
    /// text some rule needs.
    pub fn characters(&mut self, text: &str) {
        if let Some(frame) = self.stack.peek_mut() {
            if frame.is_collecting_characters {
                frame.text_content.push_str(text);
            }
        }
    }

    pub fn end_document(&mut self) {
        debug!(
            self_styles = self.registries.self_styles.len(),
            label_refs = self.registries.form_controls.pending_len(),
            form_refs = self.registries.form_elements.pending_len(),
            list_refs = self.registries.lists.pending_len(),
            "end document"
        );
        let self_styles = std::mem::take(&mut self.registries.self_styles);
        if self_styles.len() > 1 {
            for locator in &self_styles {
                self.err(
                    "A document may contain only one \u{201C}link\u{201D} element with a \
                     \u{201C}rel\u{201D} attribute value of \u{201C}self style\u{201D} or \
                     \u{201C}style self\u{201D}."
                        .to_string(),
                    locator,
                );
            }
        }
        for r in self.registries.form_controls.drain_unresolved() {
            self.err(
                "The value of the \u{201C}for\u{201D} attribute of the \u{201C}label\u{201D} \
                 element must be the ID of a non-hidden form control."
                    .to_string(),
                &r.locator,
            );
        }
        for r in self.registries.form_elements.drain_unresolved() {
            self.err(
                "The \u{201C}form\u{201D} attribute must refer to a form element.".to_string(),
                &r.locator,
            );
        }
        for r in self.registries.lists.drain_unresolved() {
            self.err(
                "The \u{201C}list\u{201D} attribute of the \u{201C}input\u{201D} element must \
                 refer to a \u{201C}datalist\u{201D} element."
                    .to_string(),
                &r.locator,
            );
        }
        self.reset();
        self.stack.clear();
    }

    /// Forgets everything about the current document, so the instance can
    /// be used for another one.
    pub fn reset(&mut self) {
        self.registries.clear();
        self.open_active_descendants.clear();
        self.open_single_selects.clear();
    }

    fn err(&mut self, message: String, locator: &Locator) {
        self.sink.error(message, locator)
    }

    fn warn(&mut self, message: String, locator: &Locator) {
        self.sink.warning(message, locator)
    }

    fn increment_use_counter(&mut self, name: &str) {
        self.sink
            .use_counter(&format!("{USE_COUNTER_PREFIX}{name}"));
    }
}

#[cfg(test)]
mod tests;
