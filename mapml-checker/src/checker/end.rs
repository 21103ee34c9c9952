use super::Checker;
use crate::css::place_style_element_errors;
use crate::locator::Locator;
use crate::sink::DiagnosticSink;
use crate::stack::Frame;
use crate::tables::{COORDINATE_SYSTEM_AXES, STYLE_ELEMENT_ERRORS_FOUND, XHTML_NAMESPACE_URI};
use crate::util::trim_spaces;
use tracing::{debug, trace, warn};

impl<S: DiagnosticSink> Checker<S> {
    pub fn end_element(&mut self, locator: &Locator, uri: &str, local_name: &str) {
        trace!(local_name, %locator, "end element");
        let Some(node) = self.stack.pop() else {
            warn!(local_name, "end element without a matching start");
            return;
        };
        let depth = self.stack.depth();
        if uri == XHTML_NAMESPACE_URI {
            match local_name {
                "select" if node.option_needed => self.end_required_select(locator, &node),
                "option" => self.end_option(&node),
                "style" => self.end_style(&node),
                "extent" => self.end_extent(locator, &node),
                _ => {}
            }
        }
        self.open_single_selects.remove(&depth);
        if let Some(at) = self.open_active_descendants.remove(&depth) {
            self.warn(
                "Attribute \u{201C}aria-activedescendant\u{201D} value should either refer to \
                 a descendant element, or should be accompanied by attribute \
                 \u{201C}aria-owns\u{201D}."
                    .to_string(),
                &at,
            );
        }
    }

    fn end_required_select(&mut self, locator: &Locator, node: &Frame) {
        if !node.option_found {
            self.err(
                "A \u{201C}select\u{201D} element with a \u{201C}required\u{201D} attribute, and \
                 without a \u{201C}multiple\u{201D} attribute, and without a \u{201C}size\u{201D} \
                 attribute whose value is greater than \u{201C}1\u{201D}, must have a child \
                 \u{201C}option\u{201D} element."
                    .to_string(),
                locator,
            );
        }
        if let Some(ref option) = node.non_empty_option {
            self.err(
                "The first child \u{201C}option\u{201D} element of a \u{201C}select\u{201D} \
                 element with a \u{201C}required\u{201D} attribute, and without a \
                 \u{201C}multiple\u{201D} attribute, and without a \u{201C}size\u{201D} attribute \
                 whose value is greater than \u{201C}1\u{201D}, must have either an empty \
                 \u{201C}value\u{201D} attribute, or must have no text content. Consider either \
                 adding a placeholder option label, or adding a \u{201C}size\u{201D} attribute \
                 with a value equal to the number of \u{201C}option\u{201D} elements."
                    .to_string(),
                option,
            );
        }
    }

    fn end_option(&mut self, node: &Frame) {
        let Some(parent) = self.stack.peek_mut() else {
            return;
        };
        if parent.option_found {
            return;
        }
        // The first option without a `value` is a placeholder only if it has
        // no text; the option's own start tag has no way to know that.
        if node.is_collecting_characters
            && parent.no_value_option_found
            && !trim_spaces(&node.text_content).is_empty()
        {
            parent.non_empty_option = Some(node.locator.clone());
        }
        parent.option_found = true;
    }

    fn end_style(&mut self, node: &Frame) {
        let (line_offset, css) = match node.text_content.strip_prefix('\n') {
            Some(rest) => (1, rest),
            None => (0, node.text_content.as_str()),
        };
        let diagnostics = self.css.parse_stylesheet(css);
        if !diagnostics.is_empty() {
            self.increment_use_counter(STYLE_ELEMENT_ERRORS_FOUND);
        }
        let prefix = if self.config.source_is_css {
            ""
        } else {
            "CSS: "
        };
        let placed = place_style_element_errors(&diagnostics, &node.locator, line_offset, prefix);
        let hinted = self.sink.accepts_start_hint();
        for p in placed {
            if hinted {
                self.sink.error_with_start(p.message, &p.locator, p.start);
            } else {
                self.err(p.message, &p.locator);
            }
        }
    }

    fn end_extent(&mut self, locator: &Locator, node: &Frame) {
        if !node.zoom_found {
            self.err(
                "An \u{201C}extent\u{201D} element must have a child \u{201C}input\u{201D} \
                 element with \u{201C}type\u{201D} attribute value of \u{201C}zoom\u{201D}."
                    .to_string(),
                locator,
            );
        }
        if node.axes_found.is_empty() {
            self.err(
                "An \u{201C}extent\u{201D} element must have child \u{201C}input\u{201D} \
                 elements with \u{201C}type\u{201D} attribute value of \
                 \u{201C}location\u{201D}."
                    .to_string(),
                locator,
            );
        } else {
            for (cs, axes) in COORDINATE_SYSTEM_AXES {
                let Some(found) = node.axes_found.get(*cs) else {
                    continue;
                };
                if !found.is_empty() && !axes.iter().all(|a| found.contains(*a)) {
                    self.err(
                        "An \u{201C}extent\u{201D} element must contain complementary pairs of \
                         \u{201C}input\u{201D} elements whose \u{201C}type\u{201D} attribute \
                         equals \u{201C}location\u{201D} and which share a \u{201C}units\u{201D} \
                         attribute value (coordinate system)."
                            .to_string(),
                        locator,
                    );
                }
            }
        }
        if node.has_action && node.templated_link_found {
            self.warn(
                "An \u{201C}extent\u{201D} element that has an \u{201C}action\u{201D} attribute \
                 should not have child \u{201C}link\u{201D} element(s) with \u{201C}rel\u{201D} \
                 attribute values including \u{201C}tile\u{201D}, \u{201C}image\u{201D} or \
                 \u{201C}features\u{201D}."
                    .to_string(),
                locator,
            );
        }
        // Extents can't nest, so the variables seen since the last
        // `</extent>` all belong to this one.
        let variables = &mut self.registries.template_variables;
        let unresolved = variables.drain_unresolved();
        variables.clear();
        debug!(unresolved = unresolved.len(), "template variables drained");
        for r in unresolved {
            self.err(
                format!(
                    "\u{201C}link\u{201D} element \u{201C}tref\u{201D} attribute template \
                     variables must each be associated to a unique \u{201C}input\u{201D} \
                     element \u{201C}name\u{201D} attribute. {}",
                    r.additional.as_deref().unwrap_or_default()
                ),
                &r.locator,
            );
        }
    }
}
