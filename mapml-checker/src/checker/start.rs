use super::Checker;
use crate::attributes::Attributes;
use crate::locator::Locator;
use crate::registry::IdrefLocator;
use crate::sink::DiagnosticSink;
use crate::stack::Frame;
use crate::tables::{
    ANCESTOR_MASK_BY_DESCENDANT, ATTRIBUTES_WITH_IMPLICIT_STATE_OR_PROPERTY,
    AXIS_TO_COORDINATE_SYSTEM, AncestorMask, FORM_ASSOCIATED_ELEMENTS, LABELABLE_ELEMENTS,
    STYLE_ATTRIBUTE_ERRORS_FOUND, SpecialAncestor, XHTML_NAMESPACE_URI, allowed_input_types,
    coordinate_system_axes, implicit_element_role, implicit_input_role,
};
use crate::util::{
    equals_ignore_ascii_case, parse_double, render_type_list, split_on_spaces, template_variables,
    trim_spaces,
};
use fnv::FnvHashSet;
use tracing::trace;

/// What the attribute scan of a start tag picked up for the element rules.
#[derive(Default)]
struct StartTag<'a> {
    tref: Option<&'a str>,
    list: Option<&'a str>,
    input_name: Option<&'a str>,
    role: Option<&'a str>,
    for_attr: Option<&'a str>,
    active_descendant: Option<&'a str>,
    has_action: bool,
    ids: FnvHashSet<String>,
}

/// What a `<link>` start tag means for its parent `<extent>`.
#[derive(Default)]
struct LinkKind {
    query: bool,
    templated_resource: bool,
}

impl<S: DiagnosticSink> Checker<S> {
    pub fn start_element(
        &mut self,
        locator: &Locator,
        uri: &str,
        local_name: &str,
        atts: &Attributes,
    ) {
        trace!(local_name, %locator, "start element");
        let (ancestor_mask, parent_name) = match self.stack.peek() {
            Some(parent) => (parent.child_mask(), parent.name.clone()),
            None => (AncestorMask::EMPTY, None),
        };
        if uri != XHTML_NAMESPACE_URI {
            self.stack
                .push(Frame::new(ancestor_mask, None, locator.clone()));
            return;
        }

        if let Some(prohibited) = ANCESTOR_MASK_BY_DESCENDANT.get(local_name) {
            for ancestor in ancestor_mask.intersection(*prohibited).iter() {
                self.err(
                    format!(
                        "The element \u{201C}{local_name}\u{201D} must not appear as a \
                         descendant of the \u{201C}{}\u{201D} element.",
                        ancestor.name()
                    ),
                    locator,
                );
            }
        }
        if local_name == "input" && !ancestor_mask.contains(SpecialAncestor::Extent) {
            self.err(
                "The \u{201C}input\u{201D} element must have a \u{201C}extent\u{201D} ancestor."
                    .to_string(),
                locator,
            );
        }

        let input_type = if local_name == "input" {
            Some(
                atts.get("", "type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string()),
            )
        } else {
            None
        };
        let tag = self.scan_attributes(locator, local_name, input_type.as_deref(), atts);

        if let Some(role) = tag.role {
            self.check_redundant_role(locator, local_name, input_type.as_deref(), role);
        }
        if let Some(ref input_type) = input_type {
            match input_type.as_str() {
                "zoom" => {
                    if let Some(parent) = self.stack.peek_mut() {
                        parent.zoom_found = true;
                    }
                }
                "location" => self.check_location_input(locator, atts),
                "hidden" if atts.contains("", "shard") => {
                    match tag.list {
                        Some(list) => self
                            .registries
                            .lists
                            .refer(IdrefLocator::new(locator.clone(), list)),
                        None => self.err(
                            "An \u{201C}input\u{201D} element with a \u{201C}shard\u{201D} \
                             attribute must have \u{201C}list\u{201D} attribute."
                                .to_string(),
                            locator,
                        ),
                    }
                    if atts.contains("", "value") {
                        self.err(
                            "An \u{201C}input\u{201D} element with a \u{201C}shard\u{201D} \
                             attribute must not have a \u{201C}value\u{201D} attribute."
                                .to_string(),
                            locator,
                        );
                    }
                }
                _ => {}
            }
        }

        if let ("select" | "input", Some(name)) = (local_name, tag.input_name) {
            self.registries.template_variables.define(name);
        }
        self.register_ids(locator, local_name, input_type.as_deref(), atts, &tag);

        let link = if local_name == "link" {
            self.check_link(
                locator,
                atts,
                ancestor_mask,
                parent_name.as_deref(),
                tag.tref,
            )
        } else {
            LinkKind::default()
        };

        let mut child = Frame::new(ancestor_mask, Some(local_name.to_string()), locator.clone());
        child.active_descendant = tag.active_descendant.map(str::to_string);
        child.has_action = local_name == "extent" && tag.has_action;
        child.is_collecting_characters = local_name == "style";
        match local_name {
            "select" => {
                let multiple = atts.contains("", "multiple");
                child.option_needed = atts.contains("", "required")
                    && !multiple
                    && !(parse_double(atts.get("", "size")) > 1.0);
                if !multiple {
                    self.open_single_selects.insert(self.stack.depth());
                }
            }
            "option" => {
                child.is_collecting_characters = self.start_option(locator, atts);
            }
            _ => {}
        }
        self.stack.push(child);

        let depth = self.stack.depth() - 1;
        if tag.active_descendant.is_some() && !atts.contains("", "aria-owns") {
            self.open_active_descendants.insert(depth, locator.clone());
        }
        if let Some(parent) = self.stack.parent_mut() {
            if parent.is("extent") {
                if link.query {
                    parent.query_found = true;
                } else if link.templated_resource {
                    parent.templated_link_found = true;
                }
            }
        }
    }

    fn scan_attributes<'a>(
        &mut self,
        locator: &Locator,
        local_name: &str,
        input_type: Option<&str>,
        atts: &'a Attributes,
    ) -> StartTag<'a> {
        let mut tag = StartTag::default();
        for att in atts.iter() {
            let value = att.value.as_str();
            if att.uri.is_empty() {
                match att.local_name.as_str() {
                    "style" => self.check_style_attribute(locator, value),
                    "tref" => tag.tref = Some(value),
                    "list" => tag.list = Some(value),
                    "name" => tag.input_name = Some(value),
                    "action" => tag.has_action = true,
                    "role" => tag.role = Some(value),
                    "aria-activedescendant" => tag.active_descendant = Some(value),
                    "for" if local_name == "label" => tag.for_attr = Some(value),
                    "tabindex" | "href" | "controls" | "type" | "lang" | "id" | "selected"
                    | "itemid" | "itemref" | "itemscope" | "itemtype" | "method" => {}
                    "rel" if local_name == "link" => {}
                    name => match allowed_input_types(name).filter(|_| local_name == "input") {
                        Some(allowed) => {
                            self.check_input_attribute(locator, name, allowed, input_type)
                        }
                        None if ATTRIBUTES_WITH_IMPLICIT_STATE_OR_PROPERTY.contains(&name) => {
                            let state_or_property = format!("aria-{name}");
                            if atts.get("", &state_or_property) == Some("true") {
                                self.warn(
                                    format!(
                                        "Attribute \u{201C}{state_or_property}\u{201D} is \
                                         unnecessary for elements that have attribute \
                                         \u{201C}{name}\u{201D}."
                                    ),
                                    locator,
                                );
                            }
                        }
                        None => {}
                    },
                }
            }
            if (att.is_id || att.local_name == "id") && !value.is_empty() {
                tag.ids.insert(value.to_string());
            }
        }
        tag
    }

    fn check_input_attribute(
        &mut self,
        locator: &Locator,
        name: &str,
        allowed: &[&str],
        input_type: Option<&str>,
    ) {
        let input_type = input_type.unwrap_or("text");
        if allowed.contains(&input_type) {
            return;
        }
        let mut allowed = allowed.to_vec();
        allowed.sort_unstable();
        self.err(
            format!(
                "Attribute \u{201C}{name}\u{201D} is only allowed when the input type is {}.",
                render_type_list(&allowed)
            ),
            locator,
        );
    }

    fn check_style_attribute(&mut self, locator: &Locator, value: &str) {
        let diagnostics = self.css.parse_style_attribute(value, locator.line);
        if !diagnostics.is_empty() {
            self.increment_use_counter(STYLE_ATTRIBUTE_ERRORS_FOUND);
        }
        for d in diagnostics {
            if let Some(message) = d.message() {
                self.err(format!("CSS: {message}"), locator);
            }
        }
    }

    fn check_redundant_role(
        &mut self,
        locator: &Locator,
        local_name: &str,
        input_type: Option<&str>,
        role: &str,
    ) {
        let role = trim_spaces(role);
        if let Some(input_type) = input_type {
            if implicit_input_role(input_type).is_some_and(|r| equals_ignore_ascii_case(r, role)) {
                self.warn(
                    format!(
                        "The \u{201C}{role}\u{201D} role is unnecessary for element \
                         \u{201C}input\u{201D} whose type is \u{201C}{input_type}\u{201D}."
                    ),
                    locator,
                );
            }
        } else if implicit_element_role(local_name)
            .is_some_and(|r| equals_ignore_ascii_case(r, role))
        {
            self.warn(
                format!(
                    "The \u{201C}{role}\u{201D} role is unnecessary for element \
                     \u{201C}{local_name}\u{201D}."
                ),
                locator,
            );
        }
    }

    /// `<input type="location">`: records which axis of which coordinate
    /// system the parent `<extent>` provides.
    fn check_location_input(&mut self, locator: &Locator, atts: &Attributes) {
        let units = atts.get("", "units").unwrap_or("tcrs");
        match atts.get("", "axis") {
            Some(axis) => {
                let has_position = atts.contains("", "position");
                // A positioned input reports its event in the coordinate system
                // its axis belongs to, whatever the extent's units are.
                let cs = if has_position {
                    AXIS_TO_COORDINATE_SYSTEM.get(axis).copied().unwrap_or(units)
                } else {
                    units
                };
                if let Some(parent) = self.stack.peek_mut() {
                    parent.set_found_axis(cs, axis);
                }
                if !has_position {
                    if let Some(axes) = coordinate_system_axes(units) {
                        if !axes.contains(&axis) {
                            let mut allowed = axes.to_vec();
                            allowed.sort_unstable();
                            self.err(
                                format!(
                                    "\u{201C}axis\u{201D} attribute value \u{201C}{axis}\u{201D} \
                                     is not allowed when the input \u{201C}units\u{201D} value \
                                     is \u{201C}{units}\u{201D} and attribute \
                                     \u{201C}position\u{201D} is not specified. Value must be \
                                     one of: {}.",
                                    render_type_list(&allowed)
                                ),
                                locator,
                            );
                        }
                    }
                }
            }
            None => self.err(
                "The \u{201C}input\u{201D} element with attribute \u{201C}type\u{201D} equals \
                 \u{201C}location\u{201D} must have an \u{201C}axis\u{201D} attribute."
                    .to_string(),
                locator,
            ),
        }
        if units == "tilematrix" && atts.get("", "rel").is_some_and(|rel| rel != "map") {
            self.err(
                "The \u{201C}input\u{201D} element attribute \u{201C}rel\u{201D} must equal \
                 \u{201C}map\u{201D}, or not exist at all."
                    .to_string(),
                locator,
            );
        }
    }

    /// Records the element's IDs as reference targets, its own references,
    /// and settles any `aria-activedescendant` it satisfies.
    fn register_ids(
        &mut self,
        locator: &Locator,
        local_name: &str,
        input_type: Option<&str>,
        atts: &Attributes,
        tag: &StartTag,
    ) {
        if LABELABLE_ELEMENTS.contains(&local_name) && input_type != Some("hidden") {
            self.registries.form_controls.define_all(&tag.ids);
        }
        match local_name {
            "form" => self.registries.form_elements.define_all(&tag.ids),
            "datalist" => self.registries.lists.define_all(&tag.ids),
            "label" => {
                if let Some(for_attr) = tag.for_attr {
                    self.registries
                        .form_controls
                        .refer(IdrefLocator::new(locator.clone(), for_attr));
                }
            }
            _ => {}
        }
        if FORM_ASSOCIATED_ELEMENTS.contains(&local_name) {
            if let Some(form) = atts.get("", "form") {
                self.registries
                    .form_elements
                    .refer(IdrefLocator::new(locator.clone(), form));
            }
        }
        if !tag.ids.is_empty() && !self.open_active_descendants.is_empty() {
            let stack = &self.stack;
            self.open_active_descendants.retain(|depth, _| {
                let referenced = stack
                    .get(*depth)
                    .and_then(|frame| frame.active_descendant.as_deref());
                !referenced.is_some_and(|id| tag.ids.contains(id))
            });
        }
    }

    /// Checks an `<option>` start tag against its `<select>`. Returns whether
    /// the option's text has to be collected to decide if it is a valid
    /// placeholder.
    fn start_option(&mut self, locator: &Locator, atts: &Attributes) -> bool {
        if atts.contains("", "selected") {
            if let Some(depth) = self.stack.nearest("select") {
                if self.open_single_selects.contains(&depth) {
                    let already_selected = self
                        .stack
                        .get_mut(depth)
                        .map(|select| std::mem::replace(&mut select.selected_options, true))
                        .unwrap_or(false);
                    if already_selected {
                        self.err(
                            "The \u{201C}select\u{201D} element cannot have more than one \
                             selected \u{201C}option\u{201D} descendant unless the \
                             \u{201C}multiple\u{201D} attribute is specified."
                                .to_string(),
                            locator,
                        );
                    }
                }
            }
        }
        let Some(parent) = self.stack.peek_mut() else {
            return false;
        };
        if !parent.is("select") || !parent.option_needed || parent.option_found {
            return false;
        }
        match atts.get("", "value") {
            None => {
                parent.no_value_option_found = true;
                true
            }
            // an empty value makes it a valid placeholder
            Some("") => false,
            Some(_) => {
                parent.non_empty_option = Some(locator.clone());
                false
            }
        }
    }

    fn check_link(
        &mut self,
        locator: &Locator,
        atts: &Attributes,
        ancestor_mask: AncestorMask,
        parent_name: Option<&str>,
        tref: Option<&str>,
    ) -> LinkKind {
        let rels: Vec<String> = atts
            .get("", "rel")
            .map(|rel| {
                split_on_spaces(&rel.to_ascii_lowercase())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let has_rel = |r: &str| rels.iter().any(|x| x == r);
        let parent_is_extent = parent_name == Some("extent");
        let query = has_rel("query");

        if has_rel("self") && has_rel("style") {
            self.registries.self_styles.push(locator.clone());
        }
        let parent_query_found = self.stack.peek().is_some_and(|p| p.query_found);
        if query && parent_query_found {
            self.warn(
                "The \u{201C}extent\u{201D} element should contain at most one \
                 \u{201C}link\u{201D} element with a \u{201C}rel\u{201D} attribute containing \
                 the \u{201C}query\u{201D} link relation."
                    .to_string(),
                locator,
            );
        }
        let templated_resource = tref.is_some()
            && !query
            && (has_rel("tile") || has_rel("image") || has_rel("features"));

        if let Some(tref) = tref {
            if parent_name.is_some() && !parent_is_extent {
                self.err(
                    "The \u{201C}tref\u{201D} attribute must only occur on a \u{201C}link\u{201D} \
                     element within an \u{201C}extent\u{201D} element."
                        .to_string(),
                    locator,
                );
            }
            if atts.contains("", "href") {
                self.err(
                    "A \u{201C}link\u{201D} element may have a \u{201C}tref\u{201D} attribute or \
                     an \u{201C}href\u{201D} attribute, but not both."
                        .to_string(),
                    locator,
                );
            }
            for var in template_variables(tref) {
                self.registries.template_variables.refer(
                    IdrefLocator::new(locator.clone(), var).with_additional(format!(
                        "{{{var}}} has no associated \u{201C}input\u{201D} element."
                    )),
                );
            }
        }
        if atts.contains("", "href") && parent_is_extent {
            self.err(
                "A \u{201C}link\u{201D} element in the \u{201C}extent\u{201D} element must not \
                 have an \u{201C}href\u{201D} attribute."
                    .to_string(),
                locator,
            );
        }
        if atts.contains("", "projection") && !has_rel("alternate") {
            self.err(
                "A \u{201C}link\u{201D} element with a \u{201C}projection\u{201D} attribute must \
                 have a \u{201C}rel\u{201D} attribute value of \u{201C}alternate\u{201D}."
                    .to_string(),
                locator,
            );
        }
        if ancestor_mask.contains(SpecialAncestor::Body)
            && parent_name.is_some()
            && !parent_is_extent
            && !rels.is_empty()
            && !has_rel("next")
            && !atts.contains("", "itemprop")
            && !atts.contains("", "property")
        {
            self.err(
                "A \u{201C}link\u{201D} element must not appear as a descendant of a \
                 \u{201C}body\u{201D} element unless the \u{201C}link\u{201D} element has an \
                 \u{201C}itemprop\u{201D} attribute or has a \u{201C}rel\u{201D} attribute whose \
                 value contains \u{201C}next\u{201D}, or \u{201C}stylesheet\u{201D}."
                    .to_string(),
                locator,
            );
        }
        LinkKind {
            query,
            templated_resource,
        }
    }
}
