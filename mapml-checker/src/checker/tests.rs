use super::*;
use crate::attributes::Attributes;
use crate::css::{CssDiagnostic, CssError};
use crate::sink::{Collector, Diagnostic, Level, StartHint};
use crate::tables::XHTML_NAMESPACE_URI as XHTML;
use assert_matches::assert_matches;

/// Reports one fixed error for every non-empty input.
struct FailingCss;

impl CssParser for FailingCss {
    fn parse_stylesheet(&self, css: &str) -> Vec<CssDiagnostic> {
        if css.is_empty() {
            return vec![];
        }
        vec![CssDiagnostic {
            begin_line: 1,
            begin_column: 2,
            end_line: 2,
            end_column: 5,
            error: CssError::Parse {
                error_type: None,
                property: Some("color".to_string()),
                message: Some("Bad value".to_string()),
            },
        }]
    }

    fn parse_style_attribute(&self, css: &str, _line: u32) -> Vec<CssDiagnostic> {
        self.parse_stylesheet(css)
    }
}

fn checker() -> Checker<Collector> {
    let mut c = Checker::new(Collector::new(), CheckerConfig::default());
    c.start_document();
    c
}

fn loc(line: u32) -> Locator {
    Locator::new(line, 1)
}

fn start(c: &mut Checker<Collector>, line: u32, name: &str, atts: &[(&str, &str)]) {
    let atts: Attributes = atts.iter().copied().collect();
    c.start_element(&loc(line), XHTML, name, &atts);
}

fn end(c: &mut Checker<Collector>, line: u32, name: &str) {
    c.end_element(&loc(line), XHTML, name);
}

fn messages(c: &Checker<Collector>) -> Vec<(Level, u32, &str)> {
    c.sink()
        .diagnostics
        .iter()
        .map(|d| (d.level, d.locator.line, d.message.as_str()))
        .collect()
}

/// Opens `<extent>` with a zoom input and a complete `tcrs` pair.
fn open_valid_extent(c: &mut Checker<Collector>, line: u32, atts: &[(&str, &str)]) {
    start(c, line, "extent", atts);
    start(c, line + 1, "input", &[("type", "zoom"), ("min", "0"), ("max", "10")]);
    end(c, line + 1, "input");
    start(c, line + 2, "input", &[("type", "location"), ("axis", "x")]);
    end(c, line + 2, "input");
    start(c, line + 3, "input", &[("type", "location"), ("axis", "y")]);
    end(c, line + 3, "input");
}

#[test]
fn valid_extent_is_quiet() {
    let mut c = checker();
    start(&mut c, 1, "mapml", &[]);
    start(&mut c, 2, "body", &[]);
    open_valid_extent(&mut c, 3, &[]);
    end(&mut c, 7, "extent");
    end(&mut c, 8, "body");
    end(&mut c, 9, "mapml");
    c.end_document();
    assert_eq!(messages(&c), vec![]);
    assert_eq!(c.depth(), 0);
}

#[test]
fn empty_extent() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    end(&mut c, 2, "extent");
    c.end_document();
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_matches!(m[0], (Level::Error, 2, msg) if msg.contains("\u{201C}zoom\u{201D}"));
    assert_matches!(m[1], (Level::Error, 2, msg) if msg.contains("\u{201C}location\u{201D}."));
}

#[test]
fn nested_extent() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "extent", &[]);
    assert_eq!(
        messages(&c),
        vec![(
            Level::Error,
            2,
            "The element \u{201C}extent\u{201D} must not appear as a descendant of the \
             \u{201C}extent\u{201D} element."
        )]
    );
}

#[test]
fn input_outside_extent() {
    let mut c = checker();
    start(&mut c, 1, "body", &[]);
    start(&mut c, 2, "input", &[("type", "text")]);
    assert_eq!(
        messages(&c),
        vec![(
            Level::Error,
            2,
            "The \u{201C}input\u{201D} element must have a \u{201C}extent\u{201D} ancestor."
        )]
    );
}

#[test]
fn unpaired_axis() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "zoom")]);
    end(&mut c, 2, "input");
    start(&mut c, 3, "input", &[("type", "location"), ("units", "gcrs"), ("axis", "latitude")]);
    end(&mut c, 3, "input");
    end(&mut c, 4, "extent");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 4, msg) if msg.contains("complementary pairs"));
}

#[test]
fn wrong_axis_for_units() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "location"), ("units", "pcrs"), ("axis", "x")]);
    assert_eq!(
        messages(&c),
        vec![(
            Level::Error,
            2,
            "\u{201C}axis\u{201D} attribute value \u{201C}x\u{201D} is not allowed when the \
             input \u{201C}units\u{201D} value is \u{201C}pcrs\u{201D} and attribute \
             \u{201C}position\u{201D} is not specified. Value must be one of: \
             \u{201C}easting\u{201D}, or \u{201C}northing\u{201D}."
        )]
    );
}

#[test]
fn positioned_axis_counts_towards_its_own_system() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "zoom")]);
    end(&mut c, 2, "input");
    for (line, axis) in [(3, "latitude"), (4, "longitude")] {
        start(
            &mut c,
            line,
            "input",
            &[("type", "location"), ("units", "pcrs"), ("axis", axis), ("position", "top-left")],
        );
        end(&mut c, line, "input");
    }
    end(&mut c, 5, "extent");
    assert_eq!(messages(&c), vec![]);
}

#[test]
fn location_without_axis() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "location")]);
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0].2, msg if msg.ends_with("must have an \u{201C}axis\u{201D} attribute."));
}

#[test]
fn tilematrix_rel() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(
        &mut c,
        2,
        "input",
        &[("type", "location"), ("units", "tilematrix"), ("axis", "row"), ("rel", "tile")],
    );
    end(&mut c, 2, "input");
    start(
        &mut c,
        3,
        "input",
        &[("type", "location"), ("units", "tilematrix"), ("axis", "column"), ("rel", "map")],
    );
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 2, msg) if msg.contains("must equal \u{201C}map\u{201D}"));
}

#[test]
fn input_attribute_needs_matching_type() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("axis", "x"), ("type", "zoom")]);
    assert_eq!(
        messages(&c),
        vec![(
            Level::Error,
            2,
            "Attribute \u{201C}axis\u{201D} is only allowed when the input type is \
             \u{201C}location\u{201D}."
        )]
    );
}

#[test]
fn input_type_defaults_to_text() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("placeholder", "Search"), ("min", "1")]);
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_eq!(
        m[0].2,
        "Attribute \u{201C}min\u{201D} is only allowed when the input type is \
         \u{201C}height\u{201D}, \u{201C}location\u{201D}, \u{201C}width\u{201D}, or \
         \u{201C}zoom\u{201D}."
    );
}

#[test]
fn redundant_aria_state() {
    let mut c = checker();
    start(&mut c, 1, "div", &[("hidden", ""), ("aria-hidden", "true")]);
    start(&mut c, 2, "div", &[("hidden", ""), ("aria-hidden", "false")]);
    assert_eq!(
        messages(&c),
        vec![(
            Level::Warning,
            1,
            "Attribute \u{201C}aria-hidden\u{201D} is unnecessary for elements that have \
             attribute \u{201C}hidden\u{201D}."
        )]
    );
}

#[test]
fn redundant_roles() {
    let mut c = checker();
    start(&mut c, 1, "body", &[("role", " Document ")]);
    start(&mut c, 2, "extent", &[]);
    start(&mut c, 3, "input", &[("type", "range"), ("role", "slider")]);
    end(&mut c, 3, "input");
    start(&mut c, 4, "input", &[("type", "text"), ("role", "slider")]);
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_eq!(m[0].2, "The \u{201C}Document\u{201D} role is unnecessary for element \u{201C}body\u{201D}.");
    assert_eq!(
        m[1].2,
        "The \u{201C}slider\u{201D} role is unnecessary for element \u{201C}input\u{201D} whose \
         type is \u{201C}range\u{201D}."
    );
}

#[test]
fn shard_input() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "hidden"), ("shard", ""), ("value", "a")]);
    end(&mut c, 2, "input");
    start(&mut c, 3, "input", &[("type", "hidden"), ("shard", ""), ("list", "servers")]);
    end(&mut c, 3, "input");
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_matches!(m[0].2, msg if msg.ends_with("must have \u{201C}list\u{201D} attribute."));
    assert_matches!(m[1].2, msg if msg.ends_with("must not have a \u{201C}value\u{201D} attribute."));
    c.end_document();
    let m = messages(&c);
    assert_eq!(m.len(), 3);
    assert_matches!(m[2], (Level::Error, 3, msg) if msg.contains("\u{201C}datalist\u{201D}"));
}

#[test]
fn shard_list_resolves_to_datalist() {
    let mut c = checker();
    start(&mut c, 1, "extent", &[]);
    start(&mut c, 2, "input", &[("type", "hidden"), ("shard", ""), ("list", "servers")]);
    end(&mut c, 2, "input");
    start(&mut c, 3, "datalist", &[("id", "servers")]);
    end(&mut c, 4, "datalist");
    c.end_document();
    assert_eq!(messages(&c), vec![]);
}

#[test]
fn template_variables_resolve_within_extent() {
    let mut c = checker();
    open_valid_extent(&mut c, 1, &[]);
    start(&mut c, 5, "input", &[("name", "z"), ("type", "zoom")]);
    end(&mut c, 5, "input");
    start(&mut c, 6, "link", &[("rel", "tile"), ("tref", "/t/{z}/{x}/{y}.png")]);
    end(&mut c, 6, "link");
    start(&mut c, 7, "select", &[("name", "x")]);
    end(&mut c, 7, "select");
    end(&mut c, 8, "extent");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_eq!(
        m[0],
        (
            Level::Error,
            6,
            "\u{201C}link\u{201D} element \u{201C}tref\u{201D} attribute template variables \
             must each be associated to a unique \u{201C}input\u{201D} element \
             \u{201C}name\u{201D} attribute. {y} has no associated \u{201C}input\u{201D} \
             element."
        )
    );

    // names from one extent don't satisfy the next
    open_valid_extent(&mut c, 10, &[]);
    start(&mut c, 14, "link", &[("rel", "image"), ("tref", "/i?z={z}")]);
    end(&mut c, 14, "link");
    end(&mut c, 15, "extent");
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_matches!(m[1], (Level::Error, 14, msg) if msg.ends_with("{z} has no associated \u{201C}input\u{201D} element."));
}

#[test]
fn tref_rules() {
    let mut c = checker();
    start(&mut c, 1, "head", &[]);
    start(&mut c, 2, "link", &[("rel", "tile"), ("tref", "/a"), ("href", "/b")]);
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_matches!(m[0].2, msg if msg.starts_with("The \u{201C}tref\u{201D} attribute must only occur"));
    assert_matches!(m[1].2, msg if msg.ends_with("but not both."));
}

#[test]
fn tref_on_root_link_is_not_misplaced() {
    let mut c = checker();
    start(&mut c, 1, "link", &[("rel", "tile"), ("tref", "/a")]);
    end(&mut c, 1, "link");
    assert_eq!(messages(&c), vec![]);
}

#[test]
fn href_in_extent() {
    let mut c = checker();
    open_valid_extent(&mut c, 1, &[]);
    start(&mut c, 5, "link", &[("rel", "license"), ("href", "/l")]);
    end(&mut c, 5, "link");
    end(&mut c, 6, "extent");
    assert_eq!(
        messages(&c),
        vec![(
            Level::Error,
            5,
            "A \u{201C}link\u{201D} element in the \u{201C}extent\u{201D} element must not have \
             an \u{201C}href\u{201D} attribute."
        )]
    );
}

#[test]
fn second_query_link_warns() {
    let mut c = checker();
    open_valid_extent(&mut c, 1, &[]);
    for line in [5, 6] {
        start(&mut c, line, "link", &[("rel", "Query"), ("tref", "/q")]);
        end(&mut c, line, "link");
    }
    end(&mut c, 7, "extent");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Warning, 6, msg) if msg.contains("at most one"));
}

#[test]
fn action_with_templated_resource_warns() {
    let mut c = checker();
    open_valid_extent(&mut c, 1, &[("action", "/search")]);
    start(&mut c, 5, "link", &[("rel", "features"), ("tref", "/f")]);
    end(&mut c, 5, "link");
    start(&mut c, 6, "link", &[("rel", "tile query"), ("tref", "/q")]);
    end(&mut c, 6, "link");
    end(&mut c, 7, "extent");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Warning, 7, msg) if msg.contains("\u{201C}action\u{201D} attribute"));
}

#[test]
fn query_link_is_not_a_templated_resource() {
    let mut c = checker();
    open_valid_extent(&mut c, 1, &[("action", "/search")]);
    start(&mut c, 5, "link", &[("rel", "tile query"), ("tref", "/q")]);
    end(&mut c, 5, "link");
    end(&mut c, 6, "extent");
    assert_eq!(messages(&c), vec![]);
}

#[test]
fn projection_needs_alternate() {
    let mut c = checker();
    start(&mut c, 1, "head", &[]);
    start(&mut c, 2, "link", &[("rel", "alternate"), ("projection", "OSMTILE")]);
    end(&mut c, 2, "link");
    start(&mut c, 3, "link", &[("rel", "license"), ("projection", "OSMTILE")]);
    end(&mut c, 3, "link");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 3, msg) if msg.contains("\u{201C}alternate\u{201D}"));
}

#[test]
fn link_in_body() {
    let mut c = checker();
    start(&mut c, 1, "body", &[]);
    start(&mut c, 2, "div", &[]);
    start(&mut c, 3, "link", &[("rel", "license")]);
    end(&mut c, 3, "link");
    start(&mut c, 4, "link", &[("rel", "next")]);
    end(&mut c, 4, "link");
    start(&mut c, 5, "link", &[("rel", "license"), ("itemprop", "x")]);
    end(&mut c, 5, "link");
    start(&mut c, 6, "link", &[("rel", "")]);
    end(&mut c, 6, "link");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 3, msg) if msg.starts_with("A \u{201C}link\u{201D} element must not appear"));
}

#[test]
fn self_style_reported_at_every_link() {
    let mut c = checker();
    start(&mut c, 1, "head", &[]);
    start(&mut c, 2, "link", &[("rel", "self style")]);
    end(&mut c, 2, "link");
    c.end_document();
    assert_eq!(messages(&c), vec![]);

    c.start_document();
    start(&mut c, 1, "head", &[]);
    start(&mut c, 2, "link", &[("rel", "self style")]);
    end(&mut c, 2, "link");
    start(&mut c, 3, "link", &[("rel", "STYLE\tSELF")]);
    end(&mut c, 3, "link");
    end(&mut c, 4, "head");
    c.end_document();
    let lines: Vec<_> = messages(&c).iter().map(|m| m.1).collect();
    assert_eq!(lines, vec![2, 3]);
}

#[test]
fn label_and_form_references() {
    let mut c = checker();
    start(&mut c, 1, "form", &[("id", "f")]);
    end(&mut c, 1, "form");
    start(&mut c, 2, "label", &[("for", "name")]);
    end(&mut c, 2, "label");
    start(&mut c, 3, "label", &[("for", "secret")]);
    end(&mut c, 3, "label");
    start(&mut c, 4, "extent", &[]);
    start(&mut c, 5, "input", &[("id", "name"), ("form", "f")]);
    end(&mut c, 5, "input");
    start(&mut c, 6, "input", &[("id", "secret"), ("type", "hidden"), ("form", "g")]);
    end(&mut c, 6, "input");
    c.end_document();
    let m = messages(&c);
    assert_eq!(m.len(), 2);
    assert_matches!(m[0], (Level::Error, 3, msg) if msg.contains("\u{201C}label\u{201D}"));
    assert_matches!(m[1], (Level::Error, 6, "The \u{201C}form\u{201D} attribute must refer to a form element."));
}

#[test]
fn required_select_without_option() {
    let mut c = checker();
    start(&mut c, 1, "select", &[("required", "")]);
    end(&mut c, 2, "select");
    start(&mut c, 3, "select", &[("required", ""), ("size", "4")]);
    end(&mut c, 4, "select");
    start(&mut c, 5, "select", &[("required", ""), ("multiple", "")]);
    end(&mut c, 6, "select");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 2, msg) if msg.ends_with("must have a child \u{201C}option\u{201D} element."));
}

#[test]
fn required_select_placeholder() {
    let mut c = checker();
    // first option has a value: not a placeholder
    start(&mut c, 1, "select", &[("required", "")]);
    start(&mut c, 2, "option", &[("value", "a")]);
    end(&mut c, 2, "option");
    end(&mut c, 3, "select");
    // no value but a label: not a placeholder either
    start(&mut c, 4, "select", &[("required", "")]);
    start(&mut c, 5, "option", &[]);
    c.characters("Pick one");
    end(&mut c, 5, "option");
    end(&mut c, 6, "select");
    // empty value is fine whatever the label
    start(&mut c, 7, "select", &[("required", "")]);
    start(&mut c, 8, "option", &[("value", "")]);
    c.characters("Pick one");
    end(&mut c, 8, "option");
    start(&mut c, 9, "option", &[("value", "b")]);
    end(&mut c, 9, "option");
    end(&mut c, 10, "select");
    // no value and only whitespace
    start(&mut c, 11, "select", &[("required", "")]);
    start(&mut c, 12, "option", &[]);
    c.characters(" \n");
    end(&mut c, 12, "option");
    end(&mut c, 13, "select");
    let lines: Vec<_> = messages(&c).iter().map(|m| m.1).collect();
    assert_eq!(lines, vec![2, 5]);
    assert_matches!(messages(&c)[0].2, msg if msg.starts_with("The first child \u{201C}option\u{201D}"));
}

#[test]
fn single_select_allows_one_selected_option() {
    let mut c = checker();
    start(&mut c, 1, "select", &[]);
    start(&mut c, 2, "optgroup", &[]);
    start(&mut c, 3, "option", &[("selected", "")]);
    end(&mut c, 3, "option");
    start(&mut c, 4, "option", &[("selected", "")]);
    end(&mut c, 4, "option");
    end(&mut c, 5, "optgroup");
    end(&mut c, 6, "select");
    start(&mut c, 7, "select", &[("multiple", "")]);
    start(&mut c, 8, "option", &[("selected", "")]);
    end(&mut c, 8, "option");
    start(&mut c, 9, "option", &[("selected", "")]);
    end(&mut c, 9, "option");
    end(&mut c, 10, "select");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Error, 4, msg) if msg.contains("more than one selected"));
}

#[test]
fn active_descendant() {
    let mut c = checker();
    start(&mut c, 1, "div", &[("aria-activedescendant", "item")]);
    start(&mut c, 2, "span", &[("id", "item")]);
    end(&mut c, 2, "span");
    end(&mut c, 3, "div");
    start(&mut c, 4, "div", &[("aria-activedescendant", "elsewhere")]);
    end(&mut c, 5, "div");
    start(&mut c, 6, "div", &[("aria-activedescendant", "elsewhere"), ("aria-owns", "x")]);
    end(&mut c, 7, "div");
    let m = messages(&c);
    assert_eq!(m.len(), 1);
    assert_matches!(m[0], (Level::Warning, 4, msg) if msg.starts_with("Attribute \u{201C}aria-activedescendant\u{201D}"));
}

#[test]
fn foreign_elements_keep_stack_paired() {
    let mut c = checker();
    start(&mut c, 1, "body", &[]);
    let atts = Attributes::new();
    c.start_element(&loc(2), "http://www.w3.org/2000/svg", "svg", &atts);
    start(&mut c, 3, "link", &[("rel", "license")]);
    end(&mut c, 3, "link");
    c.end_element(&loc(4), "http://www.w3.org/2000/svg", "svg");
    assert_eq!(c.depth(), 1);
    // the svg parent has no XHTML name, so the body rule does not apply
    assert_eq!(messages(&c), vec![]);
}

#[test]
fn style_attribute_errors() {
    let mut c = checker().with_css_parser(Box::new(FailingCss));
    start(&mut c, 4, "div", &[("style", "color: bluish")]);
    start(&mut c, 5, "div", &[("style", "")]);
    assert_eq!(
        messages(&c),
        vec![(Level::Error, 4, "CSS: \u{201C}color\u{201D}: Bad value.")]
    );
    assert_eq!(
        c.sink().use_counters,
        vec!["http://validator.nu/properties/style-attribute-errors-found".to_string()]
    );
}

#[test]
fn style_element_errors() {
    let mut c = Checker::new(Collector::with_start_hints(), CheckerConfig::default())
        .with_css_parser(Box::new(FailingCss));
    c.start_document();
    c.start_element(&Locator::new(10, 8), XHTML, "style", &Attributes::new());
    c.characters("\np { color: bluish }\n");
    c.end_element(&Locator::new(12, 9), XHTML, "style");
    let d = &c.sink().diagnostics;
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].message, "CSS: \u{201C}color\u{201D}: Bad value.");
    assert_eq!((d[0].locator.line, d[0].locator.column), (12, 5));
    assert_eq!(
        d[0].start,
        Some(StartHint {
            line: 11,
            column: 2,
            column_offset: 0
        })
    );
    assert_eq!(
        c.sink().use_counters,
        vec!["http://validator.nu/properties/style-element-errors-found".to_string()]
    );
}

#[test]
fn style_element_in_css_source() {
    let mut c = Checker::new(Collector::new(), CheckerConfig { source_is_css: true })
        .with_css_parser(Box::new(FailingCss));
    c.start_document();
    c.start_element(&Locator::new(1, 8), XHTML, "style", &Attributes::new());
    c.characters("p { color: bluish }");
    c.end_element(&Locator::new(1, 35), XHTML, "style");
    let d = &c.sink().diagnostics;
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].message, "\u{201C}color\u{201D}: Bad value.");
    assert_matches!(d[0].start, None);
    assert_eq!(d[0].locator.line, 2);

    c.set_source_is_css(false);
    assert!(!c.config().source_is_css);
    c.sink_mut().clear();
    c.start_document();
    c.start_element(&Locator::new(1, 8), XHTML, "style", &Attributes::new());
    c.characters("p { color: bluish }");
    c.end_element(&Locator::new(1, 35), XHTML, "style");
    assert!(c.sink().diagnostics[0].message.starts_with("CSS: "));
}

#[test]
fn reuse_is_idempotent() {
    fn run(c: &mut Checker<Collector>) -> Vec<Diagnostic> {
        c.sink_mut().clear();
        c.start_document();
        start(c, 1, "head", &[]);
        start(c, 2, "link", &[("rel", "self style")]);
        end(c, 2, "link");
        start(c, 3, "link", &[("rel", "self style")]);
        end(c, 3, "link");
        end(c, 4, "head");
        start(c, 5, "extent", &[]);
        start(c, 6, "link", &[("rel", "tile"), ("tref", "{q}")]);
        // document ends with the extent still open
        c.end_document();
        c.sink().diagnostics.clone()
    }
    let mut c = Checker::new(Collector::new(), CheckerConfig::default());
    let first = run(&mut c);
    assert_eq!(first.len(), 2);
    assert_eq!(run(&mut c), first);
    assert_eq!(c.depth(), 0);
}

#[test]
fn unmatched_end_is_ignored() {
    let mut c = checker();
    end(&mut c, 1, "extent");
    assert_eq!(messages(&c), vec![]);
    assert_eq!(c.depth(), 0);
}
