//! Drives a [`Checker`] from XML source text.
//!
//! `xmlparser` only tokenizes; this module supplies the rest of what a SAX
//! parser would: namespace resolution, entity expansion, matching of end
//! tags, and line/column locators for each event.

use crate::attributes::{Attribute, Attributes};
use crate::checker::Checker;
use crate::locator::Locator;
use crate::sink::DiagnosticSink;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use xmlparser::{ElementEnd, EntityDefinition, StrSpan, Token, Tokenizer};

const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The document could not be turned into events. These are problems with the
/// XML itself; anything wrong with the MapML goes to the checker's sink.
#[derive(Debug)]
pub enum ReaderError<'a> {
    Xml(xmlparser::Error),
    UndefinedNamespacePrefix {
        prefix: StrSpan<'a>,
    },
    UndefinedEntity {
        name: &'a str,
        span: std::ops::Range<usize>,
    },
    InvalidOrUnclosedEntity {
        span: std::ops::Range<usize>,
    },
    /// Entities with a `SYSTEM` or `PUBLIC` identifier are never fetched.
    ExternalEntity {
        name: StrSpan<'a>,
    },
    MismatchedEndTag {
        open: StrSpan<'a>,
        close: StrSpan<'a>,
    },
    UnexpectedEndTag {
        span: StrSpan<'a>,
    },
    UnclosedElement {
        open: StrSpan<'a>,
    },
}

pub struct Reader<'a, S> {
    source: &'a str,
    tokenizer: Tokenizer<'a>,
    checker: Checker<S>,
    system_id: Option<Arc<str>>,
    stack: ElementStack<'a>,
    /// Replacement text of each entity, with character references already
    /// expanded.
    entity_definitions: HashMap<&'a str, Cow<'a, str>>,
    position: Position,
    started: bool,
    finished: bool,
}

impl<'a, S: DiagnosticSink> Reader<'a, S> {
    pub fn new(source: &'a str, checker: Checker<S>) -> Reader<'a, S> {
        let entity_definitions = [
            ("lt", "<"),
            ("gt", ">"),
            ("amp", "&"),
            ("apos", "'"),
            ("quot", "\""),
        ]
        .into_iter()
        .map(|(name, text)| (name, Cow::Borrowed(text)))
        .collect();
        Reader {
            source,
            tokenizer: Tokenizer::from(source),
            checker,
            system_id: None,
            stack: ElementStack::default(),
            entity_definitions,
            position: Position::default(),
            started: false,
            finished: false,
        }
    }

    /// Names the document in every locator handed to the checker.
    pub fn with_system_id(mut self, system_id: impl Into<Arc<str>>) -> Reader<'a, S> {
        self.system_id = Some(system_id.into());
        self
    }

    pub fn checker(&self) -> &Checker<S> {
        &self.checker
    }

    pub fn into_checker(self) -> Checker<S> {
        self.checker
    }

    /// Feeds the next token to the checker. Returns `None` once the document
    /// has been completely checked.
    pub fn check_next(&mut self) -> Option<Result<(), ReaderError<'a>>> {
        if self.finished {
            return None;
        }
        if !self.started {
            self.started = true;
            self.checker.start_document();
        }
        match self.tokenizer.next() {
            Some(Ok(token)) => {
                let result = self.token(token);
                if result.is_err() {
                    self.finished = true;
                }
                Some(result)
            }
            Some(Err(err)) => {
                debug!(%err, "not well-formed");
                self.finished = true;
                Some(Err(ReaderError::Xml(err)))
            }
            None => {
                self.finished = true;
                if let Some(open) = self.stack.elements.last() {
                    return Some(Err(ReaderError::UnclosedElement { open: open.span }));
                }
                debug!(system_id = self.system_id.as_deref(), "end of input");
                self.checker.end_document();
                None
            }
        }
    }

    /// Checks the rest of the document.
    pub fn check_all(&mut self) -> Result<(), ReaderError<'a>> {
        while let Some(result) = self.check_next() {
            result?;
        }
        Ok(())
    }

    fn token(&mut self, token: Token<'a>) -> Result<(), ReaderError<'a>> {
        match token {
            Token::ElementStart {
                prefix,
                local,
                span,
            } => {
                self.stack.push(prefix, local, span);
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                self.stack.add_attr(prefix, local, value);
            }
            Token::ElementEnd { end, span } => {
                let locator = self.locator_at(span.end());
                match end {
                    ElementEnd::Open => {
                        self.start_element(&locator)?;
                    }
                    ElementEnd::Empty => {
                        let (uri, local) = self.start_element(&locator)?;
                        self.stack.pop();
                        self.checker.end_element(&locator, &uri, &local);
                    }
                    ElementEnd::Close(prefix, local) => {
                        let uri = self.end_element(prefix, local, span)?;
                        self.checker.end_element(&locator, &uri, local.as_str());
                    }
                }
            }
            Token::Text { text } => {
                let text = self.expand(text, false)?;
                self.checker.characters(&text);
            }
            Token::Cdata { text, .. } => {
                self.checker.characters(text.as_str());
            }
            Token::EntityDeclaration {
                name, definition, ..
            } => match definition {
                EntityDefinition::EntityValue(value) => {
                    let text = replacement_text(value)?;
                    // the first declaration of an entity is binding
                    self.entity_definitions.entry(name.as_str()).or_insert(text);
                }
                EntityDefinition::ExternalId(_) => {
                    return Err(ReaderError::ExternalEntity { name });
                }
            },
            Token::Declaration { .. }
            | Token::ProcessingInstruction { .. }
            | Token::Comment { .. }
            | Token::DtdStart { .. }
            | Token::EmptyDtd { .. }
            | Token::DtdEnd { .. } => {}
        }
        Ok(())
    }

    fn start_element(&mut self, locator: &Locator) -> Result<(String, String), ReaderError<'a>> {
        let (uri, local) = self.stack.current_element()?;
        let mut atts = Attributes::new();
        for unresolved in self.stack.current_attributes() {
            let uri = if unresolved.prefix.as_str().is_empty() {
                ""
            } else {
                self.stack.try_lookup_namespace_uri(unresolved.prefix)?
            };
            let value = self.expand(unresolved.value, true)?;
            atts.push_attribute(Attribute {
                uri: uri.to_string(),
                local_name: unresolved.local.to_string(),
                value: value.into_owned(),
                is_id: uri == XML_NAMESPACE_URI && unresolved.local.as_str() == "id",
            });
        }
        let uri = uri.to_string();
        let local = local.to_string();
        self.checker.start_element(locator, &uri, &local, &atts);
        Ok((uri, local))
    }

    fn end_element(
        &mut self,
        prefix: StrSpan<'a>,
        local: StrSpan<'a>,
        span: StrSpan<'a>,
    ) -> Result<String, ReaderError<'a>> {
        let Some(open) = self.stack.elements.last() else {
            return Err(ReaderError::UnexpectedEndTag { span });
        };
        if open.prefix.as_str() != prefix.as_str() || open.local.as_str() != local.as_str() {
            return Err(ReaderError::MismatchedEndTag {
                open: open.span,
                close: span,
            });
        }
        let (uri, _) = self.stack.current_element()?;
        let uri = uri.to_string();
        self.stack.pop();
        Ok(uri)
    }

    /// Replaces entity and character references. Attribute values also have
    /// literal tabs and line breaks normalized to spaces.
    fn expand(&self, raw: StrSpan<'a>, attribute: bool) -> Result<Cow<'a, str>, ReaderError<'a>> {
        let text = raw.as_str();
        let needs_normalizing = attribute && text.contains(['\t', '\n', '\r']);
        if !text.contains('&') && !needs_normalizing {
            return Ok(Cow::Borrowed(text));
        }
        let mut buffer = String::with_capacity(text.len());
        for part in parse_entities(raw.start(), text) {
            match part? {
                Txt::Text(t) if attribute => {
                    let mut chars = t.chars().peekable();
                    while let Some(c) = chars.next() {
                        match c {
                            '\r' => {
                                // a line break is one space, however it is spelled
                                chars.next_if_eq(&'\n');
                                buffer.push(' ');
                            }
                            '\t' | '\n' => buffer.push(' '),
                            c => buffer.push(c),
                        }
                    }
                }
                Txt::Text(t) => buffer.push_str(t),
                Txt::Entity(pos, name) => match self.entity_definitions.get(name) {
                    Some(value) => buffer.push_str(value),
                    None => {
                        return Err(ReaderError::UndefinedEntity {
                            name,
                            span: pos..pos + name.len(),
                        });
                    }
                },
                Txt::Char(c) => buffer.push(c),
            }
        }
        Ok(Cow::Owned(buffer))
    }

    fn locator_at(&mut self, offset: usize) -> Locator {
        self.position.advance_to(self.source, offset);
        Locator {
            public_id: None,
            system_id: self.system_id.clone(),
            line: self.position.line,
            column: self.position.column,
        }
    }

    pub fn diagnostic(
        &self,
        name: String,
        source: String,
        err: &ReaderError,
    ) -> (codemap::CodeMap, Vec<codemap_diagnostic::Diagnostic>) {
        let mut map = codemap::CodeMap::new();
        let file = map.add_file(name, source);
        let error = |message: String, span: codemap::Span, label: Option<String>| {
            codemap_diagnostic::Diagnostic {
                level: codemap_diagnostic::Level::Error,
                message,
                code: None,
                spans: vec![codemap_diagnostic::SpanLabel {
                    span,
                    label,
                    style: codemap_diagnostic::SpanStyle::Primary,
                }],
            }
        };
        let subspan = |start: usize, end: usize| file.span.subspan(start as _, end as _);
        let diagnostics = match err {
            ReaderError::Xml(err) => {
                let pos = err.pos();
                let line = (pos.row as usize).saturating_sub(1);
                let start = file
                    .source_line(line)
                    .char_indices()
                    .nth((pos.col as usize).saturating_sub(1))
                    .map(|(i, _)| i)
                    .unwrap_or(0);
                let span = file.line_span(line).subspan(start as _, start as _);
                vec![error(format!("{err}"), span, None)]
            }
            ReaderError::UndefinedNamespacePrefix { prefix } => vec![error(
                format!("The prefix {:?} is not defined", prefix.as_str()),
                subspan(prefix.start(), prefix.end()),
                Some(format!(
                    "Add an xmlns:{}=\"..\" attribute to define this prefix",
                    prefix.as_str()
                )),
            )],
            ReaderError::UndefinedEntity { name, span } => vec![error(
                format!("The entity &{name}; is not defined"),
                subspan(span.start, span.end),
                Some("undefined".to_string()),
            )],
            ReaderError::InvalidOrUnclosedEntity { span } => vec![error(
                "Invalid or unclosed entity reference".to_string(),
                subspan(span.start, span.end),
                None,
            )],
            ReaderError::ExternalEntity { name } => vec![error(
                format!("External entity {:?} is not supported", name.as_str()),
                subspan(name.start(), name.end()),
                None,
            )],
            ReaderError::MismatchedEndTag { open, close } => {
                let mut d = error(
                    "End tag does not match the open element".to_string(),
                    subspan(close.start(), close.end()),
                    Some("this end tag".to_string()),
                );
                d.spans.push(codemap_diagnostic::SpanLabel {
                    span: subspan(open.start(), open.end()),
                    label: Some("closes this element".to_string()),
                    style: codemap_diagnostic::SpanStyle::Secondary,
                });
                vec![d]
            }
            ReaderError::UnexpectedEndTag { span } => vec![error(
                "End tag with no open element".to_string(),
                subspan(span.start(), span.end()),
                Some("Remove this".to_string()),
            )],
            ReaderError::UnclosedElement { open } => vec![error(
                "Element is not closed before the end of the document".to_string(),
                subspan(open.start(), open.end()),
                None,
            )],
        };
        (map, diagnostics)
    }
}

/// Incremental byte offset → line/column conversion. Events only move
/// forward, so each byte of the source is looked at once.
#[derive(Debug)]
struct Position {
    offset: usize,
    line: u32,
    column: u32,
}

impl Default for Position {
    fn default() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl Position {
    fn advance_to(&mut self, source: &str, offset: usize) {
        if offset <= self.offset {
            return;
        }
        for c in source[self.offset..offset].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset = offset;
    }
}

#[derive(Debug)]
enum Txt<'a> {
    Text(&'a str),
    /// A general entity reference, and the offset of its name.
    Entity(usize, &'a str),
    Char(char),
}

/// The replacement text of an internal entity. Character references are
/// expanded now; general entity references are kept as written.
fn replacement_text(value: StrSpan<'_>) -> Result<Cow<'_, str>, ReaderError<'_>> {
    let raw = value.as_str();
    if !raw.contains('&') {
        return Ok(Cow::Borrowed(raw));
    }
    let mut text = String::with_capacity(raw.len());
    for part in parse_entities(value.start(), raw) {
        match part? {
            Txt::Text(t) => text.push_str(t),
            Txt::Entity(_, name) => {
                text.push('&');
                text.push_str(name);
                text.push(';');
            }
            Txt::Char(c) => text.push(c),
        }
    }
    Ok(Cow::Owned(text))
}

/// Splits text into literal runs and references. `pos` is the offset of
/// `text` in the document, used for error spans.
fn parse_entities(
    pos: usize,
    text: &str,
) -> impl Iterator<Item = Result<Txt<'_>, ReaderError<'_>>> {
    struct Entities<'a> {
        text: &'a str,
        pos: usize,
        offset: usize,
        in_entity: bool,
    }
    impl<'a> Iterator for Entities<'a> {
        type Item = Result<Txt<'a>, ReaderError<'a>>;

        fn next(&mut self) -> Option<Self::Item> {
            if self.offset == self.text.len() {
                return None;
            }
            for (i, c) in self.text[self.offset..].char_indices() {
                if self.in_entity {
                    if c == ';' {
                        self.in_entity = false;
                        let name = &self.text[self.offset..self.offset + i];
                        let at = self.pos + self.offset;
                        let result = match name.strip_prefix('#') {
                            Some(number) => numeric_entity(at, number),
                            None => Ok(Txt::Entity(at, name)),
                        };
                        self.offset += i + 1;
                        return Some(result);
                    }
                } else if c == '&' {
                    self.in_entity = true;
                    let result = Txt::Text(&self.text[self.offset..self.offset + i]);
                    self.offset += i + 1;
                    return Some(Ok(result));
                }
            }
            if self.in_entity {
                let at = self.pos + self.offset;
                self.offset = self.text.len();
                Some(Err(ReaderError::InvalidOrUnclosedEntity {
                    span: at - 1..at,
                }))
            } else {
                let result = Txt::Text(&self.text[self.offset..]);
                self.offset = self.text.len();
                Some(Ok(result))
            }
        }
    }
    fn numeric_entity(pos: usize, number: &str) -> Result<Txt<'_>, ReaderError<'_>> {
        let invalid = || ReaderError::InvalidOrUnclosedEntity {
            span: pos..pos + number.len() + 1,
        };
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).map_err(|_| invalid())?,
            None => number.parse().map_err(|_| invalid())?,
        };
        std::char::from_u32(code)
            .map(Txt::Char)
            .ok_or_else(invalid)
    }
    Entities {
        text,
        pos,
        offset: 0,
        in_entity: false,
    }
}

#[derive(Default)]
struct ElementStack<'a> {
    elements: Vec<ElementState<'a>>,
}

impl<'a> ElementStack<'a> {
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<&'a str> {
        self.elements
            .iter()
            .rev()
            .find_map(|elem| elem.lookup_namespace_uri(prefix))
    }

    /// Resolves a prefix; the empty prefix means the default namespace,
    /// which is the empty string when none is in scope.
    fn try_lookup_namespace_uri(&self, prefix: StrSpan<'a>) -> Result<&'a str, ReaderError<'a>> {
        match prefix.as_str() {
            "" => Ok(self.lookup_namespace_uri("").unwrap_or("")),
            "xml" => Ok(XML_NAMESPACE_URI),
            p => self
                .lookup_namespace_uri(p)
                .ok_or(ReaderError::UndefinedNamespacePrefix { prefix }),
        }
    }

    fn push(&mut self, prefix: StrSpan<'a>, local: StrSpan<'a>, span: StrSpan<'a>) {
        self.elements.push(ElementState {
            prefix,
            local,
            span,
            namespaces: vec![],
            attributes: vec![],
        })
    }

    fn pop(&mut self) {
        self.elements.pop();
    }

    fn add_attr(
        &mut self,
        prefix: StrSpan<'a>,
        local: StrSpan<'a>,
        value: StrSpan<'a>,
    ) {
        // the tokenizer only yields attributes inside a start tag
        let Some(element) = self.elements.last_mut() else {
            return;
        };
        if prefix.as_str() == "xmlns" {
            element.namespaces.push(Ns {
                prefix: local.as_str(),
                namespace_uri: value.as_str(),
            })
        } else if prefix.as_str().is_empty() && local.as_str() == "xmlns" {
            element.namespaces.push(Ns {
                prefix: "",
                namespace_uri: value.as_str(),
            })
        } else {
            element.attributes.push(UnresolvedAttr {
                prefix,
                local,
                value,
            })
        }
    }

    fn current_element(&self) -> Result<(&'a str, &'a str), ReaderError<'a>> {
        match self.elements.last() {
            Some(curr) => Ok((self.try_lookup_namespace_uri(curr.prefix)?, curr.local.as_str())),
            None => Ok(("", "")),
        }
    }

    fn current_attributes(&self) -> impl Iterator<Item = &UnresolvedAttr<'a>> {
        self.elements
            .last()
            .into_iter()
            .flat_map(|e| e.attributes.iter())
    }
}

struct UnresolvedAttr<'a> {
    prefix: StrSpan<'a>,
    local: StrSpan<'a>,
    value: StrSpan<'a>,
}

struct ElementState<'a> {
    prefix: StrSpan<'a>,
    local: StrSpan<'a>,
    /// The start tag's name, for error spans.
    span: StrSpan<'a>,
    namespaces: Vec<Ns<'a>>,
    attributes: Vec<UnresolvedAttr<'a>>,
}

impl<'a> ElementState<'a> {
    fn lookup_namespace_uri(&self, prefix: &str) -> Option<&'a str> {
        self.namespaces
            .iter()
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.namespace_uri)
    }
}

struct Ns<'a> {
    prefix: &'a str,
    namespace_uri: &'a str,
}
