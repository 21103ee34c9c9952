//! Document-scoped bookkeeping for references that can only be resolved once
//! their target scope has been fully seen.

use crate::locator::Locator;
use fnv::FnvHashSet;

/// A reference to an ID (or template variable name) that has not been
/// resolved yet, with the place it was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct IdrefLocator {
    pub locator: Locator,
    pub idref: String,
    /// Extra text appended to the diagnostic if the reference never resolves.
    pub additional: Option<String>,
}

impl IdrefLocator {
    pub fn new(locator: Locator, idref: impl Into<String>) -> IdrefLocator {
        IdrefLocator {
            locator,
            idref: idref.into(),
            additional: None,
        }
    }

    pub fn with_additional(mut self, additional: String) -> IdrefLocator {
        self.additional = Some(additional);
        self
    }
}

/// References waiting for a target, and the targets seen so far.
///
/// References keep insertion order so that diagnostics come out in document
/// order.
#[derive(Debug, Default)]
pub(crate) struct References {
    pending: Vec<IdrefLocator>,
    targets: FnvHashSet<String>,
}

impl References {
    pub fn refer(&mut self, reference: IdrefLocator) {
        self.pending.push(reference)
    }

    pub fn define(&mut self, id: impl Into<String>) {
        self.targets.insert(id.into());
    }

    pub fn define_all<'s>(&mut self, ids: impl IntoIterator<Item = &'s String>) {
        self.targets.extend(ids.into_iter().cloned())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Removes every pending reference, yielding the ones that never found a
    /// target. Targets are kept.
    pub fn drain_unresolved(&mut self) -> Vec<IdrefLocator> {
        let targets = &self.targets;
        self.pending
            .drain(..)
            .filter(|r| !targets.contains(&r.idref))
            .collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.targets.clear();
    }
}

/// All of the reference registries of one document.
#[derive(Debug, Default)]
pub(crate) struct Registries {
    /// `<label for>` → labelable form control IDs.
    pub form_controls: References,
    /// `form` attributes → `<form>` IDs.
    pub form_elements: References,
    /// `<input list>` → `<datalist>` IDs.
    pub lists: References,
    /// `{name}` in `<link tref>` → `name` of `<input>`/`<select>`; drained
    /// at each `</extent>`.
    pub template_variables: References,
    /// Locators of `<link>`s with both `self` and `style` relations.
    pub self_styles: Vec<Locator>,
}

impl Registries {
    pub fn clear(&mut self) {
        self.form_controls.clear();
        self.form_elements.clear();
        self.lists.clear();
        self.template_variables.clear();
        self.self_styles.clear();
    }
}
