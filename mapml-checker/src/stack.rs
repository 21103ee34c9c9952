use crate::locator::Locator;
use crate::tables::{AncestorMask, SpecialAncestor};
use fnv::{FnvHashMap, FnvHashSet};

/// State kept for one open element.
///
/// Flags are set by descendants (on their parent frame) or by the element's
/// own start tag, and read back when the element ends.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    ancestor_mask: AncestorMask,
    /// `None` for elements outside the XHTML namespace.
    pub name: Option<String>,
    pub locator: Locator,
    pub text_content: String,
    pub active_descendant: Option<String>,

    pub non_empty_option: Option<Locator>,
    pub selected_options: bool,
    pub option_needed: bool,
    pub option_found: bool,
    pub no_value_option_found: bool,
    pub is_collecting_characters: bool,

    pub zoom_found: bool,
    pub has_action: bool,
    pub query_found: bool,
    pub templated_link_found: bool,
    /// Coordinate system → axis names seen on `<input type="location">`
    /// children. Only `<extent>` frames collect these.
    pub axes_found: FnvHashMap<String, FnvHashSet<String>>,
}

impl Frame {
    pub fn new(ancestor_mask: AncestorMask, name: Option<String>, locator: Locator) -> Frame {
        Frame {
            ancestor_mask,
            name,
            locator,
            ..Frame::default()
        }
    }

    /// The mask a child of this element inherits.
    pub fn child_mask(&self) -> AncestorMask {
        match self.name.as_deref().and_then(SpecialAncestor::from_name) {
            Some(a) => self.ancestor_mask.with(a),
            None => self.ancestor_mask,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn set_found_axis(&mut self, cs: &str, axis: &str) {
        self.axes_found
            .entry(cs.to_string())
            .or_default()
            .insert(axis.to_string());
    }
}

const INITIAL_CAPACITY: usize = 32;

#[derive(Debug)]
pub(crate) struct ElementStack {
    frames: Vec<Frame>,
}

impl Default for ElementStack {
    fn default() -> Self {
        ElementStack {
            frames: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }
}

impl ElementStack {
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame)
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// The frame just below the top, i.e. the parent of the current element.
    pub fn parent_mut(&mut self) -> Option<&mut Frame> {
        let len = self.frames.len();
        if len < 2 {
            None
        } else {
            self.frames.get_mut(len - 2)
        }
    }

    /// Depth of the innermost open element called `name`.
    pub fn nearest(&self, name: &str) -> Option<usize> {
        self.frames.iter().rposition(|f| f.is(name))
    }

    pub fn get(&self, depth: usize) -> Option<&Frame> {
        self.frames.get(depth)
    }

    pub fn get_mut(&mut self, depth: usize) -> Option<&mut Frame> {
        self.frames.get_mut(depth)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.frames.shrink_to(INITIAL_CAPACITY);
    }
}
