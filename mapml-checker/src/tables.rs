//! Static data consulted by the checker.
//!
//! Everything here is built once, on first use, and never modified afterwards,
//! so a table may be shared by any number of checker instances.

use fnv::FnvHashMap;
use lazy_static::lazy_static;

pub const XHTML_NAMESPACE_URI: &str = "http://www.w3.org/1999/xhtml";

/// Prefix of the request properties set when a use counter fires.
pub const USE_COUNTER_PREFIX: &str = "http://validator.nu/properties/";

pub const STYLE_ELEMENT_ERRORS_FOUND: &str = "style-element-errors-found";
pub const STYLE_ATTRIBUTE_ERRORS_FOUND: &str = "style-attribute-errors-found";

/// Elements whose presence as an ancestor is tracked in every frame's
/// [`AncestorMask`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecialAncestor {
    Head = 0,
    Body = 1,
    Extent = 2,
}

impl SpecialAncestor {
    pub const ALL: [SpecialAncestor; 3] = [
        SpecialAncestor::Head,
        SpecialAncestor::Body,
        SpecialAncestor::Extent,
    ];

    pub fn from_name(name: &str) -> Option<SpecialAncestor> {
        match name {
            "head" => Some(SpecialAncestor::Head),
            "body" => Some(SpecialAncestor::Body),
            "extent" => Some(SpecialAncestor::Extent),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialAncestor::Head => "head",
            SpecialAncestor::Body => "body",
            SpecialAncestor::Extent => "extent",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A set of [`SpecialAncestor`]s, one bit each.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AncestorMask(u8);

impl AncestorMask {
    pub const EMPTY: AncestorMask = AncestorMask(0);

    pub fn contains(self, ancestor: SpecialAncestor) -> bool {
        self.0 & ancestor.bit() != 0
    }

    pub fn with(self, ancestor: SpecialAncestor) -> AncestorMask {
        AncestorMask(self.0 | ancestor.bit())
    }

    pub fn intersection(self, other: AncestorMask) -> AncestorMask {
        AncestorMask(self.0 & other.0)
    }

    /// The members of the set, in index order.
    pub fn iter(self) -> impl Iterator<Item = SpecialAncestor> {
        SpecialAncestor::ALL
            .into_iter()
            .filter(move |a| self.contains(*a))
    }
}

fn register_prohibited_ancestor(
    table: &mut FnvHashMap<&'static str, AncestorMask>,
    ancestor: &'static str,
    descendant: &'static str,
) {
    let ancestor = SpecialAncestor::from_name(ancestor)
        .unwrap_or_else(|| panic!("Ancestor not found in special ancestors: {ancestor}"));
    let mask = table.entry(descendant).or_default();
    *mask = mask.with(ancestor);
}

/// Coordinate systems and the pair of axis names each one uses.
pub const COORDINATE_SYSTEM_AXES: &[(&str, [&str; 2])] = &[
    ("tilematrix", ["row", "column"]),
    ("map", ["i", "j"]),
    ("tile", ["i", "j"]),
    ("tcrs", ["x", "y"]),
    ("gcrs", ["latitude", "longitude"]),
    ("pcrs", ["easting", "northing"]),
];

pub fn coordinate_system_axes(cs: &str) -> Option<&'static [&'static str; 2]> {
    COORDINATE_SYSTEM_AXES
        .iter()
        .find(|(name, _)| *name == cs)
        .map(|(_, axes)| axes)
}

/// Attributes of `<input>` that only make sense for some input types.
const INPUT_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("min", &["zoom", "location", "width", "height"]),
    ("max", &["zoom", "location", "width", "height"]),
    ("units", &["location"]),
    ("axis", &["location"]),
    ("position", &["location"]),
    ("shard", &["hidden"]),
    (
        "autocomplete",
        &[
            "hidden", "text", "search", "url", "tel", "email", "password", "date", "month",
            "week", "time", "datetime-local", "number", "range", "color",
        ],
    ),
    (
        "list",
        &[
            "text", "search", "url", "tel", "email", "date", "month", "week", "time",
            "datetime-local", "number", "range", "color",
        ],
    ),
    ("maxlength", &["text", "search", "url", "tel", "email", "password"]),
    ("minlength", &["text", "search", "url", "tel", "email", "password"]),
    ("pattern", &["text", "search", "url", "tel", "email", "password"]),
    (
        "placeholder",
        &["text", "search", "url", "tel", "email", "password", "number"],
    ),
    (
        "readonly",
        &[
            "text", "search", "url", "tel", "email", "password", "date", "month", "week",
            "time", "datetime-local", "number",
        ],
    ),
    (
        "required",
        &[
            "text", "search", "url", "tel", "email", "password", "date", "month", "week",
            "time", "datetime-local", "number", "checkbox", "radio", "file",
        ],
    ),
    ("size", &["text", "search", "url", "tel", "email", "password"]),
];

pub fn allowed_input_types(attribute: &str) -> Option<&'static [&'static str]> {
    INPUT_ATTRIBUTES
        .iter()
        .find(|(name, _)| *name == attribute)
        .map(|(_, types)| *types)
}

/// Boolean attributes that already imply the ARIA state of the same name.
pub const ATTRIBUTES_WITH_IMPLICIT_STATE_OR_PROPERTY: &[&str] =
    &["disabled", "hidden", "readonly", "required"];

/// The implicit role of elements that never need an explicit `role`.
const ELEMENTS_THAT_NEVER_NEED_ROLE: &[(&str, &str)] = &[
    ("body", "document"),
    ("datalist", "listbox"),
    ("details", "group"),
    ("form", "form"),
    ("hr", "separator"),
    ("main", "main"),
    ("math", "math"),
    ("meter", "progressbar"),
    ("nav", "navigation"),
    ("option", "option"),
    ("progress", "progressbar"),
    ("select", "listbox"),
    ("summary", "button"),
    ("textarea", "textbox"),
];

pub fn implicit_element_role(element: &str) -> Option<&'static str> {
    ELEMENTS_THAT_NEVER_NEED_ROLE
        .iter()
        .find(|(name, _)| *name == element)
        .map(|(_, role)| *role)
}

const INPUT_TYPES_WITH_IMPLICIT_ROLE: &[(&str, &str)] = &[
    ("button", "button"),
    ("checkbox", "checkbox"),
    ("image", "button"),
    ("number", "spinbutton"),
    ("radio", "radio"),
    ("range", "slider"),
    ("reset", "button"),
    ("submit", "button"),
];

pub fn implicit_input_role(input_type: &str) -> Option<&'static str> {
    INPUT_TYPES_WITH_IMPLICIT_ROLE
        .iter()
        .find(|(name, _)| *name == input_type)
        .map(|(_, role)| *role)
}

/// Elements whose IDs may be the target of `<label for>`. A hidden `<input>`
/// is excluded separately.
pub const LABELABLE_ELEMENTS: &[&str] = &[
    "button", "input", "meter", "output", "progress", "select", "textarea",
];

/// Elements that may carry a `form` attribute naming their form owner.
pub const FORM_ASSOCIATED_ELEMENTS: &[&str] = &[
    "button", "fieldset", "input", "object", "output", "select", "textarea",
];

lazy_static! {
    pub static ref ANCESTOR_MASK_BY_DESCENDANT: FnvHashMap<&'static str, AncestorMask> = {
        let mut table = FnvHashMap::default();
        register_prohibited_ancestor(&mut table, "extent", "extent");
        table
    };

    /// Inverse of [`COORDINATE_SYSTEM_AXES`]. `i` and `j` name axes of both
    /// `map` and `tile`; the first coordinate system listed wins.
    pub static ref AXIS_TO_COORDINATE_SYSTEM: FnvHashMap<&'static str, &'static str> = {
        let mut table = FnvHashMap::default();
        for (cs, axes) in COORDINATE_SYSTEM_AXES {
            for axis in axes {
                table.entry(*axis).or_insert(*cs);
            }
        }
        table
    };

    pub static ref VARIABLE_NAME_RE: regex::Regex = regex::Regex::new(r"\{([^/]+?)\}").unwrap();
}
