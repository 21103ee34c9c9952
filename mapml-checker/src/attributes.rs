/// One attribute of a start tag, with its namespace already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Empty for attributes in no namespace.
    pub uri: String,
    pub local_name: String,
    pub value: String,
    /// Declared as type `ID` by the document's DTD.
    pub is_id: bool,
}

/// The attributes of a start tag, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    attrs: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Attributes {
        Attributes::default()
    }

    pub fn push(&mut self, uri: &str, local_name: &str, value: impl Into<String>) {
        self.attrs.push(Attribute {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            value: value.into(),
            is_id: false,
        })
    }

    pub fn push_attribute(&mut self, attr: Attribute) {
        self.attrs.push(attr)
    }

    pub fn get(&self, uri: &str, local_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.local_name == local_name && a.uri == uri)
            .map(|a| a.value.as_str())
    }

    pub fn contains(&self, uri: &str, local_name: &str) -> bool {
        self.get(uri, local_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Builds no-namespace attributes from `(name, value)` pairs.
impl<'s> FromIterator<(&'s str, &'s str)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (&'s str, &'s str)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (name, value) in iter {
            attrs.push("", name, value);
        }
        attrs
    }
}
