use std::fmt;
use std::sync::Arc;

/// Snapshot of where in the source document an event happened.
///
/// Lines and columns are 1-based. Identifiers are shared between all the
/// locators of one document, so cloning is cheap.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Locator {
    pub public_id: Option<Arc<str>>,
    pub system_id: Option<Arc<str>>,
    pub line: u32,
    pub column: u32,
}

impl Locator {
    pub fn new(line: u32, column: u32) -> Locator {
        Locator {
            public_id: None,
            system_id: None,
            line,
            column,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.system_id {
            write!(f, "{}:", id)?;
        }
        write!(f, "{}:{}", self.line, self.column)
    }
}
