//! Structural checks for MapML documents.
//!
//! [`Checker`] receives the SAX-style events of a document and reports MapML
//! rule violations to a [`DiagnosticSink`] while the document streams past.
//! [`Reader`] produces those events from source text.
//!
//! ```
//! use mapml_checker::{Checker, CheckerConfig, Collector, Reader};
//!
//! let doc = r#"<mapml xmlns="http://www.w3.org/1999/xhtml"><body><extent/></body></mapml>"#;
//! let mut reader = Reader::new(doc, Checker::new(Collector::new(), CheckerConfig::default()));
//! reader.check_all().unwrap();
//! let found = reader.into_checker().into_sink();
//! assert_eq!(found.errors().count(), 2);
//! ```

mod attributes;
mod checker;
mod css;
mod locator;
mod reader;
mod registry;
pub mod report;
mod sink;
mod stack;
mod tables;
mod util;

pub use attributes::{Attribute, Attributes};
pub use checker::{Checker, CheckerConfig};
pub use css::{CssDiagnostic, CssError, CssParser, NoCss, UNRECOGNIZED};
pub use locator::Locator;
pub use reader::{Reader, ReaderError};
pub use sink::{Collector, Diagnostic, DiagnosticSink, Level, StartHint};
pub use tables::XHTML_NAMESPACE_URI;
pub use util::{equals_ignore_ascii_case, render_type_list, split_on_spaces, trim_spaces};
