//! vgreport common - model, parser and correlation for Valgrind XML reports.
//!
//! Pipeline: `parser` turns the XML into `ErrorRecord`s, `index` anchors them
//! to the tracked source tree and serves file → line → kind views, and
//! `correlator` produces the page data a renderer consumes.

pub mod config;
pub mod correlator;
pub mod error;
pub mod index;
pub mod locator;
pub mod model;
pub mod parser;

pub use config::ReportConfig;
pub use correlator::{Correlator, WindowSize, INDEX_PAGE};
pub use error::{ReportError, Result};
pub use index::{ErrorSet, IndexedError, View};
pub use locator::{find_first_source_reference, resolve_display_path, PathSubstitution, TrackedRoot};
pub use model::{ErrorRecord, Frame};
pub use parser::{parse_file, ParseOptions};
