//! Document sources
//!
//! The core treats document text as opaque; this module only reads it.

mod file_source;

pub use file_source::{DocumentError, FileDocumentSource};
