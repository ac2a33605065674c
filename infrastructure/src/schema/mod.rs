//! Schema file loading

mod loader;

pub use loader::{SchemaLoadError, SchemaLoader};
