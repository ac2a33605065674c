//! Infrastructure layer for quorum-extract
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: provider HTTP backends, the session store,
//! file loaders, configuration and the audit log.

pub mod config;
pub mod document;
pub mod logging;
pub mod providers;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAuditConfig, FileConfig, FileExtractionConfig,
    FileOutputConfig, FileOutputFormat, FileProviderConfig, FileProviderKind,
};
pub use document::{DocumentError, FileDocumentSource};
pub use logging::JsonlAuditLogger;
pub use providers::{StructuredExtractionAdapter, build_backends};
pub use schema::{SchemaLoadError, SchemaLoader};
pub use store::InMemoryExtractionStore;
