//! Application layer for quorum-extract
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExtractionParams;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    extraction_backend::{AdapterError, ExtractionBackend},
    extraction_store::{ExtractionStore, StoreError},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::accept_value::{AcceptValueError, AcceptValueUseCase};
pub use use_cases::compare::{AgentStatusEntry, CompareError, CompareUseCase, ComparisonReport};
pub use use_cases::run_extraction::{
    AgentOutcome, ExtractionRunOutput, ProviderSelection, RunExtractionError, RunExtractionUseCase,
};
