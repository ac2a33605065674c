//! Domain layer for quorum-extract
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Schema Contract
//!
//! The ordered list of fields every provider is asked to extract. Compiled
//! once per session into an [`OutputContract`] that every provider answer is
//! validated against.
//!
//! ## Agent Extraction
//!
//! One provider's attempt for one session, with a forward-only lifecycle
//! (`pending → extracting → completed | failed`).
//!
//! ## Consensus
//!
//! Field-by-field comparison of completed extractions: agreement
//! classification, a proposed consensus value, and the session agreement rate.

pub mod config;
pub mod consensus;
pub mod core;
pub mod extraction;
pub mod prompt;
pub mod schema;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use consensus::{
    Acceptance, Agreement, ConsensusEngine, ConsensusReport, FieldComparison, ProviderValue,
};
pub use core::{error::DomainError, provider::ProviderId};
pub use extraction::{
    AcceptedValue, AdapterErrorKind, AgentExtraction, AgentStatus, Confidence, ExtractionSession,
    FieldRecord, FieldRecords, FieldValue, SessionId, SessionStatus, SourceLocation,
};
pub use prompt::PromptTemplate;
pub use schema::{Field, OutputContract, SchemaContract, ValueKind};
