//! Extraction domain
//!
//! Field Records produced by providers, the per-provider Agent Extraction
//! lifecycle, and the Extraction Session that owns them.

pub mod agent;
pub mod record;
pub mod session;

pub use agent::{AdapterErrorKind, AgentExtraction, AgentStatus};
pub use record::{Confidence, FieldRecord, FieldRecords, FieldValue, SourceLocation};
pub use session::{AcceptedValue, ExtractionSession, SessionId, SessionStatus};
