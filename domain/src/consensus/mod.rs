//! Consensus domain
//!
//! Reconciles the per-field answers of independent providers.
//!
//! ```text
//! ┌───────────┐  ┌───────────┐  ┌───────────┐
//! │  gemini   │  │  claude   │  │  openai   │   completed Agent Extractions
//! └─────┬─────┘  └─────┬─────┘  └─────┬─────┘
//!       └──────────────┼──────────────┘
//!                      ▼
//!            ConsensusEngine::compare      (pure, no I/O)
//!                      ▼
//!   FieldComparison per field: agreement + consensus value
//!                      ▼
//!        Acceptance (reviewer picks consensus or a provider)
//! ```

pub mod acceptance;
pub mod comparison;
pub mod engine;

pub use acceptance::Acceptance;
pub use comparison::{Agreement, ConsensusReport, FieldComparison, ProviderValue, agreement_rate};
pub use engine::ConsensusEngine;
