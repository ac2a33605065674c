//! Application-level configuration.
//!
//! - [`ExtractionParams`]: orchestrator run control (per-agent timeout)

pub mod extraction_params;

pub use extraction_params::ExtractionParams;
