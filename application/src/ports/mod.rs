//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod audit_logger;
pub mod extraction_backend;
pub mod extraction_store;
pub mod progress;
