//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ProviderId`]: extraction providers and their canonical order
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod provider;
