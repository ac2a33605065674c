//! Extraction backend port
//!
//! Defines the capability every provider adapter offers: given a compiled
//! output contract and the document text, return one [`FieldRecord`] per
//! schema field or fail.
//!
//! [`FieldRecord`]: extract_domain::FieldRecord

use async_trait::async_trait;
use extract_domain::{AdapterErrorKind, FieldRecords, OutputContract, ProviderId};
use serde::Serialize;
use thiserror::Error;

/// Failure to obtain any structured answer from a backend
///
/// Low confidence is never an error; this covers only the cases where no
/// contract-conforming answer could be obtained.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{kind}: {message}")]
pub struct AdapterError {
    pub kind: AdapterErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Timeout, message)
    }

    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::AuthFailure, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::RateLimited, message)
    }

    pub fn malformed_output(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::MalformedOutput, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::TransportError, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(AdapterErrorKind::Unknown, message)
    }
}

/// One provider's extraction capability
///
/// Implementations must return exactly the schema's fields (undeterminable
/// fields included, as empty low-confidence records) or fail with
/// [`AdapterErrorKind::MalformedOutput`]. They never retry internally.
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Provider this backend speaks for
    fn provider(&self) -> &ProviderId;

    /// Model used for extraction
    fn model_name(&self) -> &str;

    /// Extract every field of the contract from the document text
    async fn extract(
        &self,
        contract: &OutputContract,
        document: &str,
    ) -> Result<FieldRecords, AdapterError>;
}
