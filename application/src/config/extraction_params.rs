//! Extraction parameters (orchestrator run control)
//!
//! [`ExtractionParams`] groups the static parameters that control how
//! [`RunExtractionUseCase`](crate::use_cases::run_extraction::RunExtractionUseCase)
//! launches agent tasks. These are application-layer concerns, not domain
//! policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bounded wait on each agent's backend call
pub const DEFAULT_AGENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Orchestrator run control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionParams {
    /// Bounded wait on each agent's backend call
    pub agent_timeout: Duration,
}

impl Default for ExtractionParams {
    fn default() -> Self {
        Self {
            agent_timeout: DEFAULT_AGENT_TIMEOUT,
        }
    }
}

impl ExtractionParams {
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Build params from an optional timeout in seconds
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        match seconds {
            Some(s) => Self::default().with_agent_timeout(Duration::from_secs(s)),
            None => Self::default(),
        }
    }
}
