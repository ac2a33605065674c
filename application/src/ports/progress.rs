//! Progress notification port
//!
//! Defines the interface for reporting progress during an extraction run.

use extract_domain::{AgentStatus, ProviderId, SessionStatus};

/// Callback for progress updates during an extraction run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once the provider set is resolved and tasks are about to launch
    fn on_run_start(&self, providers: &[ProviderId]);

    /// Called when a provider's task moves to `extracting`
    fn on_agent_start(&self, _provider: &ProviderId) {}

    /// Called when a provider's task settles
    fn on_agent_complete(&self, provider: &ProviderId, status: AgentStatus);

    /// Called after every launched task settled
    fn on_run_complete(&self, status: SessionStatus);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_run_start(&self, _providers: &[ProviderId]) {}
    fn on_agent_complete(&self, _provider: &ProviderId, _status: AgentStatus) {}
    fn on_run_complete(&self, _status: SessionStatus) {}
}
