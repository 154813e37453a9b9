//! Progress notification port
//!
//! Defines the interface for reporting progress of a collaboration as it
//! happens: classification, each agent's streamed reply, waypoints and
//! reconciliation.

use cowrite_domain::{Agent, ApplyReport, Decision};

/// Callback for progress updates during a collaboration
///
/// Implementations live in the presentation layer.
pub trait CollaborationProgress: Send + Sync {
    /// Called once the request has been classified
    fn on_classified(&self, decision: &Decision);

    /// Called at the start of each turn of a delegated request
    fn on_turn_start(&self, turn: u8, total_turns: u8);

    /// Called for system notices ("No changes were made to the document.")
    fn on_notice(&self, message: &str);

    fn on_classification_start(&self) {}

    // ==================== Agent Stream Callbacks ====================

    fn on_agent_stream_start(&self, _agent: &Agent, _turn: u8) {}

    fn on_agent_chunk(&self, _agent: &Agent, _chunk: &str) {}

    fn on_agent_stream_end(&self, _agent: &Agent) {}

    /// The agent's turn failed; the loop continues with the next agent.
    fn on_agent_failed(&self, _agent: &Agent, _turn: u8, _reason: &str) {}

    /// The agent's directives were folded into the working copy.
    fn on_waypoint(&self, _agent: &Agent, _report: &ApplyReport) {}

    // ==================== Reconciliation ====================

    fn on_reconciliation_start(&self) {}

    fn on_reconciliation_complete(&self, _entries: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl CollaborationProgress for NoProgress {
    fn on_classified(&self, _decision: &Decision) {}
    fn on_turn_start(&self, _turn: u8, _total_turns: u8) {}
    fn on_notice(&self, _message: &str) {}
}
