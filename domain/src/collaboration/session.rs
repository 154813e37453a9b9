//! State of one delegated collaboration.
//!
//! A [`CollaborationSession`] is created for a single delegated request,
//! borrowed mutably by the turn loop, and consumed by [`CollaborationSession::finish`].
//! The original snapshot is never mutated after [`CollaborationSession::begin`].

use super::agent::AgentId;
use crate::document::Document;
use crate::edit::{ApplyReport, EditDirective, apply_directives, summarize};
use serde::Serialize;
use tracing::debug;

/// An accepted directive and the agent that proposed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingEdit {
    pub agent: AgentId,
    pub directive: EditDirective,
}

/// One log line per agent turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionEntry {
    pub agent: AgentId,
    pub label: String,
    pub turn: u8,
    pub summary: String,
    pub edit_count: usize,
    pub succeeded: bool,
}

#[derive(Debug, Clone)]
pub struct CollaborationSession {
    original: Document,
    working: Document,
    pending_edits: Vec<PendingEdit>,
    log: Vec<ContributionEntry>,
}

impl CollaborationSession {
    /// Snapshot `document` as both original and working copy.
    pub fn begin(document: Document) -> Self {
        Self {
            working: document.clone(),
            original: document,
            pending_edits: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn original(&self) -> &Document {
        &self.original
    }

    /// The scratchpad agents see and edit.
    pub fn working(&self) -> &Document {
        &self.working
    }

    pub fn pending_edits(&self) -> &[PendingEdit] {
        &self.pending_edits
    }

    pub fn log(&self) -> &[ContributionEntry] {
        &self.log
    }

    /// Fold one agent's directives into the working copy.
    pub fn record_waypoint(
        &mut self,
        agent: &AgentId,
        label: &str,
        turn: u8,
        directives: &[EditDirective],
    ) -> ApplyReport {
        let report = apply_directives(&mut self.working, directives);
        self.pending_edits
            .extend(report.applied.iter().cloned().map(|directive| PendingEdit {
                agent: agent.clone(),
                directive,
            }));

        let summary = if directives.is_empty() {
            "no edits proposed".to_string()
        } else {
            summarize(&report.applied)
        };
        debug!(agent = %agent, turn, summary = %summary, "Waypoint recorded");
        self.log.push(ContributionEntry {
            agent: agent.clone(),
            label: label.to_string(),
            turn,
            summary,
            edit_count: report.applied_count(),
            succeeded: true,
        });
        report
    }

    /// Log a failed turn. The working copy is untouched.
    pub fn record_failure(&mut self, agent: &AgentId, label: &str, turn: u8, reason: &str) {
        self.log.push(ContributionEntry {
            agent: agent.clone(),
            label: label.to_string(),
            turn,
            summary: format!("failed: {reason}"),
            edit_count: 0,
            succeeded: false,
        });
    }

    pub fn has_drift(&self) -> bool {
        self.working != self.original
    }

    /// Distinct labels of agents with at least one successful turn,
    /// in order of first appearance.
    pub fn contributors(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for entry in self.log.iter().filter(|e| e.succeeded) {
            if !labels.contains(&entry.label) {
                labels.push(entry.label.clone());
            }
        }
        labels
    }

    /// Discard every waypoint.
    pub fn rollback(&mut self) {
        self.working = self.original.clone();
        self.pending_edits.clear();
    }

    /// Consume the session. Nothing can be recorded afterwards.
    pub fn finish(self) -> SessionSummary {
        SessionSummary {
            has_drift: self.has_drift(),
            contributors: self.contributors(),
            original: self.original,
            working: self.working,
            pending_edits: self.pending_edits,
            log: self.log,
        }
    }
}

/// What is left of a session once the turn loop is over.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub original: Document,
    pub working: Document,
    pub pending_edits: Vec<PendingEdit>,
    pub log: Vec<ContributionEntry>,
    pub contributors: Vec<String>,
    pub has_drift: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CollaborationSession {
        CollaborationSession::begin(Document::from_html(
            "Notes",
            r#"<p data-id="el-1">Alpha</p><p data-id="el-2">Beta</p>"#,
        ))
    }

    fn modify(target: &str, payload: &str) -> EditDirective {
        EditDirective::Modify {
            target: target.into(),
            payload: payload.into(),
        }
    }

    #[test]
    fn test_waypoint_updates_working_only() {
        let mut s = session();
        let original = s.original().clone();
        let report = s.record_waypoint(&"agent-1".into(), "Critic", 1, &[modify("el-1", "<p>Gamma</p>")]);
        assert_eq!(report.applied_count(), 1);
        assert_eq!(s.original(), &original);
        assert!(s.has_drift());
        assert_eq!(s.pending_edits().len(), 1);
        assert_eq!(s.log()[0].summary, "1 modified");
    }

    #[test]
    fn test_skipped_directives_are_not_pending() {
        let mut s = session();
        s.record_waypoint(
            &"lead".into(),
            "Lead",
            1,
            &[
                EditDirective::Delete {
                    target: "el-2".into(),
                },
                modify("el-2", "<p>again</p>"),
            ],
        );
        assert_eq!(s.pending_edits().len(), 1);
        assert_eq!(s.log()[0].edit_count, 1);
    }

    #[test]
    fn test_contributors_skip_failures() {
        let mut s = session();
        s.record_waypoint(&"lead".into(), "Lead", 1, &[]);
        s.record_failure(&"agent-1".into(), "Critic", 1, "timeout");
        s.record_waypoint(&"lead".into(), "Lead", 2, &[]);
        assert_eq!(s.contributors(), vec!["Lead"]);
        assert_eq!(s.log()[0].summary, "no edits proposed");
        assert!(!s.has_drift());
    }

    #[test]
    fn test_rollback_and_finish() {
        let mut s = session();
        s.record_waypoint(&"lead".into(), "Lead", 1, &[modify("el-2", "<p>Changed</p>")]);
        s.rollback();
        assert!(!s.has_drift());
        assert!(s.pending_edits().is_empty());

        let summary = s.finish();
        assert!(!summary.has_drift);
        assert_eq!(summary.log.len(), 1);
        assert_eq!(summary.contributors, vec!["Lead"]);
    }

    #[test]
    fn test_finish_hands_over_working_copy() {
        let mut s = session();
        s.record_waypoint(&"agent-1".into(), "Critic", 1, &[modify("el-1", "<p>Gamma</p>")]);

        let summary = s.finish();
        assert!(summary.has_drift);
        assert_ne!(summary.working, summary.original);
        assert_eq!(summary.pending_edits[0].agent, "agent-1".into());
        assert_eq!(summary.contributors, vec!["Critic"]);
    }
}
