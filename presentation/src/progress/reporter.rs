//! Progress reporting for collaborations

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use cowrite_application::ports::progress::CollaborationProgress;
use cowrite_domain::{Action, Agent, ApplyReport, Decision};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Streams each agent's reply under its coloured label, with a spinner
/// while waiting on classification and reconciliation.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn start_spinner(&self, message: &'static str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(SPINNER_TICK);
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(pb);
        }
    }

    fn finish_spinner(&self, message: String) {
        if let Some(pb) = self.spinner.lock().ok().and_then(|mut slot| slot.take()) {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// `── Turn 2/3 ──`
pub fn turn_banner(turn: u8, total_turns: u8) -> String {
    format!("── Turn {turn}/{total_turns} ──")
}

pub fn decision_summary(decision: &Decision) -> String {
    match decision.action {
        Action::Direct => "Answering directly".to_string(),
        Action::Delegate => format!("Delegating: {}", decision.task),
    }
}

pub fn waypoint_summary(agent: &Agent, report: &ApplyReport) -> String {
    let mut summary = format!("{}: {} edit(s) applied", agent.label, report.applied_count());
    if !report.warnings.is_empty() {
        summary.push_str(&format!(", {} skipped", report.warnings.len()));
    }
    summary
}

impl CollaborationProgress for ProgressReporter {
    fn on_classification_start(&self) {
        self.start_spinner("Classifying request...");
    }

    fn on_classified(&self, decision: &Decision) {
        self.finish_spinner(format!("{} {}", "v".green(), decision_summary(decision)));
    }

    fn on_turn_start(&self, turn: u8, total_turns: u8) {
        println!();
        println!("{}", turn_banner(turn, total_turns).cyan().bold());
    }

    fn on_notice(&self, message: &str) {
        println!("{} {}", "!".yellow().bold(), message.yellow());
    }

    fn on_agent_stream_start(&self, agent: &Agent, _turn: u8) {
        println!();
        print!("{} ", format!("{}:", ConsoleFormatter::agent_label(agent)).bold());
        let _ = std::io::stdout().flush();
    }

    fn on_agent_chunk(&self, _agent: &Agent, chunk: &str) {
        print!("{chunk}");
        let _ = std::io::stdout().flush();
    }

    fn on_agent_stream_end(&self, _agent: &Agent) {
        println!();
    }

    fn on_agent_failed(&self, agent: &Agent, turn: u8, reason: &str) {
        eprintln!(
            "{} {} failed on turn {}: {}",
            "x".red(),
            ConsoleFormatter::agent_label(agent),
            turn,
            reason.red()
        );
    }

    fn on_waypoint(&self, agent: &Agent, report: &ApplyReport) {
        println!("  {} {}", "v".green(), waypoint_summary(agent, report).dimmed());
    }

    fn on_reconciliation_start(&self) {
        self.start_spinner("Reconciling changes...");
    }

    fn on_reconciliation_complete(&self, entries: usize) {
        self.finish_spinner(format!("{} {} change(s) reconciled", "v".green(), entries));
    }
}

/// Plain progress for `--quiet`: notices and failures only.
pub struct SimpleProgress;

impl CollaborationProgress for SimpleProgress {
    fn on_classified(&self, _decision: &Decision) {}

    fn on_turn_start(&self, _turn: u8, _total_turns: u8) {}

    fn on_notice(&self, message: &str) {
        println!("{message}");
    }

    fn on_agent_failed(&self, agent: &Agent, turn: u8, reason: &str) {
        eprintln!("{} failed on turn {}: {}", agent.label, turn, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowrite_domain::{AgentRoster, ApplyWarning, EditAction, ElementId};

    #[test]
    fn test_summaries() {
        assert_eq!(turn_banner(2, 3), "── Turn 2/3 ──");
        assert_eq!(
            decision_summary(&Decision::fallback("write an intro")),
            "Delegating: write an intro"
        );

        let lead = AgentRoster::new().with_lead("default").full_roster().remove(0);
        let report = ApplyReport {
            applied: Vec::new(),
            warnings: vec![ApplyWarning::MissingAnchor {
                action: EditAction::Modify,
                id: ElementId::new("el-9"),
            }],
            introduced: Vec::new(),
        };
        assert_eq!(waypoint_summary(&lead, &report), "Lead: 0 edit(s) applied, 1 skipped");
    }

    #[test]
    fn test_spinner_lifecycle() {
        let reporter = ProgressReporter::new();
        reporter.on_reconciliation_start();
        reporter.on_reconciliation_complete(2);
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
