//! Run Collaboration use case
//!
//! The delegated turn loop: every agent of the roster speaks once per
//! turn, in roster order, and each reply's `<edits>` are folded into the
//! session's working copy before the next agent starts.
//!
//! Requests are strictly sequential, so the working copy has a single
//! writer and agent order is total (roster position × turn number).

use crate::config::{BehaviorConfig, CancelPolicy};
use crate::ports::chat_store::ChatStore;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{CollaborationProgress, NoProgress};
use crate::use_cases::shared::{preview, request_text};
use cowrite_domain::{
    Agent, AgentId, ApplyReport, Attachment, ChatMessage, CollaborationSession, Document,
    GenerationRequest, InstructionLibrary, PromptTemplate, SessionSummary, parse_directives,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Input for the RunCollaboration use case
#[derive(Debug, Clone)]
pub struct CollaborationInput {
    pub task: String,
    /// Already resolved and clamped
    pub turns: u8,
    pub roster: Vec<Agent>,
    pub library: InstructionLibrary,
    pub document: Document,
}

/// What happened in one agent turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Applied(ApplyReport),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    pub agent: AgentId,
    pub turn: u8,
    pub outcome: TurnOutcome,
}

/// Result of the turn loop.
#[derive(Debug, Clone)]
pub struct CollaborationRun {
    pub summary: SessionSummary,
    pub turns: Vec<TurnRecord>,
}

#[derive(Debug, Clone)]
pub enum CollaborationOutcome {
    /// Every scheduled turn ran
    Completed(CollaborationRun),
    /// Stopped early. With `rolled_back` the working copy was discarded.
    Cancelled {
        run: CollaborationRun,
        rolled_back: bool,
    },
}

impl CollaborationOutcome {
    pub fn run(&self) -> &CollaborationRun {
        match self {
            Self::Completed(run) | Self::Cancelled { run, .. } => run,
        }
    }

    pub fn into_run(self) -> CollaborationRun {
        match self {
            Self::Completed(run) | Self::Cancelled { run, .. } => run,
        }
    }
}

/// Use case for running agents over the shared document
pub struct RunCollaborationUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    chat_store: Arc<dyn ChatStore>,
    logger: Arc<dyn ConversationLogger>,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> RunCollaborationUseCase<G> {
    pub fn new(gateway: Arc<G>, chat_store: Arc<dyn ChatStore>, behavior: BehaviorConfig) -> Self {
        Self {
            gateway,
            chat_store,
            logger: Arc::new(NoConversationLogger),
            behavior,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: CollaborationInput) -> CollaborationOutcome {
        self.execute_with_progress(input, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: CollaborationInput,
        progress: &dyn CollaborationProgress,
        cancel: &CancellationToken,
    ) -> CollaborationOutcome {
        info!(
            agents = input.roster.len(),
            turns = input.turns,
            "Starting collaboration"
        );

        let mut session = CollaborationSession::begin(input.document.clone());
        let mut records = Vec::new();
        // Latest successful reply and who wrote it
        let mut last_reply: Option<(String, String)> = None;
        let mut cancelled = false;

        'turns: for turn in 1..=input.turns {
            progress.on_turn_start(turn, input.turns);

            for agent in &input.roster {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'turns;
                }

                let context = match &last_reply {
                    None => input.task.clone(),
                    Some((label, reply)) => format!("{label} wrote:\n\n{reply}"),
                };
                let request = self.agent_request(&input, agent, turn, &context, session.working());

                progress.on_agent_stream_start(agent, turn);
                let result = request_text(
                    self.gateway.as_ref(),
                    request,
                    self.behavior.timeout,
                    cancel,
                    |chunk| progress.on_agent_chunk(agent, chunk),
                )
                .await;
                progress.on_agent_stream_end(agent);

                match result {
                    Ok(reply) => {
                        let report = self.fold_reply(&mut session, agent, turn, &reply);
                        progress.on_waypoint(agent, &report);
                        last_reply = Some((agent.label.clone(), reply));
                        records.push(TurnRecord {
                            agent: agent.id.clone(),
                            turn,
                            outcome: TurnOutcome::Applied(report),
                        });
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        self.record_failure(&mut session, agent, turn, &reason);
                        progress.on_agent_failed(agent, turn, &reason);
                        records.push(TurnRecord {
                            agent: agent.id.clone(),
                            turn,
                            outcome: TurnOutcome::Failed(reason),
                        });
                        if e == GatewayError::Cancelled {
                            cancelled = true;
                            break 'turns;
                        }
                    }
                }
            }
        }

        if !cancelled {
            return CollaborationOutcome::Completed(CollaborationRun {
                summary: session.finish(),
                turns: records,
            });
        }

        let rolled_back = self.behavior.cancel_policy == CancelPolicy::Rollback;
        if rolled_back {
            session.rollback();
        }
        info!(rolled_back, "Collaboration cancelled");
        CollaborationOutcome::Cancelled {
            run: CollaborationRun {
                summary: session.finish(),
                turns: records,
            },
            rolled_back,
        }
    }

    fn agent_request(
        &self,
        input: &CollaborationInput,
        agent: &Agent,
        turn: u8,
        context: &str,
        working: &Document,
    ) -> GenerationRequest {
        let framing =
            PromptTemplate::collaboration_framing(agent, &input.roster, turn, input.turns, &input.task);
        let instruction = input.library.content_of(&agent.instruction);
        let system = if instruction.is_empty() {
            framing
        } else {
            format!("{instruction}\n\n{framing}")
        };
        let history = self.chat_store.history(self.behavior.history_window);

        GenerationRequest::new(context)
            .with_system(system)
            .with_history(&history, self.behavior.history_window)
            .with_attachment(Attachment::html(working.title(), working.to_html()))
    }

    /// Apply one reply's directives and record the turn.
    fn fold_reply(
        &self,
        session: &mut CollaborationSession,
        agent: &Agent,
        turn: u8,
        reply: &str,
    ) -> ApplyReport {
        let parsed = parse_directives(reply);
        let report = session.record_waypoint(&agent.id, &agent.label, turn, &parsed.directives);

        self.chat_store
            .append(ChatMessage::agent_reply(agent.id.clone(), turn, reply));
        self.logger.log(ConversationEvent::new(
            "agent_turn",
            json!({
                "agent": agent.id.as_str(),
                "label": agent.label,
                "turn": turn,
                "reply": preview(reply, 200),
            }),
        ));
        self.logger.log(ConversationEvent::new(
            "waypoint",
            json!({
                "agent": agent.id.as_str(),
                "turn": turn,
                "parsed": parsed.directives.len(),
                "dropped": parsed.warnings.len(),
                "applied": report.applied_count(),
                "skipped": report.warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "introduced": report.introduced.iter().map(ToString::to_string).collect::<Vec<_>>(),
            }),
        ));
        report
    }

    fn record_failure(&self, session: &mut CollaborationSession, agent: &Agent, turn: u8, reason: &str) {
        warn!(agent = %agent.id, turn, error = %reason, "Agent turn failed");
        session.record_failure(&agent.id, &agent.label, turn, reason);
        self.chat_store.append(ChatMessage::agent_reply(
            agent.id.clone(),
            turn,
            format!("Error: {reason}"),
        ));
        self.logger.log(ConversationEvent::new(
            "agent_turn_failed",
            json!({
                "agent": agent.id.as_str(),
                "turn": turn,
                "error": reason,
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::shared::test_support::*;
    use cowrite_domain::{AgentRoster, ChatMessage, SystemInstruction};

    fn roster(explicit: usize) -> Vec<Agent> {
        let mut roster = AgentRoster::new().with_lead("lead");
        for i in 0..explicit {
            roster.add_agent(format!("Agent {i}"), "critic").unwrap();
        }
        roster.full_roster()
    }

    fn library() -> InstructionLibrary {
        InstructionLibrary::new(vec![
            SystemInstruction::new("lead", "Lead", "You lead the discussion."),
            SystemInstruction::new("critic", "Critic", "You look for weak points."),
        ])
    }

    fn input(agents: Vec<Agent>, turns: u8) -> CollaborationInput {
        CollaborationInput {
            task: "Improve the intro".to_string(),
            turns,
            roster: agents,
            library: library(),
            document: Document::from_html(
                "Notes",
                r#"<h1 data-id="el-1">Plan</h1><p data-id="el-2">Draft intro</p>"#,
            ),
        }
    }

    fn use_case(
        replies: Vec<Scripted>,
        behavior: BehaviorConfig,
    ) -> (
        Arc<ScriptedGateway>,
        Arc<MemoryChat>,
        RunCollaborationUseCase<ScriptedGateway>,
    ) {
        let gateway = Arc::new(ScriptedGateway::new(replies));
        let chat = Arc::new(MemoryChat::default());
        let use_case = RunCollaborationUseCase::new(Arc::clone(&gateway), chat.clone(), behavior);
        (gateway, chat, use_case)
    }

    #[tokio::test]
    async fn test_issues_agents_times_turns_requests() {
        for (explicit, turns) in [(1usize, 1u8), (2, 3), (3, 2)] {
            let agents = roster(explicit);
            let n = agents.len() * turns as usize;
            let replies = (0..n).map(|i| reply(&format!("reply {i}"))).collect();
            let (gateway, chat, use_case) = use_case(replies, BehaviorConfig::default());

            let outcome = use_case.execute(input(agents, turns)).await;

            assert_eq!(gateway.request_count(), n);
            assert_eq!(outcome.run().turns.len(), n);
            assert_eq!(chat.messages.lock().unwrap().len(), n);
            assert!(matches!(outcome, CollaborationOutcome::Completed(_)));
        }
    }

    #[tokio::test]
    async fn test_context_chains_previous_reply() {
        let (gateway, _, use_case) = use_case(
            vec![reply("Lead thoughts"), reply("Critic thoughts"), reply("Lead again")],
            BehaviorConfig::default(),
        );
        use_case.execute(input(roster(1), 2)).await;

        assert_eq!(gateway.request(0).message, "Improve the intro");
        assert_eq!(gateway.request(1).message, "Lead wrote:\n\nLead thoughts");
        assert_eq!(gateway.request(2).message, "Agent 0 wrote:\n\nCritic thoughts");
    }

    #[tokio::test]
    async fn test_agent_sees_previous_waypoint() {
        let (gateway, _, use_case) = use_case(
            vec![
                reply(r#"<edits><edit action="modify" target="el-2"><p>Sharper intro</p></edit></edits>"#),
                reply("Looks good."),
            ],
            BehaviorConfig::default(),
        );
        let outcome = use_case.execute(input(roster(1), 1)).await;

        let second = gateway.request(1);
        assert!(second.attachments[0].content.contains("Sharper intro"));
        assert!(second.system.unwrap().starts_with("You look for weak points."));

        let summary = &outcome.run().summary;
        assert!(summary.has_drift);
        assert_eq!(summary.pending_edits.len(), 1);
        assert_eq!(summary.contributors, vec!["Lead", "Agent 0"]);
    }

    #[tokio::test]
    async fn test_failed_agent_does_not_abort_loop() {
        let (gateway, chat, use_case) = use_case(
            vec![
                Scripted::Error(GatewayError::ConnectionError("reset".into())),
                Scripted::FailMidStream("partial".into(), "overloaded".into()),
                reply(r#"<edits><edit action="delete" target="el-1"></edit></edits>"#),
            ],
            BehaviorConfig::default(),
        );
        let outcome = use_case.execute(input(roster(2), 1)).await;

        assert_eq!(gateway.request_count(), 3);
        // Both failures leave the task as the context
        assert_eq!(gateway.request(2).message, "Improve the intro");
        let run = outcome.run();
        assert!(matches!(run.turns[0].outcome, TurnOutcome::Failed(_)));
        assert_eq!(
            run.turns[1].outcome,
            TurnOutcome::Failed("Stream failed: overloaded".into())
        );
        assert!(run.summary.has_drift);
        assert_eq!(run.summary.contributors, vec!["Agent 1"]);

        let messages: Vec<ChatMessage> = chat.messages.lock().unwrap().clone();
        assert_eq!(messages[0].content, "Error: Connection error: reset");
        assert_eq!(messages[0].turn, Some(1));
    }

    #[tokio::test]
    async fn test_missing_anchor_skips_directive_and_continues() {
        let (gateway, _, use_case) = use_case(
            vec![
                reply(
                    r#"<edits>
<edit action="add" after="el-99"><p>Lost</p></edit>
<edit action="modify" target="el-1"><h1>Roadmap</h1></edit>
</edits>"#,
                ),
                reply("No edits from me."),
            ],
            BehaviorConfig::default(),
        );
        let outcome = use_case.execute(input(roster(1), 1)).await;

        assert_eq!(gateway.request_count(), 2);
        let TurnOutcome::Applied(report) = &outcome.run().turns[0].outcome else {
            panic!("first turn should apply");
        };
        assert_eq!(report.applied_count(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(outcome.run().summary.working.to_html().contains("Roadmap"));
    }

    #[tokio::test]
    async fn test_cancel_rolls_back_and_skips_remaining_turns() {
        let token = CancellationToken::new();
        let (gateway, _, use_case) = use_case(
            vec![
                reply(r#"<edits><edit action="delete" target="el-2"></edit></edits>"#),
                Scripted::CancelAndHang(token.clone()),
                reply("never requested"),
            ],
            BehaviorConfig::default(),
        );
        let outcome = use_case
            .execute_with_progress(input(roster(1), 2), &NoProgress, &token)
            .await;

        assert_eq!(gateway.request_count(), 2);
        let CollaborationOutcome::Cancelled { run, rolled_back } = outcome else {
            panic!("expected cancellation");
        };
        assert!(rolled_back);
        assert!(!run.summary.has_drift);
        assert!(run.summary.pending_edits.is_empty());
        assert_eq!(run.turns[1].outcome, TurnOutcome::Failed("Cancelled".into()));
    }

    #[tokio::test]
    async fn test_cancel_keeps_partial_progress_when_configured() {
        let token = CancellationToken::new();
        let (_, _, use_case) = use_case(
            vec![
                reply(r#"<edits><edit action="delete" target="el-2"></edit></edits>"#),
                Scripted::CancelAndHang(token.clone()),
            ],
            BehaviorConfig::default().with_cancel_policy(CancelPolicy::KeepPartial),
        );
        let outcome = use_case
            .execute_with_progress(input(roster(1), 1), &NoProgress, &token)
            .await;

        let CollaborationOutcome::Cancelled { run, rolled_back } = outcome else {
            panic!("expected cancellation");
        };
        assert!(!rolled_back);
        assert!(run.summary.has_drift);
    }
}
