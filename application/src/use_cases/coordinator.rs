//! Collaboration coordinator
//!
//! Top-level control flow for one user message:
//!
//! 1. Fewer than two participants: not engaged; the caller falls back to
//!    [`CollaborationCoordinator::answer`].
//! 2. Classify the request (one request, never fails).
//! 3. `direct`: one reply, its change script goes to the reviewer.
//! 4. `delegate`: run the turn loop, then reconcile the drift into one
//!    change script, or emit a notice when nothing changed.
//!
//! User input stays disabled for the whole call.

use crate::config::BehaviorConfig;
use crate::input_gate::InputGate;
use crate::ports::change_reviewer::{ChangeReviewer, ReviewError};
use crate::ports::chat_store::ChatStore;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::document_store::{DocumentStore, DocumentStoreError};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::CollaborationProgress;
use crate::use_cases::ask::{AskError, AskInput, AskUseCase};
use crate::use_cases::classify_request::ClassifyRequestUseCase;
use crate::use_cases::direct_edit::{DirectEditInput, DirectEditOutcome, DirectEditUseCase};
use crate::use_cases::reconcile::{ReconcileUseCase, ReconciliationOutcome};
use crate::use_cases::run_collaboration::{
    CollaborationInput, CollaborationOutcome, RunCollaborationUseCase,
};
use cowrite_domain::{
    Agent, AgentRoster, ChangeScript, ChatMessage, Decision, Document, InstructionLibrary,
    resolve_turns,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub const NO_CHANGES_NOTICE: &str = "No changes were made to the document.";
pub const NO_UNIFIED_CHANGE_NOTICE: &str = "No unified change could be produced.";
pub const CANCELLED_NOTICE: &str = "Collaboration cancelled; the agents' edits were discarded.";

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("A collaboration is already in progress")]
    Busy,

    #[error("Document store error: {0}")]
    Document(#[from] DocumentStoreError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),
}

/// How a delegated request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelegationResult {
    /// A reconciled script was handed to the reviewer
    Submitted(ChangeScript),
    /// The working copy never drifted
    NoChanges,
    /// Drift existed but reconciliation produced nothing usable
    NoUnifiedChange,
    /// Cancelled and rolled back
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptOutcome {
    /// Fewer than two participants
    NotEngaged,
    Direct {
        decision: Decision,
        outcome: DirectEditOutcome,
    },
    Delegated {
        decision: Decision,
        turns: u8,
        result: DelegationResult,
    },
}

pub struct CollaborationCoordinator<G: LlmGateway + 'static> {
    ask: AskUseCase<G>,
    classify: ClassifyRequestUseCase<G>,
    direct: DirectEditUseCase<G>,
    collaborate: RunCollaborationUseCase<G>,
    reconcile: ReconcileUseCase<G>,
    document_store: Arc<dyn DocumentStore>,
    chat_store: Arc<dyn ChatStore>,
    reviewer: Arc<dyn ChangeReviewer>,
    logger: Arc<dyn ConversationLogger>,
    roster: AgentRoster,
    library: InstructionLibrary,
    gate: InputGate,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> CollaborationCoordinator<G> {
    pub fn new(
        gateway: Arc<G>,
        document_store: Arc<dyn DocumentStore>,
        chat_store: Arc<dyn ChatStore>,
        reviewer: Arc<dyn ChangeReviewer>,
        behavior: BehaviorConfig,
    ) -> Self {
        Self {
            ask: AskUseCase::new(
                Arc::clone(&gateway),
                Arc::clone(&chat_store),
                behavior.clone(),
            ),
            classify: ClassifyRequestUseCase::new(Arc::clone(&gateway), behavior.clone()),
            direct: DirectEditUseCase::new(
                Arc::clone(&gateway),
                Arc::clone(&chat_store),
                Arc::clone(&reviewer),
                behavior.clone(),
            ),
            collaborate: RunCollaborationUseCase::new(
                Arc::clone(&gateway),
                Arc::clone(&chat_store),
                behavior.clone(),
            ),
            reconcile: ReconcileUseCase::new(gateway, behavior.clone()),
            document_store,
            chat_store,
            reviewer,
            logger: Arc::new(NoConversationLogger),
            roster: AgentRoster::new(),
            library: InstructionLibrary::default(),
            gate: InputGate::new(),
            behavior,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.ask = self.ask.with_logger(Arc::clone(&logger));
        self.direct = self.direct.with_logger(Arc::clone(&logger));
        self.collaborate = self.collaborate.with_logger(Arc::clone(&logger));
        self.reconcile = self.reconcile.with_logger(Arc::clone(&logger));
        self.logger = logger;
        self
    }

    pub fn with_roster(mut self, roster: AgentRoster, library: InstructionLibrary) -> Self {
        self.roster = roster;
        self.library = library;
        self
    }

    pub fn with_input_gate(mut self, gate: InputGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut AgentRoster {
        &mut self.roster
    }

    pub fn library(&self) -> &InstructionLibrary {
        &self.library
    }

    pub fn input_gate(&self) -> &InputGate {
        &self.gate
    }

    pub async fn intercept(
        &self,
        message: &str,
        progress: &dyn CollaborationProgress,
        cancel: &CancellationToken,
    ) -> Result<InterceptOutcome, CoordinatorError> {
        if !self.roster.engages() {
            return Ok(InterceptOutcome::NotEngaged);
        }
        let _lock = self.gate.try_lock().ok_or(CoordinatorError::Busy)?;

        let history = self.chat_store.history(self.behavior.history_window);
        self.chat_store.append(ChatMessage::user(message));

        progress.on_classification_start();
        let decision = self.classify.classify(message, &history, cancel).await;
        progress.on_classified(&decision);
        self.logger.log(ConversationEvent::new(
            "classification",
            json!({
                "action": decision.action.as_str(),
                "turns": decision.turns,
                "task": decision.task,
            }),
        ));

        let document = self.anchored_document().await?;
        let agents = self.roster.full_roster();

        if !decision.is_delegate() {
            let outcome = self
                .direct
                .execute(
                    DirectEditInput {
                        message,
                        agent: &agents[0],
                        library: &self.library,
                        document: &document,
                    },
                    progress,
                    cancel,
                )
                .await?;
            if outcome == DirectEditOutcome::NoChanges {
                self.notice(progress, NO_CHANGES_NOTICE);
            }
            return Ok(InterceptOutcome::Direct { decision, outcome });
        }

        let turns = resolve_turns(
            self.roster.configured_turns(),
            &decision,
            self.behavior.auto_turns,
        );
        let result = self
            .delegate(&decision, turns, agents, document, progress, cancel)
            .await?;
        Ok(InterceptOutcome::Delegated {
            decision,
            turns,
            result,
        })
    }

    /// Plain reply for a roster that does not engage collaboration.
    pub async fn answer(
        &self,
        message: &str,
        on_chunk: impl FnMut(&str) + Send,
        cancel: &CancellationToken,
    ) -> Result<String, AskError> {
        let agents = self.roster.full_roster();
        let document = match self.document_store.current().await {
            Ok(document) => document,
            Err(e) => {
                warn!(error = %e, "Answering without the document");
                None
            }
        };
        self.ask
            .execute(
                AskInput {
                    message,
                    agent: agents.first(),
                    library: &self.library,
                    document: document.as_ref(),
                },
                on_chunk,
                cancel,
            )
            .await
    }

    async fn delegate(
        &self,
        decision: &Decision,
        turns: u8,
        agents: Vec<Agent>,
        document: Document,
        progress: &dyn CollaborationProgress,
        cancel: &CancellationToken,
    ) -> Result<DelegationResult, CoordinatorError> {
        info!(turns, agents = agents.len(), "Delegating to agents");
        let outcome = self
            .collaborate
            .execute_with_progress(
                CollaborationInput {
                    task: decision.task.clone(),
                    turns,
                    roster: agents,
                    library: self.library.clone(),
                    document,
                },
                progress,
                cancel,
            )
            .await;

        if let CollaborationOutcome::Cancelled {
            rolled_back: true, ..
        } = outcome
        {
            self.notice(progress, CANCELLED_NOTICE);
            return Ok(DelegationResult::Cancelled);
        }

        let summary = outcome.into_run().summary;
        if !summary.has_drift {
            self.notice(progress, NO_CHANGES_NOTICE);
            return Ok(DelegationResult::NoChanges);
        }

        progress.on_reconciliation_start();
        // Partial progress kept after a cancel still needs a live token
        let reconcile_token = if cancel.is_cancelled() {
            CancellationToken::new()
        } else {
            cancel.clone()
        };
        let reconciliation = self.reconcile.execute(&summary, &reconcile_token).await;
        match reconciliation {
            ReconciliationOutcome::Unified { script, .. } => {
                progress.on_reconciliation_complete(script.len());
                self.reviewer.submit(script.clone()).await?;
                Ok(DelegationResult::Submitted(script))
            }
            ReconciliationOutcome::NoUnifiedChange { reason } => {
                info!(reason = %reason, "No unified change");
                progress.on_reconciliation_complete(0);
                self.notice(progress, NO_UNIFIED_CHANGE_NOTICE);
                Ok(DelegationResult::NoUnifiedChange)
            }
        }
    }

    /// Load the open document and persist any anchor ids it was missing.
    async fn anchored_document(&self) -> Result<Document, CoordinatorError> {
        let Some(mut document) = self.document_store.current().await? else {
            return Ok(Document::untitled());
        };
        let fresh = document.ensure_ids();
        if !fresh.is_empty() {
            info!(count = fresh.len(), "Stamped anchor ids on open document");
            self.document_store.replace(document.clone()).await?;
        }
        Ok(document)
    }

    fn notice(&self, progress: &dyn CollaborationProgress, message: &str) {
        progress.on_notice(message);
        self.chat_store.append(ChatMessage::notice(message));
    }
}
