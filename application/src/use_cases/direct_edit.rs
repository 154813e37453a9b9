//! Direct Edit use case
//!
//! One request, one reply. The reply's change script goes straight to the
//! review collaborator.

use crate::config::BehaviorConfig;
use crate::ports::change_reviewer::{ChangeReviewer, ReviewError};
use crate::ports::chat_store::ChatStore;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::CollaborationProgress;
use crate::use_cases::shared::{preview, request_text};
use cowrite_domain::{
    Agent, Attachment, ChangeScript, ChatMessage, Document, GenerationRequest, InstructionLibrary,
    PromptTemplate, Role, parse_change_script,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Input for the DirectEdit use case
pub struct DirectEditInput<'a> {
    pub message: &'a str,
    /// Agent whose instruction answers the request
    pub agent: &'a Agent,
    pub library: &'a InstructionLibrary,
    pub document: &'a Document,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectEditOutcome {
    /// A non-empty script was handed to the reviewer
    Submitted(ChangeScript),
    /// The reply held no change entries
    NoChanges,
    Failed(String),
}

pub struct DirectEditUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    chat_store: Arc<dyn ChatStore>,
    reviewer: Arc<dyn ChangeReviewer>,
    logger: Arc<dyn ConversationLogger>,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> DirectEditUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        chat_store: Arc<dyn ChatStore>,
        reviewer: Arc<dyn ChangeReviewer>,
        behavior: BehaviorConfig,
    ) -> Self {
        Self {
            gateway,
            chat_store,
            reviewer,
            logger: Arc::new(NoConversationLogger),
            behavior,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub async fn execute(
        &self,
        input: DirectEditInput<'_>,
        progress: &dyn CollaborationProgress,
        cancel: &CancellationToken,
    ) -> Result<DirectEditOutcome, ReviewError> {
        let agent = input.agent;
        let system = format!(
            "{}\n\n{}",
            input.library.content_of(&agent.instruction),
            PromptTemplate::direct_edit_system()
        );
        let mut history = self.chat_store.history(self.behavior.history_window);
        // The message itself may already be recorded by the caller
        if history
            .last()
            .is_some_and(|m| m.role == Role::User && m.content == input.message)
        {
            history.pop();
        }
        let request = GenerationRequest::new(input.message)
            .with_system(system.trim_start())
            .with_history(&history, self.behavior.history_window)
            .with_attachment(Attachment::html(
                input.document.title(),
                input.document.to_html(),
            ));

        progress.on_agent_stream_start(agent, 1);
        let result = request_text(
            self.gateway.as_ref(),
            request,
            self.behavior.timeout,
            cancel,
            |chunk| progress.on_agent_chunk(agent, chunk),
        )
        .await;
        progress.on_agent_stream_end(agent);

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let reason = e.to_string();
                warn!(error = %reason, "Direct edit request failed");
                progress.on_agent_failed(agent, 1, &reason);
                self.chat_store
                    .append(ChatMessage::agent_reply(agent.id.clone(), 1, format!("Error: {reason}")));
                return Ok(DirectEditOutcome::Failed(reason));
            }
        };

        self.chat_store
            .append(ChatMessage::agent_reply(agent.id.clone(), 1, reply.clone()));

        let parsed = parse_change_script(&reply);
        let script = parsed.script.with_attribution(&[agent.label.as_str()]);
        self.logger.log(ConversationEvent::new(
            "direct_edit",
            json!({
                "agent": agent.id.as_str(),
                "entries": script.len(),
                "dropped": parsed.warnings.len(),
                "reply": preview(&reply, 200),
            }),
        ));

        if script.is_empty() {
            return Ok(DirectEditOutcome::NoChanges);
        }
        info!(entries = script.len(), "Submitting direct change script");
        self.reviewer.submit(script.clone()).await?;
        Ok(DirectEditOutcome::Submitted(script))
    }
}
