//! Reconcile use case
//!
//! One request carrying the original and final documents; the reply
//! becomes the single change script the user reviews.

use crate::config::BehaviorConfig;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::request_text;
use cowrite_domain::{
    ChangeEntry, ChangeScript, GenerationRequest, PromptTemplate, SessionSummary,
    parse_change_script,
};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Unified {
        script: ChangeScript,
        /// Entries anchored on ids the original document does not have
        dropped: Vec<ChangeEntry>,
    },
    /// Zero usable entries, or the request failed
    NoUnifiedChange { reason: String },
}

pub struct ReconcileUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    logger: Arc<dyn ConversationLogger>,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> ReconcileUseCase<G> {
    pub fn new(gateway: Arc<G>, behavior: BehaviorConfig) -> Self {
        Self {
            gateway,
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
        summary: &SessionSummary,
        cancel: &CancellationToken,
    ) -> ReconciliationOutcome {
        let request = GenerationRequest::new(PromptTemplate::reconciliation_prompt(
            &summary.original.to_html(),
            &summary.working.to_html(),
        ))
        .with_system(PromptTemplate::reconciliation_system());

        let reply = match request_text(
            self.gateway.as_ref(),
            request,
            self.behavior.timeout,
            cancel,
            |_| {},
        )
        .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Reconciliation request failed");
                return ReconciliationOutcome::NoUnifiedChange {
                    reason: e.to_string(),
                };
            }
        };

        let parsed = parse_change_script(&reply);
        let mut script = parsed.script;
        let dropped = script.retain_anchored_in(&summary.original);
        for entry in &dropped {
            warn!(
                entry = entry.tag(),
                id = ?entry.anchor_id().map(|id| id.as_str()),
                "Dropping change anchored outside the original document"
            );
        }

        self.logger.log(ConversationEvent::new(
            "reconciliation",
            json!({
                "entries": script.len(),
                "malformed": parsed.warnings.len(),
                "unanchored": dropped.len(),
                "contributors": summary.contributors,
            }),
        ));

        if script.is_empty() {
            return ReconciliationOutcome::NoUnifiedChange {
                reason: "reply contained no usable change entries".to_string(),
            };
        }

        info!(entries = script.len(), "Reconciled change script");
        ReconciliationOutcome::Unified {
            script: script.with_attribution(&summary.contributors),
            dropped,
        }
    }
}
