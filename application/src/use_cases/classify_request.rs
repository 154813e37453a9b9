//! Classify Request use case
//!
//! Decides whether a request gets one direct reply or is delegated to the
//! roster. Never fails: any error or unparsable reply delegates the
//! original message.

use crate::config::BehaviorConfig;
use crate::ports::llm_gateway::LlmGateway;
use crate::use_cases::shared::request_text;
use cowrite_domain::{ChatMessage, Decision, GenerationRequest, PromptTemplate, parse_decision};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct ClassifyRequestUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> ClassifyRequestUseCase<G> {
    pub fn new(gateway: Arc<G>, behavior: BehaviorConfig) -> Self {
        Self { gateway, behavior }
    }

    pub async fn classify(
        &self,
        message: &str,
        history: &[ChatMessage],
        cancel: &CancellationToken,
    ) -> Decision {
        let request = GenerationRequest::new(PromptTemplate::classification_prompt(message))
            .with_system(PromptTemplate::classification_system())
            .with_history(history, self.behavior.history_window);

        match request_text(
            self.gateway.as_ref(),
            request,
            self.behavior.timeout,
            cancel,
            |_| {},
        )
        .await
        {
            Ok(reply) => match parse_decision(&reply, message) {
                Some(decision) => {
                    debug!(action = %decision.action, turns = ?decision.turns, "Request classified");
                    decision
                }
                None => {
                    warn!("Unparsable classification reply, delegating");
                    Decision::fallback(message)
                }
            },
            Err(e) => {
                warn!(error = %e, "Classification request failed, delegating");
                Decision::fallback(message)
            }
        }
    }
}
