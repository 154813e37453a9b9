//! Ask use case.
//!
//! A plain single reply for when no collaboration is engaged: one request
//! under the active instruction, with the open document attached. Nothing
//! is parsed out of the reply.

use crate::config::BehaviorConfig;
use crate::ports::chat_store::ChatStore;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::use_cases::shared::{preview, request_text};
use cowrite_domain::{
    Agent, Attachment, ChatMessage, Document, GenerationRequest, InstructionLibrary,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AskError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("No response from the service")]
    EmptyResponse,
}

/// Input for the [`AskUseCase`]
pub struct AskInput<'a> {
    pub message: &'a str,
    /// Whose instruction frames the reply; `None` sends no system string
    pub agent: Option<&'a Agent>,
    pub library: &'a InstructionLibrary,
    pub document: Option<&'a Document>,
}

pub struct AskUseCase<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    chat_store: Arc<dyn ChatStore>,
    logger: Arc<dyn ConversationLogger>,
    behavior: BehaviorConfig,
}

impl<G: LlmGateway + 'static> AskUseCase<G> {
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

    /// Send the message and stream the reply into `on_chunk`.
    ///
    /// Both the message and the reply are appended to the chat store.
    pub async fn execute(
        &self,
        input: AskInput<'_>,
        on_chunk: impl FnMut(&str) + Send,
        cancel: &CancellationToken,
    ) -> Result<String, AskError> {
        let history = self.chat_store.history(self.behavior.history_window);
        self.chat_store.append(ChatMessage::user(input.message));

        let mut request = GenerationRequest::new(input.message)
            .with_history(&history, self.behavior.history_window);
        if let Some(agent) = input.agent {
            let system = input.library.content_of(&agent.instruction);
            if !system.is_empty() {
                request = request.with_system(system);
            }
        }
        if let Some(document) = input.document.filter(|d| !d.is_empty()) {
            request = request.with_attachment(Attachment::html(document.title(), document.to_html()));
        }

        info!("Answering without collaboration");
        let reply = request_text(
            self.gateway.as_ref(),
            request,
            self.behavior.timeout,
            cancel,
            on_chunk,
        )
        .await;

        let reply = match reply {
            Ok(reply) if reply.trim().is_empty() => Err(AskError::EmptyResponse),
            Ok(reply) => Ok(reply),
            Err(e) => Err(AskError::Gateway(e)),
        };
        let content = match &reply {
            Ok(text) => text.clone(),
            Err(e) => format!("Error: {e}"),
        };
        self.logger.log(ConversationEvent::new(
            "answer",
            json!({
                "ok": reply.is_ok(),
                "reply": preview(&content, 200),
            }),
        ));
        self.chat_store.append(ChatMessage::assistant(content));
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::shared::test_support::*;
    use cowrite_domain::{AgentRoster, Role, SystemInstruction};

    fn use_case(replies: Vec<Scripted>) -> (Arc<ScriptedGateway>, Arc<MemoryChat>, AskUseCase<ScriptedGateway>) {
        let gateway = Arc::new(ScriptedGateway::new(replies));
        let chat = Arc::new(MemoryChat::default());
        let use_case = AskUseCase::new(Arc::clone(&gateway), chat.clone(), BehaviorConfig::default());
        (gateway, chat, use_case)
    }

    #[tokio::test]
    async fn test_answer_uses_lead_instruction_and_document() {
        let (gateway, chat, use_case) = use_case(vec![reply("Here is a summary.")]);
        let lead = AgentRoster::new().with_lead("default").full_roster().remove(0);
        let library = InstructionLibrary::new(vec![SystemInstruction::new(
            "default",
            "Default",
            "You summarize.",
        )]);
        let document = Document::from_html("Notes", "<p>Body</p>");

        let mut streamed = String::new();
        let text = use_case
            .execute(
                AskInput {
                    message: "summarize",
                    agent: Some(&lead),
                    library: &library,
                    document: Some(&document),
                },
                |chunk| streamed.push_str(chunk),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(text, "Here is a summary.");
        assert_eq!(streamed, text);
        let request = gateway.request(0);
        assert_eq!(request.system.as_deref(), Some("You summarize."));
        assert_eq!(request.attachments.len(), 1);
        assert!(request.history.is_empty());

        let messages = chat.messages.lock().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_in_chat() {
        let (_, chat, use_case) =
            use_case(vec![Scripted::Error(GatewayError::ConnectionError("refused".into()))]);
        let result = use_case
            .execute(
                AskInput {
                    message: "hello",
                    agent: None,
                    library: &InstructionLibrary::default(),
                    document: None,
                },
                |_| {},
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(AskError::Gateway(GatewayError::ConnectionError(_)))));
        let last = chat.messages.lock().unwrap().last().cloned().unwrap();
        assert!(last.content.starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_blank_reply_is_an_error() {
        let (_, _, use_case) = use_case(vec![reply("   ")]);
        let result = use_case
            .execute(
                AskInput {
                    message: "hello",
                    agent: None,
                    library: &InstructionLibrary::default(),
                    document: None,
                },
                |_| {},
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result, Err(AskError::EmptyResponse));
    }
}
