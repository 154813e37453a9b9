//! Shared utilities for use cases.
//!
//! Every request the coordinator issues goes through [`request_text`], which
//! bounds it by the configured timeout and the session's cancellation token.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use cowrite_domain::GenerationRequest;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Issue one request and drain its stream.
///
/// Checks for cancellation before sending. The timeout covers the whole
/// reply, not just the first byte.
pub(crate) async fn request_text<G: LlmGateway + ?Sized>(
    gateway: &G,
    request: GenerationRequest,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
    on_chunk: impl FnMut(&str) + Send,
) -> Result<String, GatewayError> {
    if cancel.is_cancelled() {
        return Err(GatewayError::Cancelled);
    }

    let reply = async {
        let handle = gateway.stream(request).await?;
        handle.drain(on_chunk).await
    };
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, reply)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => reply.await,
        }
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(GatewayError::Cancelled),
        result = bounded => result,
    }
}

/// Short preview of a reply for structured logs.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted gateway and recording adapters shared by use case tests.

    use crate::ports::change_reviewer::{ChangeReviewer, ReviewError};
    use crate::ports::chat_store::ChatStore;
    use crate::ports::document_store::{DocumentStore, DocumentStoreError};
    use crate::ports::llm_gateway::{GatewayError, LlmGateway, StreamHandle};
    use crate::ports::progress::CollaborationProgress;
    use async_trait::async_trait;
    use cowrite_domain::{
        Agent, ApplyReport, ChangeScript, ChatMessage, Decision, Document, GenerationRequest,
        StreamEvent,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    pub enum Scripted {
        Reply(String),
        /// Gateway error before any stream
        Error(GatewayError),
        /// Some text, then a mid-stream failure
        FailMidStream(String, String),
        /// Cancel the token, then never answer
        CancelAndHang(CancellationToken),
    }

    pub fn reply(text: &str) -> Scripted {
        Scripted::Reply(text.to_string())
    }

    /// Gateway that answers from a script and records every request.
    #[derive(Default)]
    pub struct ScriptedGateway {
        replies: Mutex<VecDeque<Scripted>>,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGateway {
        pub fn new(replies: Vec<Scripted>) -> Self {
            Self {
                replies: Mutex::new(VecDeque::from(replies)),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn request(&self, index: usize) -> GenerationRequest {
            self.requests.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError> {
            self.requests.lock().unwrap().push(request);
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Scripted::Reply(text)) => Ok(StreamHandle::from_text(text)),
                Some(Scripted::Error(e)) => Err(e),
                Some(Scripted::FailMidStream(text, reason)) => {
                    let (tx, rx) = mpsc::channel(2);
                    tx.try_send(StreamEvent::Chunk(text)).unwrap();
                    tx.try_send(StreamEvent::Failed(reason)).unwrap();
                    Ok(StreamHandle::new(rx))
                }
                Some(Scripted::CancelAndHang(token)) => {
                    token.cancel();
                    let (tx, rx) = mpsc::channel(1);
                    // Keep the sender alive so the stream never closes
                    tokio::spawn(async move {
                        tx.closed().await;
                    });
                    Ok(StreamHandle::new(rx))
                }
                None => Err(GatewayError::Other("No more responses".to_string())),
            }
        }
    }

    #[derive(Default)]
    pub struct MemoryChat {
        pub messages: Mutex<Vec<ChatMessage>>,
    }

    impl ChatStore for MemoryChat {
        fn append(&self, message: ChatMessage) {
            self.messages.lock().unwrap().push(message);
        }

        fn history(&self, window: usize) -> Vec<ChatMessage> {
            let messages = self.messages.lock().unwrap();
            let skip = messages.len().saturating_sub(window);
            messages[skip..].to_vec()
        }
    }

    pub struct MemoryDocument {
        pub document: Mutex<Option<Document>>,
        pub replaced: Mutex<usize>,
    }

    impl MemoryDocument {
        pub fn new(document: Option<Document>) -> Self {
            Self {
                document: Mutex::new(document),
                replaced: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for MemoryDocument {
        async fn current(&self) -> Result<Option<Document>, DocumentStoreError> {
            Ok(self.document.lock().unwrap().clone())
        }

        async fn replace(&self, document: Document) -> Result<(), DocumentStoreError> {
            *self.document.lock().unwrap() = Some(document);
            *self.replaced.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingReviewer {
        pub scripts: Mutex<Vec<ChangeScript>>,
    }

    #[async_trait]
    impl ChangeReviewer for RecordingReviewer {
        async fn submit(&self, script: ChangeScript) -> Result<(), ReviewError> {
            self.scripts.lock().unwrap().push(script);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingProgress {
        pub events: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl CollaborationProgress for RecordingProgress {
        fn on_classified(&self, decision: &Decision) {
            self.push(format!("classified:{}", decision.action));
        }

        fn on_turn_start(&self, turn: u8, total_turns: u8) {
            self.push(format!("turn:{turn}/{total_turns}"));
        }

        fn on_notice(&self, message: &str) {
            self.push(format!("notice:{message}"));
        }

        fn on_agent_failed(&self, agent: &Agent, turn: u8, reason: &str) {
            self.push(format!("failed:{}:{turn}:{reason}", agent.id));
        }

        fn on_waypoint(&self, agent: &Agent, report: &ApplyReport) {
            self.push(format!("waypoint:{}:{}", agent.id, report.applied_count()));
        }
    }
}
