//! LLM Gateway port
//!
//! Defines the interface for communicating with the generative text service.

use async_trait::async_trait;
use cowrite_domain::{GenerationRequest, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Stream failed: {0}")]
    StreamFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway to the generative text service
///
/// This port defines how the application layer communicates with the service.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a request and receive its reply as a stream of events
    async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError>;

    /// Send a request and wait for the full reply text
    async fn complete(&self, request: GenerationRequest) -> Result<String, GatewayError> {
        self.stream(request).await?.collect_text().await
    }
}

/// Failure reason for a reply that ended without its completion signal.
pub const STREAM_INCOMPLETE: &str = "stream ended without completion";

/// Handle for receiving streaming events of one reply.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// A handle that yields `text` as one chunk and completes.
    pub fn from_text(text: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(2);
        let _ = tx.try_send(StreamEvent::Chunk(text.into()));
        let _ = tx.try_send(StreamEvent::Done);
        Self::new(rx)
    }

    /// Consume the stream, passing each chunk to `on_chunk`.
    ///
    /// Returns the full text on `Done`. A `Failed` event, or a channel
    /// closed before `Done`, ends this reply with
    /// [`GatewayError::StreamFailed`].
    pub async fn drain(mut self, mut on_chunk: impl FnMut(&str) + Send) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Chunk(chunk) => {
                    on_chunk(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Done => return Ok(full_text),
                StreamEvent::Failed(reason) => return Err(GatewayError::StreamFailed(reason)),
            }
        }
        Err(GatewayError::StreamFailed(STREAM_INCOMPLETE.to_string()))
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.drain(|_| {}).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_collects_chunks() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Chunk("Hel".into())).await.unwrap();
        tx.send(StreamEvent::Chunk("lo".into())).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();

        let mut seen = Vec::new();
        let text = StreamHandle::new(rx)
            .drain(|c| seen.push(c.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "Hello");
        assert_eq!(seen, vec!["Hel", "lo"]);
    }

    #[tokio::test]
    async fn test_failed_event_aborts_reply() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Chunk("partial".into())).await.unwrap();
        tx.send(StreamEvent::Failed("overloaded".into())).await.unwrap();

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::StreamFailed("overloaded".into()));
    }

    #[tokio::test]
    async fn test_closed_channel_without_done_fails() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(StreamEvent::Chunk("<edits><edit action=\"modify\"".into()))
            .await
            .unwrap();
        drop(tx);

        let err = StreamHandle::new(rx).collect_text().await.unwrap_err();
        assert_eq!(err, GatewayError::StreamFailed(STREAM_INCOMPLETE.into()));
    }

    #[tokio::test]
    async fn test_from_text() {
        let text = StreamHandle::from_text("done").collect_text().await.unwrap();
        assert_eq!(text, "done");
    }
}
