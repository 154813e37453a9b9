//! HTTP gateway to the streaming chat endpoint

use super::protocol::{ChatRequestBody, decode_frame};
use super::sse::SseFrameDecoder;
use crate::config::{DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use async_trait::async_trait;
use cowrite_application::ports::llm_gateway::{
    GatewayError, LlmGateway, STREAM_INCOMPLETE, StreamHandle,
};
use cowrite_domain::{GenerationRequest, StreamEvent};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_BUFFER: usize = 100;
const ERROR_BODY_PREVIEW: usize = 200;

/// [`LlmGateway`] over HTTP POST + server-sent events
pub struct HttpLlmGateway {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
}

impl HttpLlmGateway {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        let endpoint = endpoint.into();

        info!(endpoint = %endpoint, "HttpLlmGateway initialized");

        Ok(Self {
            client,
            endpoint,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmGateway for HttpLlmGateway {
    async fn stream(&self, request: GenerationRequest) -> Result<StreamHandle, GatewayError> {
        let body = ChatRequestBody::new(&request, &self.model, self.max_tokens);
        debug!(
            message_len = request.message.len(),
            history = request.history.len(),
            files = request.attachments.len(),
            "Sending chat request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    GatewayError::ConnectionError(e.to_string())
                } else if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let preview: String = text.chars().take(ERROR_BODY_PREVIEW).collect();
            warn!(status = %status, endpoint = %self.endpoint, "Chat request rejected");
            return Err(GatewayError::RequestFailed(format!("HTTP {status}: {preview}")));
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let bytes = response.bytes_stream();
        tokio::spawn(async move {
            let mut bytes = std::pin::pin!(bytes);
            let mut decoder = SseFrameDecoder::new();
            while let Some(next) = bytes.next().await {
                let chunk = match next {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Failed(e.to_string())).await;
                        return;
                    }
                };
                for data in decoder.push(&chunk) {
                    if !forward(&tx, &data).await {
                        return;
                    }
                }
            }
            if let Some(data) = decoder.finish()
                && !forward(&tx, &data).await
            {
                return;
            }
            warn!("Stream ended without a done frame");
            let _ = tx.send(StreamEvent::Failed(STREAM_INCOMPLETE.to_string())).await;
        });

        Ok(StreamHandle::new(rx))
    }
}

/// Send one decoded frame on. Returns `false` once the reply is over,
/// either by a terminal event or because the receiver went away.
async fn forward(tx: &mpsc::Sender<StreamEvent>, data: &str) -> bool {
    let event = match decode_frame(data) {
        Ok(Some(event)) => event,
        Ok(None) => return true,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed stream frame");
            return true;
        }
    };
    let terminal = event.is_terminal();
    tx.send(event).await.is_ok() && !terminal
}
