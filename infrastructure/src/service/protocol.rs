//! Wire types of the streaming chat endpoint.
//!
//! Request body:
//!
//! ```json
//! {"message": "...", "history": [{"isUser": true, "content": "..."}],
//!  "systemPrompt": "...", "files": [{"name": "...", "type": "text/html", "data": "data:...;base64,..."}],
//!  "model": "...", "max_tokens": 1000}
//! ```
//!
//! Response: server-sent frames `data: {"chunk": "..."}`, `data: {"done": true}`
//! or `data: {"error": "..."}`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cowrite_domain::{Attachment, GenerationRequest, HistoryMessage, StreamEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ChatRequestBody<'a> {
    pub message: &'a str,
    pub history: &'a [HistoryMessage],
    #[serde(rename = "systemPrompt", skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<&'a str>,
    pub files: Vec<FilePayload>,
    pub model: &'a str,
    pub max_tokens: u32,
}

impl<'a> ChatRequestBody<'a> {
    pub fn new(request: &'a GenerationRequest, model: &'a str, max_tokens: u32) -> Self {
        Self {
            message: &request.message,
            history: &request.history,
            system_prompt: request.system.as_deref(),
            files: request.attachments.iter().map(FilePayload::from).collect(),
            model,
            max_tokens,
        }
    }
}

/// An attachment encoded as a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePayload {
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub data: String,
}

impl From<&Attachment> for FilePayload {
    fn from(attachment: &Attachment) -> Self {
        Self {
            name: attachment.name.clone(),
            media_type: attachment.media_type.clone(),
            data: format!(
                "data:{};base64,{}",
                attachment.media_type,
                STANDARD.encode(attachment.content.as_bytes())
            ),
        }
    }
}

/// One decoded `data:` frame.
#[derive(Debug, Default, Deserialize)]
pub struct StreamFrame {
    #[serde(default)]
    pub chunk: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl StreamFrame {
    /// `None` for frames that carry nothing (keep-alives, empty chunks).
    pub fn into_event(self) -> Option<StreamEvent> {
        if let Some(error) = self.error {
            return Some(StreamEvent::Failed(error));
        }
        if self.done {
            return Some(StreamEvent::Done);
        }
        self.chunk
            .filter(|c| !c.is_empty())
            .map(StreamEvent::Chunk)
    }
}

/// Parse the payload of one `data:` line.
pub fn decode_frame(data: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    if data.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<StreamFrame>(data).map(StreamFrame::into_event)
}
