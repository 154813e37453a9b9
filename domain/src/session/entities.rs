//! Conversation entities and generation requests.

use crate::collaboration::AgentId;
use serde::{Deserialize, Serialize};

/// Who wrote a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Notices from the coordinator itself
    System,
}

/// A message in the shared conversation (Entity).
///
/// Agent replies carry the agent's id and the turn they were produced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u8>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent: None,
            turn: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent: None,
            turn: None,
        }
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            agent: None,
            turn: None,
        }
    }

    pub fn agent_reply(agent: AgentId, turn: u8, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent: Some(agent),
            turn: Some(turn),
        }
    }
}

/// One entry of the history window sent with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessage {
    pub is_user: bool,
    pub content: String,
}

impl From<&ChatMessage> for HistoryMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            is_user: message.role == Role::User,
            content: message.content.clone(),
        }
    }
}

/// A file-like artifact attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub media_type: String,
    pub content: String,
}

impl Attachment {
    pub fn html(name: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: "text/html".to_string(),
            content: html.into(),
        }
    }
}

/// A single request to the generative service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub message: String,
    pub history: Vec<HistoryMessage>,
    pub system: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl GenerationRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Attach the trailing `window` messages of `history`.
    pub fn with_history(mut self, history: &[ChatMessage], window: usize) -> Self {
        let skip = history.len().saturating_sub(window);
        self.history = history[skip..].iter().map(HistoryMessage::from).collect();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}
