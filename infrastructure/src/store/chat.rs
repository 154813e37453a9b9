//! In-memory chat history

use cowrite_application::ports::chat_store::ChatStore;
use cowrite_domain::ChatMessage;
use std::sync::Mutex;

/// Conversation held for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryChatStore {
    messages: Mutex<Vec<ChatMessage>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every message, oldest first.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl ChatStore for InMemoryChatStore {
    fn append(&self, message: ChatMessage) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message);
        }
    }

    fn history(&self, window: usize) -> Vec<ChatMessage> {
        let Ok(messages) = self.messages.lock() else {
            return Vec::new();
        };
        let skip = messages.len().saturating_sub(window);
        messages[skip..].to_vec()
    }
}
