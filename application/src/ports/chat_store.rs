//! Chat store port
//!
//! Append-only conversation history. Agent replies carry the agent id and
//! turn number.

use cowrite_domain::ChatMessage;

pub trait ChatStore: Send + Sync {
    fn append(&self, message: ChatMessage);

    /// The latest `window` messages, oldest first.
    fn history(&self, window: usize) -> Vec<ChatMessage>;
}
