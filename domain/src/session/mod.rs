//! Conversation domain.
//!
//! - [`entities::ChatMessage`] - a message in the shared conversation
//! - [`entities::GenerationRequest`] - one request to the generative service
//! - [`stream::StreamEvent`] - events of a streamed reply

pub mod entities;
pub mod stream;
