//! Streaming chat service adapter
//!
//! - [`gateway`]: [`HttpLlmGateway`], the reqwest-based [`LlmGateway`](cowrite_application::LlmGateway)
//! - [`protocol`]: request body and response frame types
//! - [`sse`]: incremental `text/event-stream` decoder

pub mod gateway;
pub mod protocol;
pub mod sse;

pub use gateway::HttpLlmGateway;
pub use sse::SseFrameDecoder;
