//! Infrastructure layer for cowrite
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileAgentEntry, FileCollaborationConfig, FileConfig,
    FileInstructionConfig, FileLoggingConfig, FileOutputConfig, FileServiceConfig,
};
pub use logging::JsonlConversationLogger;
pub use service::{HttpLlmGateway, SseFrameDecoder};
pub use store::{FileDocumentStore, InMemoryChatStore, InMemoryDocumentStore};
