//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation
//! adapters must implement.

pub mod change_reviewer;
pub mod chat_store;
pub mod conversation_logger;
pub mod document_store;
pub mod llm_gateway;
pub mod progress;
