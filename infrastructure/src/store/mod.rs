//! Document and chat stores

mod chat;
mod document;

pub use chat::InMemoryChatStore;
pub use document::{FileDocumentStore, InMemoryDocumentStore};
