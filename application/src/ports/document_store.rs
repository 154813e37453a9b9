//! Document store port
//!
//! Read/replace access to the one open document.

use async_trait::async_trait;
use cowrite_domain::Document;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentStoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Document not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The current document, or `None` when nothing is open.
    async fn current(&self) -> Result<Option<Document>, DocumentStoreError>;

    /// Replace content and title of the open document.
    async fn replace(&self, document: Document) -> Result<(), DocumentStoreError>;

    async fn title(&self) -> Result<Option<String>, DocumentStoreError> {
        Ok(self.current().await?.map(|d| d.title().to_string()))
    }
}
