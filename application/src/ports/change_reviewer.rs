//! Change reviewer port
//!
//! The review collaborator receives each change script for the user to
//! accept or reject. Applying accepted changes happens on its side.

use async_trait::async_trait;
use cowrite_domain::ChangeScript;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Reviewer unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ChangeReviewer: Send + Sync {
    async fn submit(&self, script: ChangeScript) -> Result<(), ReviewError>;
}
