//! Document store adapters

use async_trait::async_trait;
use cowrite_application::ports::document_store::{DocumentStore, DocumentStoreError};
use cowrite_domain::Document;
use cowrite_domain::markup::parse_fragment;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// An HTML fragment file on disk.
///
/// The title is the file stem. A missing file reads as an empty document
/// and is created by the first [`DocumentStore::replace`]. Content is read
/// as-is; stamping anchor ids is the caller's job.
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn title_from_path(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn current(&self) -> Result<Option<Document>, DocumentStoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(DocumentStoreError::Io(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        Ok(Some(Document::new(
            self.title_from_path(),
            parse_fragment(&raw),
        )))
    }

    async fn replace(&self, document: Document) -> Result<(), DocumentStoreError> {
        let io = |e: std::io::Error| DocumentStoreError::Io(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io)?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, document.to_html()).await.map_err(io)?;
        tokio::fs::rename(&temp, &self.path).await.map_err(io)?;

        debug!(path = %self.path.display(), "Document written");
        Ok(())
    }
}

/// Document held in memory, for sessions without a backing file.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    document: Mutex<Option<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new(document: Option<Document>) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn current(&self) -> Result<Option<Document>, DocumentStoreError> {
        self.document
            .lock()
            .map(|d| d.clone())
            .map_err(|e| DocumentStoreError::Io(e.to_string()))
    }

    async fn replace(&self, document: Document) -> Result<(), DocumentStoreError> {
        let mut slot = self
            .document
            .lock()
            .map_err(|e| DocumentStoreError::Io(e.to_string()))?;
        *slot = Some(document);
        Ok(())
    }
}
