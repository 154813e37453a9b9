//! Console change reviewer
//!
//! Prints each submitted change script and, when configured, writes its
//! markup form to a file for an editor integration to pick up.

use crate::output::console::ConsoleFormatter;
use async_trait::async_trait;
use cowrite_application::ports::change_reviewer::{ChangeReviewer, ReviewError};
use cowrite_domain::ChangeScript;
use std::path::PathBuf;
use tracing::{debug, info};

pub struct ConsoleReviewer {
    output_file: Option<PathBuf>,
    quiet: bool,
}

impl ConsoleReviewer {
    pub fn new() -> Self {
        Self {
            output_file: None,
            quiet: false,
        }
    }

    /// Also write `<changes>...</changes>` markup to `path` on every submit.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

impl Default for ConsoleReviewer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeReviewer for ConsoleReviewer {
    async fn submit(&self, script: ChangeScript) -> Result<(), ReviewError> {
        debug!(entries = script.len(), "Change script submitted for review");
        if !self.quiet {
            println!();
            print!("{}", ConsoleFormatter::format_change_script(&script));
        }

        if let Some(path) = &self.output_file {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ReviewError::Unavailable(e.to_string()))?;
            }
            tokio::fs::write(path, script.render())
                .await
                .map_err(|e| ReviewError::Unavailable(format!("{}: {e}", path.display())))?;
            info!(path = %path.display(), "Change script written");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cowrite_domain::{ChangeEntry, ElementId};

    fn script() -> ChangeScript {
        ChangeScript::new(vec![ChangeEntry::Delete {
            target: Some(ElementId::new("el-4")),
            content: "Old paragraph".into(),
        }])
    }

    #[tokio::test]
    async fn test_writes_markup_to_review_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("review").join("changes.html");
        let reviewer = ConsoleReviewer::new().with_quiet(true).with_output_file(&path);

        reviewer.submit(script()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, script().render());
    }

    #[tokio::test]
    async fn test_unwritable_review_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let reviewer = ConsoleReviewer::new()
            .with_quiet(true)
            .with_output_file(dir.path());

        let err = reviewer.submit(script()).await.unwrap_err();
        assert!(matches!(err, ReviewError::Unavailable(_)));
    }
}
