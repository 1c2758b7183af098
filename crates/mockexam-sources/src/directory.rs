//! Chapter banks read from a local directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use mockexam_core::error::LoadError;
use mockexam_core::model::ChapterRef;
use mockexam_core::traits::QuestionSource;

/// Reads `<root>/<chapter>` for every chapter reference.
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl QuestionSource for DirectorySource {
    fn name(&self) -> &str {
        "directory"
    }

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn fetch(&self, chapter: &ChapterRef) -> Result<String, LoadError> {
        let path = self.root.join(chapter.as_str());
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            let message = match e.kind() {
                ErrorKind::NotFound => format!("no such file: {}", path.display()),
                _ => format!("cannot read {}: {e}", path.display()),
            };
            LoadError::unavailable(chapter.clone(), message)
        })
    }
}
