pub mod init;
pub mod run;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use mockexam_core::traits::QuestionSource;
use mockexam_sources::{create_source, MockExamConfig, SourceConfig};

/// Build the question source, command-line flags first, then the config.
pub fn resolve_source(
    config: &MockExamConfig,
    banks: Option<PathBuf>,
    base_url: Option<String>,
) -> Result<Arc<dyn QuestionSource>> {
    let source_config = match (banks, base_url) {
        (Some(path), _) => SourceConfig::Directory { path },
        (None, Some(base_url)) => SourceConfig::Http { base_url },
        (None, None) => config.source.clone(),
    };
    Ok(Arc::from(create_source(&source_config)?))
}
