//! mockexam-sources: Question bank backends.
//!
//! Implements the `QuestionSource` trait for chapter banks stored in a local
//! directory or served over HTTP, and loads the mockexam configuration that
//! selects between them.

pub mod config;
pub mod directory;
pub mod http;

pub use config::{create_source, load_config, load_config_from, MockExamConfig, SourceConfig};
pub use directory::DirectorySource;
pub use http::HttpSource;
