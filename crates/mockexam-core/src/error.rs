//! Exam error types.
//!
//! `LoadError` is produced by question sources and carries the failing
//! chapter so the engine can name it in the single message shown to the user.

use thiserror::Error;

use crate::model::ChapterRef;

/// Why a chapter could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadCause {
    /// The source answered with a non-success status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// The source could not be reached or read.
    #[error("{0}")]
    Unavailable(String),

    /// The payload was not a valid chapter bank.
    #[error("malformed chapter data: {0}")]
    Malformed(String),
}

/// A chapter source could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load chapter {chapter}: {cause}")]
pub struct LoadError {
    pub chapter: ChapterRef,
    #[source]
    pub cause: LoadCause,
}

impl LoadError {
    pub fn new(chapter: ChapterRef, cause: LoadCause) -> Self {
        Self { chapter, cause }
    }

    pub fn status(chapter: ChapterRef, status: u16) -> Self {
        Self::new(chapter, LoadCause::Status(status))
    }

    pub fn unavailable(chapter: ChapterRef, message: impl Into<String>) -> Self {
        Self::new(chapter, LoadCause::Unavailable(message.into()))
    }

    pub fn malformed(chapter: ChapterRef, message: impl Into<String>) -> Self {
        Self::new(chapter, LoadCause::Malformed(message.into()))
    }
}

/// Errors that prevent an exam from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExamError {
    /// A chapter could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Sampling produced no questions at all.
    #[error("no questions could be selected for this exam")]
    EmptySelection,
}

impl ExamError {
    /// Message shown to the user when a start is aborted.
    pub fn user_message(&self) -> String {
        match self {
            ExamError::Load(e) => format!(
                "Unable to load the questions for chapter {}: {}",
                e.chapter, e.cause
            ),
            ExamError::EmptySelection => {
                "Unable to start the exam: no questions are available.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_chapter() {
        let err = LoadError::status(ChapterRef::new("chapt3.json"), 404);
        assert_eq!(
            err.to_string(),
            "failed to load chapter chapt3.json: HTTP status 404"
        );
        let msg = ExamError::from(err).user_message();
        assert!(msg.contains("chapt3.json"));
        assert!(msg.contains("404"));
    }
}
