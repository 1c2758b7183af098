//! Chapter loading on top of a `QuestionSource`.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::{ChapterPool, ChapterRef};
use crate::parser::parse_chapter_str;
use crate::traits::QuestionSource;

/// Load every chapter in order, one fetch per reference.
///
/// Stops at the first chapter that cannot be fetched or decoded. Question
/// identifiers must be unique across all loaded chapters.
pub async fn load_pools(
    source: &dyn QuestionSource,
    chapters: &[ChapterRef],
) -> Result<Vec<ChapterPool>, LoadError> {
    let mut pools = Vec::with_capacity(chapters.len());
    let mut seen = HashSet::new();

    for chapter in chapters {
        let pool = load_chapter(source, chapter).await.inspect_err(|e| {
            tracing::error!("{e}");
        })?;

        for q in &pool.questions {
            if !seen.insert(q.id.clone()) {
                return Err(LoadError::malformed(
                    chapter.clone(),
                    format!("question id {} already used by another chapter", q.id),
                ));
            }
        }

        tracing::debug!(
            chapter = %chapter,
            questions = pool.len(),
            "loaded chapter from {}",
            source.name()
        );
        pools.push(pool);
    }

    Ok(pools)
}

/// Fetch and decode a single chapter.
pub async fn load_chapter(
    source: &dyn QuestionSource,
    chapter: &ChapterRef,
) -> Result<ChapterPool, LoadError> {
    let body = source.fetch(chapter).await?;
    parse_chapter_str(chapter, &body)
}

/// In-memory question source.
///
/// Useful for embedding banks in a binary and for driving the engine in
/// tests. Unknown chapters fail with HTTP-like status 404.
#[derive(Default)]
pub struct StaticSource {
    bodies: HashMap<ChapterRef, String>,
    fetch_count: AtomicU32,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the raw body of a chapter.
    pub fn with_body(mut self, chapter: impl Into<String>, body: impl Into<String>) -> Self {
        self.bodies.insert(ChapterRef::new(chapter), body.into());
        self
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, chapter: &ChapterRef) -> Result<String, LoadError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        self.bodies
            .get(chapter)
            .cloned()
            .ok_or_else(|| LoadError::status(chapter.clone(), 404))
    }
}
