//! Plan (TOML) and chapter bank (JSON) parsers.
//!
//! Loads exam plans from TOML files, decodes chapter banks into enriched
//! `ChapterPool`s, and validates plans against the pools they draw from.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::model::{
    ChapterPool, ChapterRef, ExamPlan, ExamSettings, PlanEntry, Question, QuestionId,
    SamplingPlan, StatementFormat, EXAM_DURATION_SECS, EXAM_SIZE, PASS_THRESHOLD,
    URGENT_THRESHOLD_SECS,
};

// ---------------------------------------------------------------------------
// Plan files
// ---------------------------------------------------------------------------

/// Intermediate TOML structure for parsing plan files.
#[derive(Debug, Deserialize)]
struct TomlPlanFile {
    exam: TomlExamHeader,
    #[serde(default)]
    chapters: Vec<TomlChapterEntry>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    name: String,
    #[serde(default = "default_size")]
    size: usize,
    #[serde(default = "default_duration")]
    duration_secs: u32,
    #[serde(default = "default_pass_threshold")]
    pass_threshold: u32,
    #[serde(default = "default_urgent_threshold")]
    urgent_threshold_secs: u32,
}

fn default_size() -> usize {
    EXAM_SIZE
}

fn default_duration() -> u32 {
    EXAM_DURATION_SECS
}

fn default_pass_threshold() -> u32 {
    PASS_THRESHOLD
}

fn default_urgent_threshold() -> u32 {
    URGENT_THRESHOLD_SECS
}

#[derive(Debug, Deserialize)]
struct TomlChapterEntry {
    source: String,
    count: usize,
}

/// Parse a plan file from disk.
pub fn parse_plan(path: &Path) -> Result<ExamPlan> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file: {}", path.display()))?;

    parse_plan_str(&content, path)
}

/// Parse a TOML string into an `ExamPlan` (useful for testing).
pub fn parse_plan_str(content: &str, source_path: &Path) -> Result<ExamPlan> {
    let parsed: TomlPlanFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    anyhow::ensure!(
        !parsed.chapters.is_empty(),
        "plan {} lists no chapters",
        source_path.display()
    );
    let mut listed = HashSet::new();
    for chapter in &parsed.chapters {
        anyhow::ensure!(
            listed.insert(chapter.source.as_str()),
            "chapter {} is listed more than once; give it a single entry with the combined count",
            chapter.source
        );
    }
    anyhow::ensure!(parsed.exam.size > 0, "exam size must be at least 1");
    anyhow::ensure!(
        parsed.exam.duration_secs > 0,
        "exam duration must be at least 1 second"
    );
    anyhow::ensure!(
        parsed.exam.pass_threshold as usize <= parsed.exam.size,
        "pass threshold {} exceeds exam size {}",
        parsed.exam.pass_threshold,
        parsed.exam.size
    );

    let plan = SamplingPlan::new(
        parsed
            .chapters
            .into_iter()
            .map(|c| PlanEntry {
                source: ChapterRef::new(c.source),
                count: c.count,
            })
            .collect(),
    );

    anyhow::ensure!(
        plan.total() == parsed.exam.size,
        "sampling plan draws {} questions but the exam size is {}",
        plan.total(),
        parsed.exam.size
    );

    Ok(ExamPlan {
        id: parsed.exam.id,
        name: parsed.exam.name,
        settings: ExamSettings {
            size: parsed.exam.size,
            duration_secs: parsed.exam.duration_secs,
            pass_threshold: parsed.exam.pass_threshold,
            urgent_threshold_secs: parsed.exam.urgent_threshold_secs,
        },
        plan,
    })
}

// ---------------------------------------------------------------------------
// Chapter banks
// ---------------------------------------------------------------------------

/// On-disk layout of a chapter bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_format: Option<StatementFormat>,
    pub questions: Vec<QuestionRecord>,
}

/// A question as written in a chapter bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub question_id: QuestionId,
    pub statement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_format: Option<StatementFormat>,
    pub choices: Vec<String>,
    pub correct_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
}

impl ChapterFile {
    /// Validate the records and enrich them with the chapter defaults.
    pub fn into_pool(self, source: ChapterRef) -> Result<ChapterPool, LoadError> {
        let chapter_id = self.chapter_id.unwrap_or_else(|| source.to_string());
        let title = self.title.unwrap_or_else(|| source.to_string());
        let default_format = self.statement_format;

        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(self.questions.len());
        for record in self.questions {
            if record.choices.len() < 2 {
                return Err(LoadError::malformed(
                    source,
                    format!("question {} has fewer than two choices", record.question_id),
                ));
            }
            if record.correct_index >= record.choices.len() {
                return Err(LoadError::malformed(
                    source,
                    format!(
                        "question {} has correct index {} but only {} choices",
                        record.question_id,
                        record.correct_index,
                        record.choices.len()
                    ),
                ));
            }
            if !seen.insert(record.question_id.clone()) {
                return Err(LoadError::malformed(
                    source,
                    format!("duplicate question id {}", record.question_id),
                ));
            }

            questions.push(Question {
                id: record.question_id,
                statement: record.statement,
                format: record
                    .statement_format
                    .or(default_format)
                    .unwrap_or_default(),
                choices: record.choices,
                correct_index: record.correct_index,
                chapter_id: record.chapter_id.or_else(|| Some(chapter_id.clone())),
                chapter_title: record.chapter_title.or_else(|| Some(title.clone())),
            });
        }

        Ok(ChapterPool {
            source,
            id: chapter_id,
            title,
            default_format,
            questions,
        })
    }
}

/// Decode a chapter bank body into an enriched pool.
pub fn parse_chapter_str(source: &ChapterRef, content: &str) -> Result<ChapterPool, LoadError> {
    let file: ChapterFile = serde_json::from_str(content)
        .map_err(|e| LoadError::malformed(source.clone(), e.to_string()))?;
    file.into_pool(source.clone())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A warning from plan validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The chapter concerned (if applicable).
    pub chapter: Option<ChapterRef>,
    /// Warning message.
    pub message: String,
}

/// Check a plan against loaded pools for conditions that would shorten or
/// corrupt an exam.
pub fn validate_plan(exam: &ExamPlan, pools: &[ChapterPool]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.plan.total() != exam.settings.size {
        warnings.push(ValidationWarning {
            chapter: None,
            message: format!(
                "plan draws {} questions, exam size is {}",
                exam.plan.total(),
                exam.settings.size
            ),
        });
    }

    let by_source: HashMap<&ChapterRef, &ChapterPool> =
        pools.iter().map(|p| (&p.source, p)).collect();

    for entry in &exam.plan.entries {
        match by_source.get(&entry.source) {
            Some(pool) if pool.len() < entry.count => warnings.push(ValidationWarning {
                chapter: Some(entry.source.clone()),
                message: format!(
                    "requests {} questions but the chapter only has {}",
                    entry.count,
                    pool.len()
                ),
            }),
            Some(_) => {}
            None => warnings.push(ValidationWarning {
                chapter: Some(entry.source.clone()),
                message: "chapter was not loaded".into(),
            }),
        }
    }

    let mut seen: HashMap<&QuestionId, &ChapterRef> = HashMap::new();
    for pool in pools {
        for q in &pool.questions {
            if let Some(first) = seen.insert(&q.id, &pool.source) {
                warnings.push(ValidationWarning {
                    chapter: Some(pool.source.clone()),
                    message: format!("question id {} is also used in {}", q.id, first),
                });
            }
        }
    }

    warnings
}
