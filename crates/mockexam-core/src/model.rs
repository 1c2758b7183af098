//! Core data model types for mockexam.
//!
//! These are the fundamental types the whole system uses to represent
//! questions, chapter pools, sampling plans and exam settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of questions in a reference exam.
pub const EXAM_SIZE: usize = 40;
/// Total exam duration in seconds (75 minutes).
pub const EXAM_DURATION_SECS: u32 = 75 * 60;
/// Minimum score needed to pass a reference exam.
pub const PASS_THRESHOLD: u32 = 26;
/// Remaining-time window during which the countdown is flagged as urgent.
pub const URGENT_THRESHOLD_SECS: u32 = 5 * 60;

/// Identifier of a question, either numeric or textual (e.g. `"6-1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Number(n) => write!(f, "{n}"),
            QuestionId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for QuestionId {
    fn from(n: u64) -> Self {
        QuestionId::Number(n)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        QuestionId::Text(s.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(s: String) -> Self {
        QuestionId::Text(s)
    }
}

/// How a question statement should be rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementFormat {
    #[default]
    #[serde(alias = "text")]
    Plain,
    #[serde(alias = "markdown")]
    RichText,
}

impl fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementFormat::Plain => write!(f, "plain"),
            StatementFormat::RichText => write!(f, "richtext"),
        }
    }
}

impl FromStr for StatementFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(StatementFormat::Plain),
            "richtext" | "markdown" | "md" => Ok(StatementFormat::RichText),
            other => Err(format!("unknown statement format: {other}")),
        }
    }
}

/// A single multiple-choice question, enriched with its chapter metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique across an assembled exam.
    pub id: QuestionId,
    /// Statement text, in `format`.
    pub statement: String,
    /// Statement format.
    #[serde(default)]
    pub format: StatementFormat,
    /// Ordered answer choices (at least two).
    pub choices: Vec<String>,
    /// Index of the correct entry in `choices`.
    pub correct_index: usize,
    /// Chapter the question was drawn from.
    #[serde(default)]
    pub chapter_id: Option<String>,
    /// Title of that chapter.
    #[serde(default)]
    pub chapter_title: Option<String>,
}

/// Reference to a chapter bank, as named in a sampling plan (e.g. `chapt1.json`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterRef(pub String);

impl ChapterRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChapterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All candidate questions of one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterPool {
    /// Where the chapter was loaded from.
    pub source: ChapterRef,
    /// Chapter identifier (falls back to the source name).
    pub id: String,
    /// Chapter title (falls back to the source name).
    pub title: String,
    /// Statement format inherited by questions that don't specify one.
    pub default_format: Option<StatementFormat>,
    /// The questions, in file order.
    pub questions: Vec<Question>,
}

impl ChapterPool {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One row of a sampling plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Chapter bank to draw from.
    pub source: ChapterRef,
    /// How many questions to draw.
    pub count: usize,
}

/// Ordered table of how many questions to draw from each chapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPlan {
    pub entries: Vec<PlanEntry>,
}

impl SamplingPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    /// The six-chapter reference distribution (8/6/4/11/9/2 = 40).
    pub fn reference() -> Self {
        let counts = [8, 6, 4, 11, 9, 2];
        Self {
            entries: counts
                .iter()
                .enumerate()
                .map(|(i, &count)| PlanEntry {
                    source: ChapterRef::new(format!("chapt{}.json", i + 1)),
                    count,
                })
                .collect(),
        }
    }

    /// Sum of all requested counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Distinct chapter references in plan order.
    pub fn chapters(&self) -> Vec<ChapterRef> {
        let mut chapters: Vec<ChapterRef> = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !chapters.contains(&entry.source) {
                chapters.push(entry.source.clone());
            }
        }
        chapters
    }
}

/// Fixed parameters of an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSettings {
    /// Target number of questions.
    pub size: usize,
    /// Total time allowed, in seconds.
    pub duration_secs: u32,
    /// Minimum score to pass (inclusive).
    pub pass_threshold: u32,
    /// Remaining time at or below which the countdown is urgent.
    pub urgent_threshold_secs: u32,
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            size: EXAM_SIZE,
            duration_secs: EXAM_DURATION_SECS,
            pass_threshold: PASS_THRESHOLD,
            urgent_threshold_secs: URGENT_THRESHOLD_SECS,
        }
    }
}

/// A named exam: its settings plus the sampling plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamPlan {
    pub id: String,
    pub name: String,
    pub settings: ExamSettings,
    pub plan: SamplingPlan,
}

impl Default for ExamPlan {
    fn default() -> Self {
        Self {
            id: "reference".into(),
            name: "Mock exam".into(),
            settings: ExamSettings::default(),
            plan: SamplingPlan::reference(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_plan_sums_to_exam_size() {
        let plan = SamplingPlan::reference();
        assert_eq!(plan.entries.len(), 6);
        assert_eq!(plan.total(), EXAM_SIZE);
        assert_eq!(plan.entries[3].source.as_str(), "chapt4.json");
        assert_eq!(plan.entries[3].count, 11);
    }

    #[test]
    fn statement_format_display_and_parse() {
        assert_eq!(StatementFormat::RichText.to_string(), "richtext");
        assert_eq!(
            "markdown".parse::<StatementFormat>().unwrap(),
            StatementFormat::RichText
        );
        assert_eq!(
            "Text".parse::<StatementFormat>().unwrap(),
            StatementFormat::Plain
        );
        assert!("html".parse::<StatementFormat>().is_err());
    }

    #[test]
    fn question_id_accepts_numbers_and_strings() {
        let ids: Vec<QuestionId> = serde_json::from_str(r#"[12, "6-1"]"#).unwrap();
        assert_eq!(ids[0], QuestionId::Number(12));
        assert_eq!(ids[1], QuestionId::Text("6-1".into()));
        assert_eq!(ids[1].to_string(), "6-1");
    }

    #[test]
    fn chapters_are_listed_once() {
        let plan = SamplingPlan::new(vec![
            PlanEntry {
                source: ChapterRef::new("a.json"),
                count: 1,
            },
            PlanEntry {
                source: ChapterRef::new("b.json"),
                count: 1,
            },
            PlanEntry {
                source: ChapterRef::new("a.json"),
                count: 2,
            },
        ]);
        assert_eq!(
            plan.chapters(),
            vec![ChapterRef::new("a.json"), ChapterRef::new("b.json")]
        );
        assert_eq!(plan.total(), 4);
    }

    #[test]
    fn default_settings() {
        let settings = ExamSettings::default();
        assert_eq!(settings.size, 40);
        assert_eq!(settings.duration_secs, 4500);
        assert_eq!(settings.pass_threshold, 26);
        assert_eq!(settings.urgent_threshold_secs, 300);
    }
}
