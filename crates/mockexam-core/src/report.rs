//! Exam report types with JSON persistence and the results summary text.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::{score, AnswerMap, Selection, Verdict};
use crate::model::{ExamSettings, Question, QuestionId, StatementFormat};
use crate::timer::Clock;

/// Scored snapshot of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    /// Name of the exam plan.
    pub exam_name: String,
    /// Number of correct answers.
    pub score: u32,
    /// Number of questions in the attempt.
    pub total: u32,
    /// Score needed to pass.
    pub pass_threshold: u32,
    pub verdict: Verdict,
    /// Seconds used before submission.
    pub elapsed_secs: u32,
    /// Seconds allotted.
    pub duration_secs: u32,
    /// Whether the countdown forced the submission.
    pub time_expired: bool,
    /// Per-chapter breakdown, in order of first appearance.
    pub chapters: Vec<ChapterScore>,
    /// Per-question review, in display order.
    pub questions: Vec<QuestionReview>,
}

/// Correct answers within one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterScore {
    pub chapter_id: String,
    pub title: String,
    pub correct: u32,
    pub total: u32,
}

/// Review line for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionReview {
    /// 1-based display number.
    pub number: usize,
    pub question_id: QuestionId,
    #[serde(default)]
    pub chapter_id: Option<String>,
    pub statement: String,
    pub format: StatementFormat,
    pub choices: Vec<String>,
    pub selected: Selection,
    pub correct_index: usize,
    pub correct: bool,
}

impl QuestionReview {
    /// Text of the selected choice, or a placeholder when none was picked.
    pub fn selected_text(&self) -> &str {
        self.selected
            .index()
            .and_then(|i| self.choices.get(i))
            .map_or("No answer selected", String::as_str)
    }

    pub fn correct_text(&self) -> &str {
        self.choices
            .get(self.correct_index)
            .map_or("", String::as_str)
    }
}

impl ExamReport {
    /// Score `questions` against `answers` and capture the timing.
    pub fn build(
        exam_name: &str,
        settings: &ExamSettings,
        questions: &[Question],
        answers: &AnswerMap,
        clock: &Clock,
        time_expired: bool,
    ) -> Self {
        let score = score(questions, answers);

        let reviews: Vec<QuestionReview> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let selected = answers.get(&q.id);
                QuestionReview {
                    number: i + 1,
                    question_id: q.id.clone(),
                    chapter_id: q.chapter_id.clone(),
                    statement: q.statement.clone(),
                    format: q.format,
                    choices: q.choices.clone(),
                    selected,
                    correct_index: q.correct_index,
                    correct: selected.is_correct_for(q),
                }
            })
            .collect();

        let mut chapters: Vec<ChapterScore> = Vec::new();
        for (q, review) in questions.iter().zip(&reviews) {
            let chapter_id = q.chapter_id.clone().unwrap_or_default();
            let idx = match chapters.iter().position(|c| c.chapter_id == chapter_id) {
                Some(idx) => idx,
                None => {
                    chapters.push(ChapterScore {
                        chapter_id: chapter_id.clone(),
                        title: q.chapter_title.clone().unwrap_or(chapter_id),
                        correct: 0,
                        total: 0,
                    });
                    chapters.len() - 1
                }
            };
            chapters[idx].total += 1;
            if review.correct {
                chapters[idx].correct += 1;
            }
        }

        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            exam_name: exam_name.to_string(),
            score,
            total: questions.len() as u32,
            pass_threshold: settings.pass_threshold,
            verdict: Verdict::from_score(score, settings.pass_threshold),
            elapsed_secs: clock.elapsed_secs(),
            duration_secs: clock.duration_secs(),
            time_expired,
            chapters,
            questions: reviews,
        }
    }

    /// Score as a percentage of the question count.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64 * 100.0
    }

    /// Elapsed time as a percentage of the allotted time.
    pub fn time_used_percentage(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.elapsed_secs as f64 / self.duration_secs as f64 * 100.0
    }

    /// `You scored 26/40 (65.00%).`
    pub fn score_line(&self) -> String {
        format!(
            "You scored {}/{} ({:.2}%).",
            self.score,
            self.total,
            self.percentage()
        )
    }

    /// `Time used: 12m 05s (16.11% of the allotted time).`
    pub fn time_line(&self) -> String {
        format!(
            "Time used: {} ({:.2}% of the allotted time).",
            format_elapsed(self.elapsed_secs),
            self.time_used_percentage()
        )
    }

    /// Full results summary: score, time, then the pass/fail message.
    pub fn summary_text(&self) -> String {
        format!(
            "{} {} {}",
            self.score_line(),
            self.time_line(),
            self.verdict.message()
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ExamReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Format seconds as `Xm YYs`.
pub fn format_elapsed(secs: u32) -> String {
    format!("{}m {:02}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerStore;
    use crate::testing::questions;

    fn build(correct: usize, total: usize, elapsed: u32) -> ExamReport {
        let qs = questions(total);
        let mut store = AnswerStore::new();
        for q in qs.iter().take(correct) {
            store.record(q.id.clone(), q.correct_index);
        }
        let mut clock = Clock::new(4500, 300);
        for _ in 0..elapsed {
            clock.tick();
        }
        ExamReport::build(
            "Mock",
            &ExamSettings::default(),
            &qs,
            &store.collect(&qs),
            &clock,
            false,
        )
    }

    #[test]
    fn pass_at_threshold() {
        let report = build(26, 40, 725);
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(
            report.summary_text(),
            "You scored 26/40 (65.00%). Time used: 12m 05s (16.11% of the allotted time). \
             Congratulations, you passed the exam!"
        );
    }

    #[test]
    fn fail_below_threshold() {
        let report = build(25, 40, 4500);
        assert_eq!(report.verdict, Verdict::Fail);
        assert!(report.summary_text().ends_with("Sorry, you did not pass the exam."));
        assert!(report.time_line().contains("75m 00s (100.00%"));
    }

    #[test]
    fn review_marks_unanswered() {
        let report = build(1, 3, 0);
        assert!(report.questions[0].correct);
        assert_eq!(report.questions[2].selected, Selection::Unanswered);
        assert_eq!(report.questions[2].selected_text(), "No answer selected");
        assert_eq!(report.questions[2].number, 3);
    }

    #[test]
    fn chapter_breakdown_counts() {
        let report = build(2, 4, 0);
        let total: u32 = report.chapters.iter().map(|c| c.total).sum();
        let correct: u32 = report.chapters.iter().map(|c| c.correct).sum();
        assert_eq!(total, 4);
        assert_eq!(correct, 2);
    }

    #[test]
    fn elapsed_format() {
        assert_eq!(format_elapsed(0), "0m 00s");
        assert_eq!(format_elapsed(61), "1m 01s");
        assert_eq!(format_elapsed(4500), "75m 00s");
    }

    #[test]
    fn json_roundtrip() {
        let report = build(3, 5, 90);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        report.save_json(&path).unwrap();
        let loaded = ExamReport::load_json(&path).unwrap();

        assert_eq!(loaded.score, 3);
        assert_eq!(loaded.questions.len(), 5);
        assert_eq!(loaded.questions[4].selected, Selection::Unanswered);
    }
}
