//! Answer store and scorer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuestionId};

/// What the candidate picked for one question.
///
/// Serialized as the choice index, or `-1` when nothing was selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", from = "i64")]
pub enum Selection {
    #[default]
    Unanswered,
    Choice(usize),
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::Choice(i) => Some(i),
            Selection::Unanswered => None,
        }
    }

    pub fn is_answered(self) -> bool {
        matches!(self, Selection::Choice(_))
    }

    /// Whether this selection is the correct choice of `question`.
    ///
    /// Out-of-range indices are simply wrong.
    pub fn is_correct_for(self, question: &Question) -> bool {
        match self {
            Selection::Choice(i) => i == question.correct_index && i < question.choices.len(),
            Selection::Unanswered => false,
        }
    }
}

impl From<Selection> for i64 {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Choice(i) => i as i64,
            Selection::Unanswered => -1,
        }
    }
}

impl From<i64> for Selection {
    fn from(value: i64) -> Self {
        if value < 0 {
            Selection::Unanswered
        } else {
            Selection::Choice(value as usize)
        }
    }
}

/// Live answers of the running attempt. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, usize>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the choice for a question.
    pub fn record(&mut self, question_id: QuestionId, choice: usize) {
        self.answers.insert(question_id, choice);
    }

    pub fn get(&self, question_id: &QuestionId) -> Selection {
        self.answers
            .get(question_id)
            .map_or(Selection::Unanswered, |&i| Selection::Choice(i))
    }

    /// How many of `questions` have an answer.
    pub fn answered_count(&self, questions: &[Question]) -> usize {
        questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count()
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }

    /// Snapshot restricted to `questions`; every one of them gets an entry.
    pub fn collect(&self, questions: &[Question]) -> AnswerMap {
        AnswerMap {
            selections: questions
                .iter()
                .map(|q| (q.id.clone(), self.get(&q.id)))
                .collect(),
        }
    }
}

/// Frozen answers of a submitted attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerMap {
    selections: HashMap<QuestionId, Selection>,
}

impl AnswerMap {
    /// The selection for a question; unknown questions read as unanswered.
    pub fn get(&self, question_id: &QuestionId) -> Selection {
        self.selections
            .get(question_id)
            .copied()
            .unwrap_or(Selection::Unanswered)
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn unanswered(&self) -> usize {
        self.selections.values().filter(|s| !s.is_answered()).count()
    }
}

/// Number of questions whose selection is the correct choice.
pub fn score(questions: &[Question], answers: &AnswerMap) -> u32 {
    questions
        .iter()
        .filter(|q| answers.get(&q.id).is_correct_for(q))
        .count() as u32
}

/// Pass or fail against a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// `Pass` when `score >= threshold`.
    pub fn from_score(score: u32, threshold: u32) -> Self {
        if score >= threshold {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    pub fn passed(self) -> bool {
        self == Verdict::Pass
    }

    /// Message appended to the results summary.
    pub fn message(self) -> &'static str {
        match self {
            Verdict::Pass => "Congratulations, you passed the exam!",
            Verdict::Fail => "Sorry, you did not pass the exam.",
        }
    }
}
