//! Exam session state machine.
//!
//! `Session` is the single owned record of an attempt. Every mutation goes
//! through one of its methods, and each method refuses to act when the
//! current state does not allow it (returning `false`/`None` rather than an
//! error), which makes illegal triggers no-ops.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::answers::{AnswerMap, AnswerStore};
use crate::model::{ExamSettings, Question, QuestionId};
use crate::report::ExamReport;
use crate::timer::Clock;

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No exam in progress; intro view.
    #[default]
    Idle,
    /// Exam in progress, countdown active, answers collectable.
    Running,
    /// Countdown stopped, score computed, review visible.
    Results,
}

impl SessionState {
    /// The only legal moves: idle → running → results → idle.
    pub fn can_transition(self, to: SessionState) -> bool {
        matches!(
            (self, to),
            (SessionState::Idle, SessionState::Running)
                | (SessionState::Running, SessionState::Results)
                | (SessionState::Results, SessionState::Idle)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Running => write!(f, "running"),
            SessionState::Results => write!(f, "results"),
        }
    }
}

/// The exam session record.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    settings: ExamSettings,
    questions: Arc<[Question]>,
    clock: Clock,
    answers: AnswerStore,
    report: Option<ExamReport>,
    loading: bool,
    submitting: bool,
}

impl Session {
    pub fn new(settings: ExamSettings) -> Self {
        Self {
            state: SessionState::Idle,
            settings,
            questions: Arc::from(Vec::new()),
            clock: Clock::new(settings.duration_secs, settings.urgent_threshold_secs),
            answers: AnswerStore::new(),
            report: None,
            loading: false,
            submitting: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &ExamSettings {
        &self.settings
    }

    /// The drawn question set (empty outside `running`/`results`).
    pub fn questions(&self) -> &Arc<[Question]> {
        &self.questions
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn remaining_secs(&self) -> u32 {
        self.clock.remaining_secs()
    }

    /// Whether a chapter load for a start is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Scored results; only present in `results`.
    pub fn report(&self) -> Option<&ExamReport> {
        self.report.as_ref()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count(&self.questions)
    }

    pub fn find_question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == question_id)
    }

    // -- idle → running -----------------------------------------------------

    /// Mark a start as in progress. Refused unless idle with no load or
    /// submission outstanding.
    pub fn begin_loading(&mut self) -> bool {
        if !self.state.can_transition(SessionState::Running) || self.loading || self.submitting {
            return false;
        }
        self.loading = true;
        self.clock.reset();
        true
    }

    /// Abandon a start: stay idle and drop anything partially loaded.
    pub fn abort_start(&mut self) {
        self.loading = false;
        self.questions = Arc::from(Vec::new());
        self.answers.clear();
        self.clock.reset();
    }

    /// Enter `running` with the drawn question set.
    pub fn enter_running(&mut self, questions: Vec<Question>) -> bool {
        if !self.state.can_transition(SessionState::Running)
            || !self.loading
            || questions.is_empty()
        {
            return false;
        }
        self.loading = false;
        self.questions = Arc::from(questions);
        self.answers.clear();
        self.report = None;
        self.clock.reset();
        self.state = SessionState::Running;
        true
    }

    // -- running ------------------------------------------------------------

    /// Whether answers may currently be recorded.
    pub fn accepts_answers(&self) -> bool {
        self.state == SessionState::Running && !self.submitting
    }

    pub fn record_answer(&mut self, question_id: QuestionId, choice: usize) -> bool {
        if !self.accepts_answers() {
            return false;
        }
        self.answers.record(question_id, choice);
        true
    }

    /// Apply one countdown tick; returns the new remaining time.
    pub fn tick(&mut self) -> Option<u32> {
        if self.state != SessionState::Running || self.submitting || self.clock.is_expired() {
            return None;
        }
        Some(self.clock.tick())
    }

    // -- running → results --------------------------------------------------

    /// Claim the single submission slot.
    pub fn begin_submission(&mut self) -> bool {
        if self.state != SessionState::Running || self.submitting {
            return false;
        }
        self.submitting = true;
        true
    }

    /// Current answers frozen for scoring.
    pub fn snapshot(&self) -> AnswerMap {
        self.answers.collect(&self.questions)
    }

    /// Commit the scored results and enter `results`.
    pub fn finish_submission(&mut self, report: ExamReport) -> bool {
        if !self.state.can_transition(SessionState::Results) || !self.submitting {
            return false;
        }
        self.report = Some(report);
        self.submitting = false;
        self.state = SessionState::Results;
        true
    }

    // -- results → idle -----------------------------------------------------

    /// Clear the attempt and go back to the intro.
    pub fn retry(&mut self) -> bool {
        if !self.state.can_transition(SessionState::Idle) {
            return false;
        }
        self.questions = Arc::from(Vec::new());
        self.answers.clear();
        self.report = None;
        self.clock.reset();
        self.state = SessionState::Idle;
        true
    }
}
