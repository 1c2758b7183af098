//! Capability traits the engine is wired to.
//!
//! Question sources live in `mockexam-sources`; views, prompts and exit
//! animators are supplied by whichever front-end drives the engine.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::{ChapterRef, Question, QuestionId};
use crate::report::ExamReport;

// ---------------------------------------------------------------------------
// Question source
// ---------------------------------------------------------------------------

/// Backend that fetches the raw body of a chapter bank.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Human-readable source name (e.g. "directory").
    fn name(&self) -> &str;

    /// Fetch the raw JSON body of one chapter.
    async fn fetch(&self, chapter: &ChapterRef) -> Result<String, LoadError>;
}

// ---------------------------------------------------------------------------
// Front-end capabilities
// ---------------------------------------------------------------------------

/// Everything the engine shows to the candidate.
pub trait ExamView: Send + Sync {
    /// Show the intro screen (idle state).
    fn show_intro(&self);
    /// Show the drawn questions and focus the first one.
    fn show_exam(&self, questions: &[Question]);
    /// Redraw the countdown.
    fn update_timer(&self, remaining_secs: u32, urgent: bool);
    /// Redraw answered/total progress.
    fn update_progress(&self, answered: usize, total: usize);
    /// Enable or disable every answer input and the submit control.
    fn set_transition_lock(&self, locked: bool);
    /// Show the score and the per-question review.
    fn show_results(&self, report: &ExamReport);
}

/// Blocking dialogs, modelled as an injected capability.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask a yes/no question.
    async fn confirm(&self, text: &str) -> bool;
    /// Show an informational message.
    fn notify(&self, text: &str);
}

/// One displayed question taking part in the exit sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitItem {
    /// Position on screen, starting at 0.
    pub index: usize,
    pub question_id: QuestionId,
    /// Rendered height, used to size the scroll that accompanies the exit.
    pub height: f64,
}

/// Visual effects played while the exam view is torn down.
#[async_trait]
pub trait ExitAnimator: Send + Sync {
    /// Rendered height of the item at `index`.
    fn measure(&self, index: usize) -> f64;
    /// Play the exit animation of one item.
    async fn animate_out(&self, item: &ExitItem);
    /// Scroll the page by `delta` (negative scrolls up).
    async fn scroll_by(&self, delta: f64);
    /// Remove an item from view without animating it.
    fn hide(&self, item: &ExitItem);
    /// Bring the results into view.
    async fn scroll_to_top(&self, reduced_motion: bool);
}
