//! Submission orchestration: prompts and the exit visual sequence.
//!
//! The engine owns the ordering of a submission (guard, confirm, lock, stop,
//! score, exit, results, unlock). This module holds the pieces that ordering
//! is built from.

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::model::Question;
use crate::traits::{ExitAnimator, ExitItem};

/// Smallest scroll that accompanies an item exit.
pub const EXIT_SCROLL_DELTA_MIN: f64 = 120.0;
/// Largest scroll that accompanies an item exit.
pub const EXIT_SCROLL_DELTA_MAX: f64 = 240.0;

/// Notice shown when the countdown forces the submission.
pub const TIME_EXPIRED_NOTICE: &str = "Time is up! The exam is being submitted automatically.";

/// What started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    /// The candidate asked to submit. `confirm` asks before submitting with
    /// unanswered questions.
    User { confirm: bool },
    /// The countdown reached zero.
    TimeExpired,
}

impl SubmitTrigger {
    pub fn is_forced(self) -> bool {
        matches!(self, SubmitTrigger::TimeExpired)
    }
}

/// Confirmation asked before submitting with `unanswered` blanks.
pub fn unanswered_prompt(unanswered: usize) -> String {
    if unanswered == 1 {
        "There is 1 unanswered question. Submit the exam anyway?".to_string()
    } else {
        format!("There are {unanswered} unanswered questions. Submit the exam anyway?")
    }
}

/// Upward scroll paired with the exit of an item of the given height.
pub fn scroll_delta(height: f64) -> f64 {
    height
        .max(EXIT_SCROLL_DELTA_MIN)
        .clamp(EXIT_SCROLL_DELTA_MIN, EXIT_SCROLL_DELTA_MAX)
}

/// One exit item per displayed question, measured by the animator.
pub fn exit_items(questions: &[Question], animator: &dyn ExitAnimator) -> Vec<ExitItem> {
    questions
        .iter()
        .enumerate()
        .map(|(index, q)| ExitItem {
            index,
            question_id: q.id.clone(),
            height: animator.measure(index),
        })
        .collect()
}

/// Play the exit sequence.
///
/// Items go strictly one after another; within an item the exit animation and
/// its scroll run together. With reduced motion every item is hidden at once
/// and nothing is animated.
pub async fn run_exit_sequence(
    animator: Arc<dyn ExitAnimator>,
    items: Vec<ExitItem>,
    reduced_motion: bool,
) {
    if reduced_motion {
        for item in &items {
            animator.hide(item);
        }
        return;
    }

    for item in &items {
        let delta = scroll_delta(item.height);
        futures::join!(animator.animate_out(item), animator.scroll_by(-delta));
        animator.hide(item);
    }
}

/// `run_exit_sequence` as an owned future, ready to be held in flight.
pub fn exit_job(
    animator: Arc<dyn ExitAnimator>,
    items: Vec<ExitItem>,
    reduced_motion: bool,
) -> BoxFuture<'static, ()> {
    run_exit_sequence(animator, items, reduced_motion).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{questions, Event, RecordingAnimator};

    #[test]
    fn prompt_wording() {
        assert_eq!(
            unanswered_prompt(1),
            "There is 1 unanswered question. Submit the exam anyway?"
        );
        assert_eq!(
            unanswered_prompt(12),
            "There are 12 unanswered questions. Submit the exam anyway?"
        );
    }

    #[test]
    fn scroll_delta_is_clamped() {
        assert_eq!(scroll_delta(0.0), 120.0);
        assert_eq!(scroll_delta(180.0), 180.0);
        assert_eq!(scroll_delta(900.0), 240.0);
    }

    #[tokio::test]
    async fn items_run_one_after_another() {
        let animator = Arc::new(RecordingAnimator::with_height(150.0));
        let qs = questions(3);
        let items = exit_items(&qs, animator.as_ref());

        run_exit_sequence(animator.clone(), items, false).await;

        let events = animator.events();
        assert_eq!(events.len(), 15);
        for (i, chunk) in events.chunks(5).enumerate() {
            // Both transitions of item i start before either ends, and item i
            // is hidden before item i + 1 starts.
            assert_eq!(
                chunk,
                &[
                    Event::AnimateStart(i),
                    Event::ScrollStart(-150.0),
                    Event::AnimateEnd(i),
                    Event::ScrollEnd,
                    Event::Hidden(i),
                ]
            );
        }
    }

    #[tokio::test]
    async fn scroll_uses_clamped_height() {
        let animator = Arc::new(RecordingAnimator::with_height(40.0));
        let items = exit_items(&questions(1), animator.as_ref());

        run_exit_sequence(animator.clone(), items, false).await;

        assert!(animator.events().contains(&Event::ScrollStart(-120.0)));
    }

    #[tokio::test]
    async fn reduced_motion_only_hides() {
        let animator = Arc::new(RecordingAnimator::with_height(150.0));
        let qs = questions(2);
        let items = exit_items(&qs, animator.as_ref());

        run_exit_sequence(animator.clone(), items, true).await;

        assert_eq!(animator.events(), vec![Event::Hidden(0), Event::Hidden(1)]);
    }
}
