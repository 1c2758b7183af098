//! Fixtures and recording fakes shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::model::{ChapterPool, ChapterRef, Question, QuestionId, StatementFormat};
use crate::parser::{ChapterFile, QuestionRecord};
use crate::report::ExamReport;
use crate::session::Session;
use crate::traits::{ExamView, ExitAnimator, ExitItem, UserPrompt};

fn choices() -> Vec<String> {
    ["A", "B", "C", "D"].iter().map(|c| c.to_string()).collect()
}

/// JSON body of a chapter bank with `n` questions `"{prefix}-{i}"`.
pub fn bank(prefix: &str, n: usize) -> String {
    let file = ChapterFile {
        chapter_id: Some(prefix.to_string()),
        title: Some(format!("Chapter {prefix}")),
        statement_format: None,
        questions: (0..n)
            .map(|i| QuestionRecord {
                question_id: QuestionId::from(format!("{prefix}-{i}")),
                statement: format!("Question {i} of {prefix}?"),
                statement_format: None,
                choices: choices(),
                correct_index: i % 4,
                chapter_id: None,
                chapter_title: None,
            })
            .collect(),
    };
    serde_json::to_string(&file).unwrap()
}

/// Pool of `n` questions loaded from `source`.
pub fn pool(source: &str, chapter_id: &str, n: usize) -> ChapterPool {
    ChapterPool {
        source: ChapterRef::new(source),
        id: chapter_id.to_string(),
        title: format!("Chapter {chapter_id}"),
        default_format: None,
        questions: (0..n)
            .map(|i| Question {
                id: QuestionId::from(format!("{chapter_id}-{i}")),
                statement: format!("Question {i} of {chapter_id}?"),
                format: StatementFormat::Plain,
                choices: choices(),
                correct_index: i % 4,
                chapter_id: Some(chapter_id.to_string()),
                chapter_title: Some(format!("Chapter {chapter_id}")),
            })
            .collect(),
    }
}

/// `n` questions alternating between two chapters.
pub fn questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            let chapter = if i % 2 == 0 { "ch1" } else { "ch2" };
            Question {
                id: QuestionId::from(format!("q-{i}")),
                statement: format!("Question {i}?"),
                format: StatementFormat::Plain,
                choices: choices(),
                correct_index: i % 4,
                chapter_id: Some(chapter.to_string()),
                chapter_title: Some(format!("Chapter {chapter}")),
            }
        })
        .collect()
}

/// Score the session's current answers.
pub fn report_for(session: &Session) -> ExamReport {
    ExamReport::build(
        "Mock",
        session.settings(),
        session.questions(),
        &session.snapshot(),
        session.clock(),
        false,
    )
}

// ---------------------------------------------------------------------------
// Recording fakes
// ---------------------------------------------------------------------------

/// Everything a fake front-end observed, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Intro,
    Exam(usize),
    Timer(u32, bool),
    Progress(usize, usize),
    Lock(bool),
    Results(u32),
    Confirm(String),
    Notify(String),
    AnimateStart(usize),
    AnimateEnd(usize),
    ScrollStart(f64),
    ScrollEnd,
    Hidden(usize),
    ScrollToTop(bool),
}

/// Event log shared between the fakes of one test.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

pub struct RecordingView(pub Journal);

impl ExamView for RecordingView {
    fn show_intro(&self) {
        self.0.push(Event::Intro);
    }

    fn show_exam(&self, questions: &[Question]) {
        self.0.push(Event::Exam(questions.len()));
    }

    fn update_timer(&self, remaining_secs: u32, urgent: bool) {
        // Per-second redraws would drown everything else.
        if remaining_secs % 60 == 0 || urgent {
            self.0.push(Event::Timer(remaining_secs, urgent));
        }
    }

    fn update_progress(&self, answered: usize, total: usize) {
        self.0.push(Event::Progress(answered, total));
    }

    fn set_transition_lock(&self, locked: bool) {
        self.0.push(Event::Lock(locked));
    }

    fn show_results(&self, report: &ExamReport) {
        self.0.push(Event::Results(report.score));
    }
}

/// Prompt that answers every confirmation with a fixed reply.
pub struct ScriptedPrompt {
    journal: Journal,
    reply: bool,
    delay: Option<Duration>,
}

impl ScriptedPrompt {
    pub fn new(journal: Journal, reply: bool) -> Self {
        Self {
            journal,
            reply,
            delay: None,
        }
    }

    /// Think for `delay` before replying.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn confirm(&self, text: &str) -> bool {
        self.journal.push(Event::Confirm(text.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply
    }

    fn notify(&self, text: &str) {
        self.journal.push(Event::Notify(text.to_string()));
    }
}

/// Animator that records each step and yields once inside every transition,
/// so overlapping transitions show up interleaved in the journal.
pub struct RecordingAnimator {
    journal: Journal,
    height: f64,
}

impl RecordingAnimator {
    pub fn new(journal: Journal, height: f64) -> Self {
        Self { journal, height }
    }

    pub fn with_height(height: f64) -> Self {
        Self::new(Journal::default(), height)
    }

    pub fn events(&self) -> Vec<Event> {
        self.journal.events()
    }
}

#[async_trait]
impl ExitAnimator for RecordingAnimator {
    fn measure(&self, _: usize) -> f64 {
        self.height
    }

    async fn animate_out(&self, item: &ExitItem) {
        self.journal.push(Event::AnimateStart(item.index));
        tokio::task::yield_now().await;
        self.journal.push(Event::AnimateEnd(item.index));
    }

    async fn scroll_by(&self, delta: f64) {
        self.journal.push(Event::ScrollStart(delta));
        tokio::task::yield_now().await;
        self.journal.push(Event::ScrollEnd);
    }

    fn hide(&self, item: &ExitItem) {
        self.journal.push(Event::Hidden(item.index));
    }

    async fn scroll_to_top(&self, reduced_motion: bool) {
        self.journal.push(Event::ScrollToTop(reduced_motion));
    }
}
