//! Terminal front-end: view, prompt and exit animator over stdout/stdin.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use comfy_table::{Cell, Table};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use mockexam_core::engine::Command;
use mockexam_core::model::{Question, QuestionId, StatementFormat};
use mockexam_core::report::ExamReport;
use mockexam_core::timer::format_hms;
use mockexam_core::traits::{ExamView, ExitAnimator, ExitItem, UserPrompt};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn choice_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// State shared between the view and the stdin reader.
#[derive(Default)]
pub struct Board {
    question_ids: Mutex<Vec<QuestionId>>,
    remaining_secs: AtomicU32,
    running: AtomicBool,
    reports: Mutex<Vec<ExamReport>>,
}

impl Board {
    /// Every report shown so far, oldest first.
    pub fn take_reports(&self) -> Vec<ExamReport> {
        std::mem::take(&mut *lock(&self.reports))
    }

    fn question_ids(&self) -> Vec<QuestionId> {
        lock(&self.question_ids).clone()
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

pub struct TerminalView {
    board: Arc<Board>,
    exam_name: String,
    urgent_announced: AtomicBool,
}

impl TerminalView {
    pub fn new(board: Arc<Board>, exam_name: impl Into<String>) -> Self {
        Self {
            board,
            exam_name: exam_name.into(),
            urgent_announced: AtomicBool::new(false),
        }
    }
}

impl ExamView for TerminalView {
    fn show_intro(&self) {
        self.board.running.store(false, Ordering::Relaxed);
        lock(&self.board.question_ids).clear();
        println!("\n== {} ==", self.exam_name);
        println!("Type `start` to begin, `quit` to leave.");
    }

    fn show_exam(&self, questions: &[Question]) {
        *lock(&self.board.question_ids) = questions.iter().map(|q| q.id.clone()).collect();
        self.board.running.store(true, Ordering::Relaxed);
        self.urgent_announced.store(false, Ordering::Relaxed);

        println!("\n== {} ==", self.exam_name);
        for (i, q) in questions.iter().enumerate() {
            let marker = match q.format {
                StatementFormat::Plain => "",
                StatementFormat::RichText => " (formatted)",
            };
            println!("\n{}. {}{}", i + 1, q.statement, marker);
            for (c, choice) in q.choices.iter().enumerate() {
                println!("   {}) {}", choice_letter(c), choice);
            }
        }
        println!(
            "\nAnswer with `<number> <letter>` (e.g. `3 b`). \
             `submit` finishes the exam, `time` shows the clock."
        );
    }

    fn update_timer(&self, remaining_secs: u32, urgent: bool) {
        self.board
            .remaining_secs
            .store(remaining_secs, Ordering::Relaxed);
        if !urgent {
            self.urgent_announced.store(false, Ordering::Relaxed);
        } else if !self.urgent_announced.swap(true, Ordering::Relaxed) {
            println!("Time is running out: {} left.", format_hms(remaining_secs));
        }
    }

    fn update_progress(&self, answered: usize, total: usize) {
        if total > 0 {
            println!("Answered {answered}/{total}");
        }
    }

    fn set_transition_lock(&self, locked: bool) {
        if locked {
            self.board.running.store(false, Ordering::Relaxed);
            println!("Submitting...");
        }
    }

    fn show_results(&self, report: &ExamReport) {
        println!("\n{}", report.summary_text());
        print_chapter_table(report);

        let missed: Vec<_> = report.questions.iter().filter(|q| !q.correct).collect();
        if !missed.is_empty() {
            println!("\nMissed questions:");
            for q in missed {
                println!(
                    "  {}. your answer: {} | correct: {}",
                    q.number,
                    q.selected_text(),
                    q.correct_text()
                );
            }
        }
        println!("\nType `retry` for a new attempt or `quit` to leave.");
        lock(&self.board.reports).push(report.clone());
    }
}

fn print_chapter_table(report: &ExamReport) {
    let mut table = Table::new();
    table.set_header(vec!["Chapter", "Correct", "Questions", "Rate"]);

    for chapter in &report.chapters {
        let rate = if chapter.total == 0 {
            0.0
        } else {
            chapter.correct as f64 / chapter.total as f64 * 100.0
        };
        table.add_row(vec![
            Cell::new(&chapter.title),
            Cell::new(chapter.correct),
            Cell::new(chapter.total),
            Cell::new(format!("{rate:.1}%")),
        ]);
    }

    println!("\n{table}");
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Hand-off point for replies to confirmation questions.
#[derive(Default)]
pub struct ReplySlot {
    pending: Option<oneshot::Sender<String>>,
    early_reply: Option<String>,
    /// A `submit` was just sent, so its confirmation may be on the way.
    awaiting_reply: bool,
    closed: bool,
}

/// Where one line of input goes.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    /// Answers the open confirmation, or the one about to open.
    Reply,
    /// A yes/no with nothing to confirm.
    Stray,
    Command(String),
}

fn route_line(slot: &mut ReplySlot, line: String) -> Route {
    let line = match slot.pending.take() {
        Some(pending) => {
            slot.awaiting_reply = false;
            match pending.send(line) {
                Ok(()) => return Route::Reply,
                // Withdrawn: the time ran out while it was open.
                Err(line) => line,
            }
        }
        None => line,
    };

    if is_reply(&line) {
        if std::mem::take(&mut slot.awaiting_reply) {
            // Typed ahead of the question it answers.
            slot.early_reply = Some(line);
            return Route::Reply;
        }
        return Route::Stray;
    }
    slot.early_reply = None;
    slot.awaiting_reply = false;
    Route::Command(line)
}

fn is_yes(reply: &str) -> bool {
    matches!(reply.trim().to_lowercase().as_str(), "y" | "yes")
}

fn is_reply(line: &str) -> bool {
    matches!(
        line.trim().to_lowercase().as_str(),
        "y" | "yes" | "n" | "no"
    )
}

pub struct TerminalPrompt {
    slot: Arc<Mutex<ReplySlot>>,
}

impl TerminalPrompt {
    pub fn new(slot: Arc<Mutex<ReplySlot>>) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl UserPrompt for TerminalPrompt {
    async fn confirm(&self, text: &str) -> bool {
        println!("{text} [y/N]");
        let reply = {
            let mut slot = lock(&self.slot);
            if let Some(reply) = slot.early_reply.take() {
                return is_yes(&reply);
            }
            if slot.closed {
                return false;
            }
            let (tx, rx) = oneshot::channel();
            slot.pending = Some(tx);
            rx
        };
        // A dropped sender means stdin is gone: treat as "no".
        reply.await.map(|r| is_yes(&r)).unwrap_or(false)
    }

    fn notify(&self, text: &str) {
        println!("! {text}");
    }
}

// ---------------------------------------------------------------------------
// Exit animator
// ---------------------------------------------------------------------------

/// Plays each question's exit as a short pause with a progress dot.
pub struct TerminalAnimator {
    item_delay: Duration,
}

impl TerminalAnimator {
    pub fn new(item_delay: Duration) -> Self {
        Self { item_delay }
    }
}

#[async_trait]
impl ExitAnimator for TerminalAnimator {
    fn measure(&self, _: usize) -> f64 {
        // One question block is roughly six terminal lines.
        6.0 * 20.0
    }

    async fn animate_out(&self, _: &ExitItem) {
        tokio::time::sleep(self.item_delay).await;
        eprint!(".");
    }

    async fn scroll_by(&self, _: f64) {}

    fn hide(&self, _: &ExitItem) {}

    async fn scroll_to_top(&self, reduced_motion: bool) {
        if !reduced_motion {
            eprintln!();
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One line typed by the candidate.
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Time,
    Help,
    Quit,
}

/// Parse a line of input against the questions on screen.
pub fn parse_input(line: &str, question_ids: &[QuestionId]) -> Result<Input, String> {
    let line = line.trim();
    let input = match line.to_lowercase().as_str() {
        "start" => Input::Command(Command::Start),
        "submit" => Input::Command(Command::Submit { confirm: true }),
        "submit!" => Input::Command(Command::Submit { confirm: false }),
        "retry" => Input::Command(Command::Retry),
        "time" => Input::Time,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        _ => return parse_answer(line, question_ids),
    };
    Ok(input)
}

fn parse_answer(line: &str, question_ids: &[QuestionId]) -> Result<Input, String> {
    let mut parts = line.split_whitespace();
    let (Some(number), Some(letter), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("unknown command: {line}"));
    };

    let number: usize = number
        .parse()
        .map_err(|_| format!("not a question number: {number}"))?;
    let question_id = number
        .checked_sub(1)
        .and_then(|i| question_ids.get(i))
        .ok_or_else(|| format!("no question {number} on screen"))?;

    let mut chars = letter.chars();
    let choice = match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            (c.to_ascii_uppercase() as u8 - b'A') as usize
        }
        _ => return Err(format!("not a choice letter: {letter}")),
    };

    Ok(Input::Command(Command::AnswerSelected {
        question_id: question_id.clone(),
        choice,
    }))
}

const HELP: &str = "\
Commands:
  <n> <letter>  answer question n (e.g. `3 b`)
  submit        finish the exam (asks if questions are unanswered)
  submit!       finish the exam without asking
  time          show the remaining time
  retry         back to the intro after the results
  start         begin a new attempt
  quit          leave";

/// Read stdin on a dedicated thread and forward commands to the engine.
///
/// Replies to a pending confirmation are routed to the prompt instead. The
/// command channel closes on `quit` or end of input.
pub fn spawn_stdin_reader(
    commands: UnboundedSender<Command>,
    board: Arc<Board>,
    slot: Arc<Mutex<ReplySlot>>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let line = match route_line(&mut lock(&slot), line) {
                Route::Reply => continue,
                Route::Stray => {
                    println!("Nothing to confirm.");
                    continue;
                }
                Route::Command(line) => line,
            };

            match parse_input(&line, &board.question_ids()) {
                Ok(Input::Command(command)) => {
                    if command == (Command::Submit { confirm: true }) {
                        lock(&slot).awaiting_reply = true;
                    }
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                Ok(Input::Time) => {
                    if board.running.load(Ordering::Relaxed) {
                        let remaining = board.remaining_secs.load(Ordering::Relaxed);
                        println!("Time left: {}", format_hms(remaining));
                    } else {
                        println!("The clock is not running.");
                    }
                }
                Ok(Input::Help) => println!("{HELP}"),
                Ok(Input::Quit) => break,
                Err(message) => println!("{message} (type `help` for commands)"),
            }
        }

        let mut slot = lock(&slot);
        slot.closed = true;
        slot.pending = None;
        tracing::debug!("input closed");
    })
}
