//! Central exam engine.
//!
//! Owns the session and wires it to the question source, the countdown and
//! the front-end capabilities. Commands can be applied one at a time with
//! [`ExamEngine::dispatch`], or fed through a channel to [`ExamEngine::run`],
//! which multiplexes them with countdown ticks and the single job in flight
//! (a chapter load, an open confirmation or an exit sequence).

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::error::{ExamError, LoadError};
use crate::model::{ChapterPool, ExamPlan, QuestionId};
use crate::orchestrator::{
    exit_items, exit_job, unanswered_prompt, SubmitTrigger, TIME_EXPIRED_NOTICE,
};
use crate::report::ExamReport;
use crate::sampler::{assemble_exam, UndersizedPool};
use crate::session::{Session, SessionState};
use crate::source::load_pools;
use crate::timer::Countdown;
use crate::traits::{ExamView, ExitAnimator, ExitItem, QuestionSource, UserPrompt};

/// Configuration for the exam engine.
#[derive(Debug, Clone, Default)]
pub struct ExamEngineConfig {
    /// Skip per-item exit animations and hide everything at once.
    pub reduced_motion: bool,
    /// Seed for question sampling; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// A user or timer event fed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Submit { confirm: bool },
    Retry,
    Tick { epoch: u64 },
    AnswerSelected { question_id: QuestionId, choice: usize },
}

/// What applying a command did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Not legal in the current state; nothing changed.
    Ignored,
    Started { questions: usize },
    /// The start was abandoned; the session is still idle.
    StartFailed { message: String },
    AnswerRecorded,
    Ticked { remaining: u32, urgent: bool },
    /// The candidate declined the unanswered-questions confirmation.
    SubmitDeclined,
    Submitted(Box<ExamReport>),
    Reset,
}

/// Chapter load started by [`ExamEngine::begin_start`].
pub type LoadJob = BoxFuture<'static, Result<Vec<ChapterPool>, LoadError>>;

/// A submission past its point of no return, waiting for its exit sequence.
#[derive(Debug)]
pub struct PendingSubmission {
    report: ExamReport,
    items: Vec<ExitItem>,
}

enum InFlight {
    Load(LoadJob),
    /// The unanswered-questions confirmation; the countdown keeps running.
    Confirm(BoxFuture<'static, bool>),
    Exit {
        job: BoxFuture<'static, ()>,
        submission: PendingSubmission,
    },
}

enum Finished {
    Load(Result<Vec<ChapterPool>, LoadError>),
    Confirmed(bool),
    Exit,
}

/// Poll whatever is in flight; pending forever when nothing is.
async fn drive(in_flight: &mut Option<InFlight>) -> Finished {
    match in_flight {
        Some(InFlight::Load(job)) => Finished::Load(job.await),
        Some(InFlight::Confirm(job)) => Finished::Confirmed(job.await),
        Some(InFlight::Exit { job, .. }) => {
            job.await;
            Finished::Exit
        }
        None => std::future::pending().await,
    }
}

/// The exam engine.
pub struct ExamEngine {
    source: Arc<dyn QuestionSource>,
    view: Arc<dyn ExamView>,
    prompt: Arc<dyn UserPrompt>,
    animator: Arc<dyn ExitAnimator>,
    exam: ExamPlan,
    config: ExamEngineConfig,
    session: Session,
    countdown: Countdown,
    rng: StdRng,
    warnings: Vec<UndersizedPool>,
    ticks_tx: UnboundedSender<u64>,
    ticks_rx: UnboundedReceiver<u64>,
}

impl ExamEngine {
    pub fn new(
        source: Arc<dyn QuestionSource>,
        view: Arc<dyn ExamView>,
        prompt: Arc<dyn UserPrompt>,
        animator: Arc<dyn ExitAnimator>,
        exam: ExamPlan,
        config: ExamEngineConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (ticks_tx, ticks_rx) = mpsc::unbounded_channel();
        Self {
            source,
            view,
            prompt,
            animator,
            session: Session::new(exam.settings),
            exam,
            config,
            countdown: Countdown::new(),
            rng,
            warnings: Vec::new(),
            ticks_tx,
            ticks_rx,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn exam(&self) -> &ExamPlan {
        &self.exam
    }

    /// Undersized chapters reported by the last start.
    pub fn warnings(&self) -> &[UndersizedPool] {
        &self.warnings
    }

    /// Epoch carried by live countdown ticks.
    pub fn countdown_epoch(&self) -> u64 {
        self.countdown.epoch()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_running()
    }

    /// Apply one command, awaiting any load or exit sequence it starts.
    pub async fn dispatch(&mut self, command: Command) -> Outcome {
        match command {
            Command::Start => match self.begin_start() {
                Some(job) => {
                    let result = job.await;
                    self.complete_start(result)
                }
                None => Outcome::Ignored,
            },
            Command::Submit { confirm } => self.submit(SubmitTrigger::User { confirm }).await,
            Command::Retry => self.retry(),
            Command::Tick { epoch } => match self.apply_tick(epoch) {
                Some(0) => self.submit(SubmitTrigger::TimeExpired).await,
                Some(remaining) => Outcome::Ticked {
                    remaining,
                    urgent: self.session.clock().is_urgent(),
                },
                None => Outcome::Ignored,
            },
            Command::AnswerSelected {
                question_id,
                choice,
            } => self.select_answer(question_id, choice),
        }
    }

    /// Drive the engine until `commands` closes and nothing is in flight.
    pub async fn run(&mut self, mut commands: UnboundedReceiver<Command>) {
        let mut in_flight: Option<InFlight> = None;
        let mut open = true;

        loop {
            if !open && in_flight.is_none() {
                break;
            }

            tokio::select! {
                finished = drive(&mut in_flight) => {
                    match finished {
                        Finished::Load(result) => {
                            in_flight = None;
                            self.complete_start(result);
                        }
                        Finished::Confirmed(accepted) => {
                            in_flight = None;
                            if accepted {
                                self.park_exit(SubmitTrigger::User { confirm: true }, &mut in_flight);
                            } else {
                                tracing::debug!("submission declined");
                            }
                        }
                        Finished::Exit => {
                            if let Some(InFlight::Exit { submission, .. }) = in_flight.take() {
                                self.complete_submit(submission).await;
                            }
                        }
                    }
                }
                Some(epoch) = self.ticks_rx.recv() => {
                    self.step(Command::Tick { epoch }, &mut in_flight);
                }
                command = commands.recv(), if open => match command {
                    Some(command) => self.step(command, &mut in_flight),
                    None => {
                        tracing::debug!("command channel closed");
                        open = false;
                    }
                },
            }
        }
    }

    /// Apply a command inside the driver loop, parking any job it starts.
    fn step(&mut self, command: Command, in_flight: &mut Option<InFlight>) {
        let trigger = match command {
            Command::Start => {
                if let Some(job) = self.begin_start() {
                    *in_flight = Some(InFlight::Load(job));
                }
                return;
            }
            Command::Submit { confirm } => {
                if in_flight.is_some() {
                    tracing::debug!("submit ignored while another job is in flight");
                    return;
                }
                SubmitTrigger::User { confirm }
            }
            Command::Tick { epoch } => match self.apply_tick(epoch) {
                Some(0) => {
                    if matches!(in_flight, Some(InFlight::Confirm(_))) {
                        tracing::info!("time ran out while the confirmation was open");
                        *in_flight = None;
                    }
                    SubmitTrigger::TimeExpired
                }
                _ => return,
            },
            Command::Retry => {
                self.retry();
                return;
            }
            Command::AnswerSelected {
                question_id,
                choice,
            } => {
                self.select_answer(question_id, choice);
                return;
            }
        };

        if !self.submit_allowed(trigger) {
            return;
        }
        if let Some(text) = self.confirmation(trigger) {
            let prompt = Arc::clone(&self.prompt);
            *in_flight = Some(InFlight::Confirm(
                async move { prompt.confirm(&text).await }.boxed(),
            ));
            return;
        }
        self.park_exit(trigger, in_flight);
    }

    /// Commit a submission and park its exit sequence.
    fn park_exit(&mut self, trigger: SubmitTrigger, in_flight: &mut Option<InFlight>) {
        if let Ok(submission) = self.commit_submit(trigger) {
            let job = exit_job(
                Arc::clone(&self.animator),
                submission.items.clone(),
                self.config.reduced_motion,
            );
            *in_flight = Some(InFlight::Exit { job, submission });
        }
    }

    // -- start ----------------------------------------------------------------

    /// Claim the start and return the chapter load to await.
    ///
    /// `None` when a start is not legal right now (not idle, or a load is
    /// already outstanding).
    pub fn begin_start(&mut self) -> Option<LoadJob> {
        if !self.session.begin_loading() {
            tracing::debug!(state = %self.session.state(), "start ignored");
            return None;
        }
        self.warnings.clear();

        let source = Arc::clone(&self.source);
        let chapters = self.exam.plan.chapters();
        tracing::info!(
            exam = %self.exam.id,
            chapters = chapters.len(),
            "loading chapters from {}",
            source.name()
        );
        Some(async move { load_pools(source.as_ref(), &chapters).await }.boxed())
    }

    /// Sample the loaded pools and enter `running`, or abandon the start.
    pub fn complete_start(&mut self, result: Result<Vec<ChapterPool>, LoadError>) -> Outcome {
        if !self.session.is_loading() {
            return Outcome::Ignored;
        }
        let pools = match result {
            Ok(pools) => pools,
            Err(e) => return self.fail_start(ExamError::from(e)),
        };

        let assembly = assemble_exam(&self.exam.plan, &pools, &mut self.rng);
        self.warnings = assembly.warnings;
        if assembly.questions.is_empty() {
            return self.fail_start(ExamError::EmptySelection);
        }

        let count = assembly.questions.len();
        if !self.session.enter_running(assembly.questions) {
            self.session.abort_start();
            return Outcome::Ignored;
        }

        self.view.show_exam(self.session.questions());
        self.view.update_progress(0, count);
        self.view
            .update_timer(self.session.remaining_secs(), self.session.clock().is_urgent());
        let epoch = self.countdown.start(self.ticks_tx.clone());

        tracing::info!(
            questions = count,
            target = self.exam.settings.size,
            epoch,
            "exam started"
        );
        Outcome::Started { questions: count }
    }

    fn fail_start(&mut self, error: ExamError) -> Outcome {
        tracing::error!("exam could not start: {error}");
        let message = error.user_message();
        self.prompt.notify(&message);
        self.session.abort_start();
        self.view.show_intro();
        Outcome::StartFailed { message }
    }

    // -- running --------------------------------------------------------------

    fn select_answer(&mut self, question_id: QuestionId, choice: usize) -> Outcome {
        let known = self
            .session
            .find_question(&question_id)
            .is_some_and(|q| choice < q.choices.len());
        if !known {
            tracing::debug!(question = %question_id, choice, "answer for unknown choice dropped");
            return Outcome::Ignored;
        }
        if !self.session.record_answer(question_id, choice) {
            return Outcome::Ignored;
        }
        self.view
            .update_progress(self.session.answered_count(), self.session.questions().len());
        Outcome::AnswerRecorded
    }

    /// Apply a countdown tick; `None` when the tick is stale or not legal.
    fn apply_tick(&mut self, epoch: u64) -> Option<u32> {
        if !self.countdown.accepts(epoch) {
            tracing::trace!(epoch, "stale tick ignored");
            return None;
        }
        let remaining = self.session.tick()?;
        self.view
            .update_timer(remaining, self.session.clock().is_urgent());
        Some(remaining)
    }

    // -- submission -----------------------------------------------------------

    async fn submit(&mut self, trigger: SubmitTrigger) -> Outcome {
        match self.begin_submit(trigger).await {
            Ok(submission) => {
                exit_job(
                    Arc::clone(&self.animator),
                    submission.items.clone(),
                    self.config.reduced_motion,
                )
                .await;
                self.complete_submit(submission).await
            }
            Err(outcome) => outcome,
        }
    }

    /// Run a submission up to its exit sequence.
    ///
    /// Guards, asks for confirmation (or announces the expired time), then
    /// locks the view, stops the countdown and scores the snapshot. On `Err`
    /// nothing has changed and the lock was never taken.
    pub async fn begin_submit(
        &mut self,
        trigger: SubmitTrigger,
    ) -> Result<PendingSubmission, Outcome> {
        if !self.submit_allowed(trigger) {
            return Err(Outcome::Ignored);
        }
        if let Some(text) = self.confirmation(trigger) {
            if !self.prompt.confirm(&text).await {
                tracing::debug!("submission declined");
                return Err(Outcome::SubmitDeclined);
            }
        }
        self.commit_submit(trigger)
    }

    fn submit_allowed(&self, trigger: SubmitTrigger) -> bool {
        let allowed =
            self.session.state() == SessionState::Running && !self.session.is_submitting();
        if !allowed {
            tracing::debug!(state = %self.session.state(), ?trigger, "submit ignored");
        }
        allowed
    }

    /// The question to ask before `trigger` may submit, if any.
    fn confirmation(&self, trigger: SubmitTrigger) -> Option<String> {
        if trigger != (SubmitTrigger::User { confirm: true }) {
            return None;
        }
        let unanswered = self.session.questions().len() - self.session.answered_count();
        (unanswered > 0).then(|| unanswered_prompt(unanswered))
    }

    /// Past the point of no return: lock, stop the countdown, score.
    fn commit_submit(&mut self, trigger: SubmitTrigger) -> Result<PendingSubmission, Outcome> {
        if !self.submit_allowed(trigger) {
            return Err(Outcome::Ignored);
        }
        if trigger.is_forced() {
            self.prompt.notify(TIME_EXPIRED_NOTICE);
        }
        if !self.session.begin_submission() {
            return Err(Outcome::Ignored);
        }
        self.view.set_transition_lock(true);
        self.countdown.stop();

        let report = ExamReport::build(
            &self.exam.name,
            self.session.settings(),
            self.session.questions(),
            &self.session.snapshot(),
            self.session.clock(),
            trigger.is_forced(),
        );
        let items = exit_items(self.session.questions(), self.animator.as_ref());

        Ok(PendingSubmission { report, items })
    }

    /// Commit a submission once its exit sequence has played.
    pub async fn complete_submit(&mut self, submission: PendingSubmission) -> Outcome {
        let PendingSubmission { report, .. } = submission;
        let committed = self.session.finish_submission(report.clone());
        if committed {
            self.view.show_results(&report);
            self.animator
                .scroll_to_top(self.config.reduced_motion)
                .await;
        }
        self.view.set_transition_lock(false);

        if !committed {
            return Outcome::Ignored;
        }
        tracing::info!(
            score = report.score,
            total = report.total,
            verdict = ?report.verdict,
            time_expired = report.time_expired,
            "exam submitted"
        );
        Outcome::Submitted(Box::new(report))
    }

    // -- retry ----------------------------------------------------------------

    fn retry(&mut self) -> Outcome {
        if !self.session.retry() {
            tracing::debug!(state = %self.session.state(), "retry ignored");
            return Outcome::Ignored;
        }
        self.countdown.stop();
        self.warnings.clear();
        self.view.show_intro();
        self.view.update_progress(0, 0);
        self.view
            .update_timer(self.session.remaining_secs(), self.session.clock().is_urgent());
        tracing::info!("session reset");
        Outcome::Reset
    }
}
