use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use quiz_core::model::Question;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::events::QuizObserver;
use super::state::{Advance, RoundPhase, SessionSnapshot, SessionState};
use crate::config::SessionConfig;
use crate::error::CatalogError;
use crate::question_source::QuestionSource;
use crate::statistics_service::StatisticsService;

pub const ROUND_SUMMARY_TITLE: &str = "This round is over!";
pub const ROUND_SUMMARY_ACTION: &str = "Play again";

/// Inbound calls from the presentation layer.
enum Command {
    Start,
    Answer(bool),
    Restart,
    Snapshot(oneshot::Sender<SessionSnapshot>),
}

/// Completions of work that ran off the coordination task, tagged with the
/// round generation they were started under.
enum Completion {
    CatalogLoaded {
        generation: u64,
        result: Result<usize, CatalogError>,
    },
    QuestionReady {
        generation: u64,
        result: Result<Question, CatalogError>,
    },
    AdvanceDue {
        generation: u64,
    },
}

/// Handle to a running quiz session.
///
/// All session state lives on one spawned task; this handle only queues
/// commands, so every method returns immediately. The task stops once every
/// handle has been dropped.
#[derive(Clone)]
pub struct QuizController {
    commands: mpsc::UnboundedSender<Command>,
}

impl QuizController {
    /// Spawn the session task on the current tokio runtime.
    #[must_use]
    pub fn spawn(
        source: QuestionSource,
        statistics: StatisticsService,
        observer: Arc<dyn QuizObserver>,
        config: SessionConfig,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (completions, completion_rx) = mpsc::unbounded_channel();
        let actor = SessionActor {
            state: SessionState::new(config.questions_per_round),
            answer_delay: config.answer_delay,
            source: source.with_threshold(config.threshold),
            statistics,
            observer,
            generation: 0,
            pending_advance: None,
            completions,
        };
        tokio::spawn(actor.run(command_rx, completion_rx));
        Self { commands }
    }

    /// Load the catalog and show the first question.
    pub fn start(&self) {
        self.send(Command::Start);
    }

    /// Answer the pending question. Ignored when no question is pending.
    pub fn submit_answer(&self, user_says_yes: bool) {
        self.send(Command::Answer(user_says_yes));
    }

    /// Abandon the current round and begin a new one.
    pub fn request_restart(&self) {
        self.send(Command::Restart);
    }

    /// Current session state, after every previously queued command has run.
    ///
    /// Returns `None` if the session task is gone.
    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        rx.await.ok()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("quiz session task has stopped");
        }
    }
}

struct SessionActor {
    state: SessionState,
    answer_delay: Duration,
    source: QuestionSource,
    statistics: StatisticsService,
    observer: Arc<dyn QuizObserver>,
    generation: u64,
    pending_advance: Option<JoinHandle<()>>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl SessionActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            tokio::select! {
                biased;
                completion = completions.recv() => {
                    // The actor holds a sender itself, so this channel never closes.
                    if let Some(completion) = completion {
                        self.handle_completion(completion).await;
                    }
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
            }
        }
        self.cancel_pending_advance();
        debug!("quiz session task finished");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Answer(user_says_yes) => self.answer(user_says_yes),
            Command::Restart => self.restart(),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.state.snapshot());
            }
        }
    }

    async fn handle_completion(&mut self, completion: Completion) {
        let generation = match &completion {
            Completion::CatalogLoaded { generation, .. }
            | Completion::QuestionReady { generation, .. }
            | Completion::AdvanceDue { generation } => *generation,
        };
        if generation != self.generation {
            debug!(
                "discarding completion from round generation {generation} (current {})",
                self.generation
            );
            return;
        }

        match completion {
            Completion::CatalogLoaded { result, .. } => self.catalog_loaded(result),
            Completion::QuestionReady { result, .. } => self.question_ready(result),
            Completion::AdvanceDue { .. } => self.advance().await,
        }
    }

    fn start(&mut self) {
        if self.state.phase() != RoundPhase::Idle {
            debug!("start ignored in phase {:?}", self.state.phase());
            return;
        }
        self.load_catalog();
    }

    fn restart(&mut self) {
        self.generation += 1;
        self.cancel_pending_advance();
        self.state.reset();
        self.observer.on_input_enabled(true);
        self.load_catalog();
    }

    fn load_catalog(&mut self) {
        self.state.set_phase(RoundPhase::Loading);
        self.observer.on_loading_started();

        let source = self.source.clone();
        let completions = self.completions.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = source.load_catalog().await;
            let _ = completions.send(Completion::CatalogLoaded { generation, result });
        });
    }

    fn catalog_loaded(&mut self, result: Result<usize, CatalogError>) {
        self.observer.on_loading_finished();
        match result {
            Ok(_) => self.request_question(),
            Err(err) => self.fail(&err),
        }
    }

    fn request_question(&self) {
        let source = self.source.clone();
        let completions = self.completions.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = source.next_question().await;
            let _ = completions.send(Completion::QuestionReady { generation, result });
        });
    }

    fn question_ready(&mut self, result: Result<Question, CatalogError>) {
        match result {
            Ok(question) => {
                let progress = self.state.progress_label();
                self.observer
                    .on_question_ready(question.image(), question.prompt(), &progress);
                self.state.set_question(question);
            }
            Err(err) => self.fail(&err),
        }
    }

    fn fail(&mut self, err: &CatalogError) {
        error!("movie catalog unavailable: {err}");
        self.state.set_phase(RoundPhase::Idle);
        self.observer.on_network_error(&err.to_string());
    }

    fn answer(&mut self, user_says_yes: bool) {
        let Some(is_correct) = self.state.answer(user_says_yes) else {
            debug!("answer ignored, no question pending");
            return;
        };
        self.observer.on_answer_outcome(is_correct);
        self.observer.on_input_enabled(false);
        self.schedule_advance();
    }

    fn schedule_advance(&mut self) {
        self.cancel_pending_advance();
        let completions = self.completions.clone();
        let generation = self.generation;
        let delay = self.answer_delay;
        self.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = completions.send(Completion::AdvanceDue { generation });
        }));
    }

    fn cancel_pending_advance(&mut self) {
        if let Some(handle) = self.pending_advance.take() {
            handle.abort();
        }
    }

    async fn advance(&mut self) {
        self.pending_advance = None;
        match self.state.advance() {
            Advance::Next { index } => {
                debug!("advancing to question {}", index + 1);
                self.request_question();
            }
            Advance::Complete { correct, total } => self.finish_round(correct, total).await,
        }
        self.observer.on_input_enabled(true);
    }

    async fn finish_round(&mut self, correct: u32, total: u32) {
        info!("round finished with {correct}/{total}");
        if let Err(err) = self.statistics.record_result(correct, total).await {
            error!("failed to record round result: {err}");
        }
        let history = match self.statistics.summary_text().await {
            Ok(text) => text,
            Err(err) => {
                error!("failed to read statistics: {err}");
                "Statistics are unavailable.".to_owned()
            }
        };
        let body = format!("Your result: {correct}/{total}\n{history}");
        self.observer
            .on_round_summary(ROUND_SUMMARY_TITLE, &body, ROUND_SUMMARY_ACTION);
    }
}
