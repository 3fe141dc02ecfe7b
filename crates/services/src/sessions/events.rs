use tokio::sync::mpsc;

/// Presentation hooks the quiz session drives.
///
/// Calls arrive on the session's coordination task, in the order the session
/// made them. Implementations should return quickly.
pub trait QuizObserver: Send + Sync {
    fn on_loading_started(&self);
    fn on_loading_finished(&self);
    fn on_network_error(&self, message: &str);
    /// `progress` is the one-based position, e.g. `"3/10"`.
    fn on_question_ready(&self, image: &[u8], prompt: &str, progress: &str);
    fn on_answer_outcome(&self, is_correct: bool);
    fn on_input_enabled(&self, enabled: bool);
    fn on_round_summary(&self, title: &str, body: &str, action_label: &str);
}

/// Owned form of each `QuizObserver` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    LoadingStarted,
    LoadingFinished,
    NetworkError(String),
    QuestionReady {
        image: Vec<u8>,
        prompt: String,
        progress: String,
    },
    AnswerOutcome(bool),
    InputEnabled(bool),
    RoundSummary {
        title: String,
        body: String,
        action_label: String,
    },
}

/// Forwards observer calls into a channel as `QuizEvent`s.
#[derive(Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<QuizEvent>,
}

impl ChannelObserver {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QuizEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, event: QuizEvent) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.tx.send(event);
    }
}

impl QuizObserver for ChannelObserver {
    fn on_loading_started(&self) {
        self.emit(QuizEvent::LoadingStarted);
    }

    fn on_loading_finished(&self) {
        self.emit(QuizEvent::LoadingFinished);
    }

    fn on_network_error(&self, message: &str) {
        self.emit(QuizEvent::NetworkError(message.to_owned()));
    }

    fn on_question_ready(&self, image: &[u8], prompt: &str, progress: &str) {
        self.emit(QuizEvent::QuestionReady {
            image: image.to_vec(),
            prompt: prompt.to_owned(),
            progress: progress.to_owned(),
        });
    }

    fn on_answer_outcome(&self, is_correct: bool) {
        self.emit(QuizEvent::AnswerOutcome(is_correct));
    }

    fn on_input_enabled(&self, enabled: bool) {
        self.emit(QuizEvent::InputEnabled(enabled));
    }

    fn on_round_summary(&self, title: &str, body: &str, action_label: &str) {
        self.emit(QuizEvent::RoundSummary {
            title: title.to_owned(),
            body: body.to_owned(),
            action_label: action_label.to_owned(),
        });
    }
}
