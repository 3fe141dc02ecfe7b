use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::MovieRecord;
use quiz_core::time::fixed_clock;
use services::{
    AppServices, CatalogError, ChannelObserver, ImageFetcher, MoviesLoader, QuizController,
    QuizEvent, RoundPhase, SessionConfig, ThresholdSource,
};
use storage::repository::{KeyValueStore, Storage};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use url::Url;

struct ScriptedLoader {
    movies: Vec<MovieRecord>,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl ScriptedLoader {
    fn new(rating: &str) -> Self {
        Self {
            movies: vec![
                MovieRecord::new("Deadpool", rating, "https://img.example.com/deadpool.jpg")
                    .unwrap(),
            ],
            failures_left: AtomicUsize::new(0),
            delay: Duration::from_millis(100),
        }
    }

    fn failing_once(mut self) -> Self {
        self.failures_left = AtomicUsize::new(1);
        self
    }
}

#[async_trait]
impl MoviesLoader for ScriptedLoader {
    async fn load_movies(&self) -> Result<Vec<MovieRecord>, CatalogError> {
        tokio::time::sleep(self.delay).await;
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Err(CatalogError::Provider("Invalid API Key".into()));
        }
        Ok(self.movies.clone())
    }
}

struct Posters(Option<Vec<u8>>);

#[async_trait]
impl ImageFetcher for Posters {
    async fn fetch_image(&self, _url: &Url) -> Result<Vec<u8>, CatalogError> {
        self.0
            .clone()
            .ok_or_else(|| CatalogError::Provider("poster unavailable".into()))
    }
}

struct Harness {
    storage: Storage,
    services: AppServices,
    controller: QuizController,
    events: UnboundedReceiver<QuizEvent>,
}

fn harness(loader: ScriptedLoader, posters: Posters) -> Harness {
    let storage = Storage::in_memory();
    let services = AppServices::from_parts(
        &storage,
        fixed_clock(),
        Arc::new(loader),
        Arc::new(posters),
        SessionConfig::default().with_threshold(ThresholdSource::Fixed(6.0)),
    );
    let (observer, events) = ChannelObserver::new();
    let controller = services.spawn_session(Arc::new(observer));
    Harness {
        storage,
        services,
        controller,
        events,
    }
}

async fn next_event(events: &mut UnboundedReceiver<QuizEvent>) -> QuizEvent {
    tokio::time::timeout(Duration::from_secs(60), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Skips events until the next question and returns its progress label.
async fn next_question(events: &mut UnboundedReceiver<QuizEvent>) -> (Vec<u8>, String) {
    loop {
        if let QuizEvent::QuestionReady {
            image, progress, ..
        } = next_event(events).await
        {
            return (image, progress);
        }
    }
}

async fn round_summary(events: &mut UnboundedReceiver<QuizEvent>) -> (String, String, String) {
    loop {
        if let QuizEvent::RoundSummary {
            title,
            body,
            action_label,
        } = next_event(events).await
        {
            return (title, body, action_label);
        }
    }
}

fn drain(events: &mut UnboundedReceiver<QuizEvent>) -> Vec<QuizEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

#[tokio::test(start_paused = true)]
async fn perfect_round_records_best_and_full_accuracy() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(vec![7])));
    h.controller.start();

    assert_eq!(next_event(&mut h.events).await, QuizEvent::LoadingStarted);
    assert_eq!(next_event(&mut h.events).await, QuizEvent::LoadingFinished);

    for i in 1..=10_u32 {
        let (image, progress) = next_question(&mut h.events).await;
        assert_eq!(image, vec![7]);
        assert_eq!(progress, format!("{i}/10"));

        let snapshot = h.controller.snapshot().await.unwrap();
        assert_eq!(snapshot.phase, RoundPhase::InRound);
        assert_eq!(snapshot.current_index, i - 1);
        assert_eq!(snapshot.correct_so_far, i - 1);

        h.controller.submit_answer(true);
    }

    let (title, body, action) = round_summary(&mut h.events).await;
    assert_eq!(title, "This round is over!");
    assert_eq!(action, "Play again");
    assert_eq!(
        body,
        "Your result: 10/10\nQuizzes played: 1\nBest result: 10/10 (14.11.23 22:13)\nAverage accuracy: 100.00%"
    );

    let snapshot = h.controller.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, RoundPhase::RoundComplete);
    assert_eq!(snapshot.current_index, 9);
    assert_eq!(snapshot.correct_so_far, 10);

    let stats = h.services.statistics();
    assert_eq!(stats.games_played().await.unwrap(), 1);
    let best = stats.best_result().await.unwrap().unwrap();
    assert_eq!((best.correct_answers(), best.total_questions()), (10, 10));
    assert!((stats.average_accuracy_percent().await.unwrap() - 100.0).abs() < 1e-9);
    assert_eq!(h.storage.kv.get_int("total_asked").await.unwrap(), Some(10));
}

#[tokio::test(start_paused = true)]
async fn answer_is_paced_by_one_second() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(Vec::new())));
    h.controller.start();
    next_question(&mut h.events).await;

    let answered_at = Instant::now();
    h.controller.submit_answer(false);

    assert_eq!(next_event(&mut h.events).await, QuizEvent::AnswerOutcome(false));
    assert_eq!(next_event(&mut h.events).await, QuizEvent::InputEnabled(false));
    assert_eq!(next_event(&mut h.events).await, QuizEvent::InputEnabled(true));
    assert!(answered_at.elapsed() >= Duration::from_secs(1));

    let (_, progress) = next_question(&mut h.events).await;
    assert_eq!(progress, "2/10");
    assert_eq!(h.controller.snapshot().await.unwrap().correct_so_far, 0);
}

#[tokio::test(start_paused = true)]
async fn double_submission_counts_once() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(Vec::new())));
    h.controller.start();
    next_question(&mut h.events).await;

    h.controller.submit_answer(true);
    h.controller.submit_answer(true);
    let snapshot = h.controller.snapshot().await.unwrap();

    assert_eq!(snapshot.correct_so_far, 1);
    assert!(!snapshot.has_pending_question);
    let outcomes = drain(&mut h.events)
        .into_iter()
        .filter(|e| matches!(e, QuizEvent::AnswerOutcome(_)))
        .count();
    assert_eq!(outcomes, 1);
}

#[tokio::test(start_paused = true)]
async fn restart_supersedes_pending_transition() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(Vec::new())));
    h.controller.start();
    next_question(&mut h.events).await;

    h.controller.submit_answer(true);
    h.controller.request_restart();

    let snapshot = h.controller.snapshot().await.unwrap();
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.correct_so_far, 0);
    assert!(!snapshot.has_pending_question);

    let (_, progress) = next_question(&mut h.events).await;
    assert_eq!(progress, "1/10");

    // Well past the old pacing delay: the stale transition must not fire.
    tokio::time::sleep(Duration::from_secs(5)).await;
    let snapshot = h.controller.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, RoundPhase::InRound);
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.correct_so_far, 0);
    assert!(snapshot.has_pending_question);
    assert!(
        !drain(&mut h.events)
            .iter()
            .any(|e| matches!(e, QuizEvent::QuestionReady { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn answer_right_after_restart_is_noop() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(Vec::new())));
    h.controller.start();
    next_question(&mut h.events).await;

    h.controller.request_restart();
    h.controller.submit_answer(true);

    let snapshot = h.controller.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, RoundPhase::Loading);
    assert_eq!(snapshot.correct_so_far, 0);
    assert_eq!(snapshot.current_index, 0);
    assert!(
        !drain(&mut h.events)
            .iter()
            .any(|e| matches!(e, QuizEvent::AnswerOutcome(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn catalog_failure_reports_error_and_restart_recovers() {
    let mut h = harness(ScriptedLoader::new("7.5").failing_once(), Posters(Some(Vec::new())));
    h.controller.start();

    assert_eq!(next_event(&mut h.events).await, QuizEvent::LoadingStarted);
    assert_eq!(next_event(&mut h.events).await, QuizEvent::LoadingFinished);
    assert_eq!(
        next_event(&mut h.events).await,
        QuizEvent::NetworkError("movie provider returned an error: Invalid API Key".into())
    );
    assert_eq!(
        h.controller.snapshot().await.unwrap().phase,
        RoundPhase::Idle
    );

    h.controller.submit_answer(true);
    h.controller.request_restart();
    assert_eq!(next_event(&mut h.events).await, QuizEvent::InputEnabled(true));
    assert_eq!(next_event(&mut h.events).await, QuizEvent::LoadingStarted);

    let (_, progress) = next_question(&mut h.events).await;
    assert_eq!(progress, "1/10");
    assert_eq!(h.controller.snapshot().await.unwrap().correct_so_far, 0);
}

#[tokio::test(start_paused = true)]
async fn missing_poster_still_serves_question() {
    let mut h = harness(ScriptedLoader::new("5.0"), Posters(None));
    h.controller.start();

    let (image, progress) = next_question(&mut h.events).await;
    assert!(image.is_empty());
    assert_eq!(progress, "1/10");

    h.controller.submit_answer(false);
    assert_eq!(next_event(&mut h.events).await, QuizEvent::AnswerOutcome(true));
}

#[tokio::test(start_paused = true)]
async fn second_round_keeps_first_best_on_equal_score() {
    let mut h = harness(ScriptedLoader::new("7.5"), Posters(Some(Vec::new())));
    h.controller.start();

    for _ in 0..2 {
        for i in 0..10 {
            next_question(&mut h.events).await;
            h.controller.submit_answer(i % 2 == 0);
        }
        let (_, body, _) = round_summary(&mut h.events).await;
        assert!(body.starts_with("Your result: 5/10\n"), "{body}");
        h.controller.request_restart();
    }

    let stats = h.services.statistics().load().await.unwrap();
    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.total_correct, 10);
    assert_eq!(stats.best.map(|b| b.correct_answers()), Some(5));
}
