use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::{HttpCatalogClient, ImageFetcher, MoviesLoader};
use crate::config::{CatalogConfig, SessionConfig};
use crate::error::AppServicesError;
use crate::question_source::QuestionSource;
use crate::sessions::{QuizController, QuizObserver};
use crate::statistics_service::StatisticsService;

/// Composition root: owns the long-lived services and spawns sessions.
#[derive(Clone)]
pub struct AppServices {
    statistics: StatisticsService,
    questions: QuestionSource,
    session: SessionConfig,
}

impl AppServices {
    /// Build services backed by `SQLite` statistics and the HTTP movie provider.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client
    /// setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: CatalogConfig,
        session: SessionConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let client = Arc::new(HttpCatalogClient::new(catalog)?);
        let loader: Arc<dyn MoviesLoader> = client.clone();
        let images: Arc<dyn ImageFetcher> = client;
        Ok(Self::from_parts(&storage, clock, loader, images, session))
    }

    /// Assemble services from explicit collaborators.
    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        clock: Clock,
        loader: Arc<dyn MoviesLoader>,
        images: Arc<dyn ImageFetcher>,
        session: SessionConfig,
    ) -> Self {
        Self {
            statistics: StatisticsService::new(clock, Arc::clone(&storage.kv)),
            questions: QuestionSource::new(loader, images),
            session,
        }
    }

    #[must_use]
    pub fn statistics(&self) -> StatisticsService {
        self.statistics.clone()
    }

    /// Spawn a quiz session reporting to `observer`. Requires a tokio runtime.
    #[must_use]
    pub fn spawn_session(&self, observer: Arc<dyn QuizObserver>) -> QuizController {
        QuizController::spawn(
            self.questions.clone(),
            self.statistics.clone(),
            observer,
            self.session,
        )
    }
}
