use std::env;
use std::time::Duration;

use quiz_core::model::QUESTIONS_PER_ROUND;

use crate::question_source::ThresholdSource;

pub const DEFAULT_CATALOG_URL: &str = "https://tv-api.com/en/API/Top250Movies";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_ANSWER_DELAY: Duration = Duration::from_secs(1);

/// Where the movie list comes from.
#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl CatalogConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Reads `QUIZ_API_KEY`, `QUIZ_CATALOG_URL` and `QUIZ_HTTP_TIMEOUT_SECS`.
    ///
    /// Returns `None` when no API key is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_CATALOG_URL").unwrap_or_else(|_| DEFAULT_CATALOG_URL.into());
        let timeout = env::var("QUIZ_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map_or(DEFAULT_HTTP_TIMEOUT, Duration::from_secs);
        Some(Self {
            base_url,
            api_key,
            timeout,
        })
    }

    /// Full catalog endpoint; the provider takes the key as the last path segment.
    #[must_use]
    pub fn catalog_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_key.trim()
        )
    }
}

/// Pacing and round shape for a quiz session.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub questions_per_round: u32,
    pub answer_delay: Duration,
    pub threshold: ThresholdSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            questions_per_round: QUESTIONS_PER_ROUND,
            answer_delay: DEFAULT_ANSWER_DELAY,
            threshold: ThresholdSource::Random,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_answer_delay(mut self, delay: Duration) -> Self {
        self.answer_delay = delay;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: ThresholdSource) -> Self {
        self.threshold = threshold;
        self
    }
}
