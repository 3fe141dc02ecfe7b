use std::sync::Arc;

use log::{info, warn};
use quiz_core::Clock;
use quiz_core::model::{GameResult, Statistics};
use storage::repository::KeyValueStore;

use crate::error::StatisticsError;

pub const GAMES_PLAYED_KEY: &str = "games_played";
pub const TOTAL_CORRECT_KEY: &str = "total_correct";
pub const TOTAL_ASKED_KEY: &str = "total_asked";
pub const BEST_CORRECT_KEY: &str = "best_correct";
pub const BEST_TOTAL_KEY: &str = "best_total";
pub const BEST_FINISHED_AT_KEY: &str = "best_finished_at";

/// What happened when a round was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedResult {
    pub result: GameResult,
    pub new_best: bool,
}

/// Persists cumulative quiz statistics in a key-value store.
///
/// Each statistic lives under its own key and is written separately. A crash
/// in the middle of `record_result` can leave the counters partially updated.
#[derive(Clone)]
pub struct StatisticsService {
    clock: Clock,
    store: Arc<dyn KeyValueStore>,
}

impl StatisticsService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn KeyValueStore>) -> Self {
        Self { clock, store }
    }

    /// Read every statistic from the store. Missing keys count as zero.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the store cannot be read or holds values
    /// that do not fit the statistics.
    pub async fn load(&self) -> Result<Statistics, StatisticsError> {
        let games_played = self.read_u32(GAMES_PLAYED_KEY).await?;
        let total_correct = self.read_u64(TOTAL_CORRECT_KEY).await?;
        let total_asked = self.read_u64(TOTAL_ASKED_KEY).await?;
        let best = self.read_best().await?;

        Ok(Statistics {
            games_played,
            total_correct,
            total_asked,
            best,
        })
    }

    /// Record a completed round stamped with the current time.
    ///
    /// The best result is replaced only when this round's accuracy is strictly
    /// greater than the stored best's.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Result` for an invalid `(correct, total)`
    /// pair before anything is written, or a storage error from any write.
    pub async fn record_result(
        &self,
        correct: u32,
        total: u32,
    ) -> Result<RecordedResult, StatisticsError> {
        let result = GameResult::new(correct, total, self.clock.now())?;
        let mut stats = self.load().await?;
        let new_best = stats.record(result);

        self.store
            .set_int(GAMES_PLAYED_KEY, i64::from(stats.games_played))
            .await?;
        self.store
            .set_int(TOTAL_CORRECT_KEY, to_i64(TOTAL_CORRECT_KEY, stats.total_correct)?)
            .await?;
        self.store
            .set_int(TOTAL_ASKED_KEY, to_i64(TOTAL_ASKED_KEY, stats.total_asked)?)
            .await?;

        if new_best {
            self.store
                .set_int(BEST_CORRECT_KEY, i64::from(result.correct_answers()))
                .await?;
            self.store
                .set_int(BEST_TOTAL_KEY, i64::from(result.total_questions()))
                .await?;
            self.store
                .set_timestamp(BEST_FINISHED_AT_KEY, result.finished_at())
                .await?;
            info!("new best result {correct}/{total}");
        }

        Ok(RecordedResult { result, new_best })
    }

    /// # Errors
    ///
    /// Returns `StatisticsError` if the store cannot be read.
    pub async fn games_played(&self) -> Result<u32, StatisticsError> {
        self.read_u32(GAMES_PLAYED_KEY).await
    }

    /// # Errors
    ///
    /// Returns `StatisticsError` if the store cannot be read.
    pub async fn best_result(&self) -> Result<Option<GameResult>, StatisticsError> {
        self.read_best().await
    }

    /// # Errors
    ///
    /// Returns `StatisticsError` if the store cannot be read.
    pub async fn average_accuracy_percent(&self) -> Result<f64, StatisticsError> {
        Ok(self.load().await?.average_accuracy_percent())
    }

    /// Multi-line report of games played, best result and average accuracy.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if the store cannot be read.
    pub async fn summary_text(&self) -> Result<String, StatisticsError> {
        Ok(self.load().await?.summary_text())
    }

    async fn read_best(&self) -> Result<Option<GameResult>, StatisticsError> {
        let total = self.read_u32(BEST_TOTAL_KEY).await?;
        if total == 0 {
            return Ok(None);
        }
        let correct = self.read_u32(BEST_CORRECT_KEY).await?;
        let Some(finished_at) = self.store.get_timestamp(BEST_FINISHED_AT_KEY).await? else {
            warn!("best result {correct}/{total} has no finish time, ignoring it");
            return Ok(None);
        };
        match GameResult::new(correct, total, finished_at) {
            Ok(best) => Ok(Some(best)),
            Err(err) => {
                warn!("stored best result {correct}/{total} is invalid ({err}), ignoring it");
                Ok(None)
            }
        }
    }

    async fn read_u32(&self, key: &'static str) -> Result<u32, StatisticsError> {
        let value = self.store.get_int(key).await?.unwrap_or(0);
        u32::try_from(value).map_err(|_| StatisticsError::OutOfRange { key, value })
    }

    async fn read_u64(&self, key: &'static str) -> Result<u64, StatisticsError> {
        let value = self.store.get_int(key).await?.unwrap_or(0);
        u64::try_from(value).map_err(|_| StatisticsError::OutOfRange { key, value })
    }
}

fn to_i64(key: &'static str, value: u64) -> Result<i64, StatisticsError> {
    i64::try_from(value).map_err(|_| StatisticsError::OutOfRange {
        key,
        value: i64::MAX,
    })
}
