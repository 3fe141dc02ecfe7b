use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameResultError {
    #[error("a game must ask at least one question")]
    NoQuestions,

    #[error("correct answers ({correct}) exceed total questions ({total})")]
    TooManyCorrect { correct: u32, total: u32 },
}

/// Outcome of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    correct_answers: u32,
    total_questions: u32,
    finished_at: DateTime<Utc>,
}

impl GameResult {
    /// Build a result, enforcing `0 < total` and `correct <= total`.
    ///
    /// # Errors
    ///
    /// Returns `GameResultError::NoQuestions` for an empty round and
    /// `GameResultError::TooManyCorrect` if the score exceeds the round size.
    pub fn new(
        correct_answers: u32,
        total_questions: u32,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, GameResultError> {
        if total_questions == 0 {
            return Err(GameResultError::NoQuestions);
        }
        if correct_answers > total_questions {
            return Err(GameResultError::TooManyCorrect {
                correct: correct_answers,
                total: total_questions,
            });
        }
        Ok(Self {
            correct_answers,
            total_questions,
            finished_at,
        })
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    /// Fraction of correct answers in `0.0..=1.0`.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        f64::from(self.correct_answers) / f64::from(self.total_questions)
    }

    /// Ranking rule: more correct answers wins, ties go to the later finish.
    ///
    /// Strict on both keys, so a result never ranks above itself. Round size
    /// is not taken into account.
    #[must_use]
    pub fn ranks_above(&self, other: &GameResult) -> bool {
        match self.correct_answers.cmp(&other.correct_answers) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => self.finished_at > other.finished_at,
        }
    }

    /// Whether this result should replace `best` under the accuracy rule.
    ///
    /// Any result beats a missing best; otherwise the accuracy must be
    /// strictly greater, so an equal-accuracy replay keeps the older record.
    #[must_use]
    pub fn beats_accuracy_of(&self, best: Option<&GameResult>) -> bool {
        best.is_none_or(|best| self.accuracy() > best.accuracy())
    }
}
