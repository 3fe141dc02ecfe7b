use crate::model::GameResult;
use crate::time::format_finished_at;

/// Cumulative quiz statistics across all completed rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub games_played: u32,
    pub total_correct: u64,
    pub total_asked: u64,
    pub best: Option<GameResult>,
}

impl Statistics {
    /// Fold a completed round into the totals.
    ///
    /// Returns `true` when the result replaced the stored best.
    pub fn record(&mut self, result: GameResult) -> bool {
        self.games_played = self.games_played.saturating_add(1);
        self.total_correct = self
            .total_correct
            .saturating_add(u64::from(result.correct_answers()));
        self.total_asked = self
            .total_asked
            .saturating_add(u64::from(result.total_questions()));

        if result.beats_accuracy_of(self.best.as_ref()) {
            self.best = Some(result);
            true
        } else {
            false
        }
    }

    /// Average accuracy over every question ever asked, in percent.
    ///
    /// Divides by `total_asked` rather than `questions_per_round * games_played`.
    /// The two are equal while every recorded round is full length; the stored
    /// count stays right if the round size changes between runs.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_accuracy_percent(&self) -> f64 {
        if self.total_asked == 0 {
            return 0.0;
        }
        100.0 * self.total_correct as f64 / self.total_asked as f64
    }

    /// Multi-line report: games played, best result, average accuracy.
    #[must_use]
    pub fn summary_text(&self) -> String {
        let best = match &self.best {
            Some(best) => format!(
                "{}/{} ({})",
                best.correct_answers(),
                best.total_questions(),
                format_finished_at(best.finished_at())
            ),
            None => "none yet".to_owned(),
        };
        format!(
            "Quizzes played: {}\nBest result: {best}\nAverage accuracy: {:.2}%",
            self.games_played,
            self.average_accuracy_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn result(correct: u32, total: u32, minutes: i64) -> GameResult {
        GameResult::new(correct, total, fixed_now() + Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn empty_statistics_report_zero_accuracy() {
        let stats = Statistics::default();
        assert_eq!(stats.average_accuracy_percent(), 0.0);
        assert_eq!(
            stats.summary_text(),
            "Quizzes played: 0\nBest result: none yet\nAverage accuracy: 0.00%"
        );
    }

    #[test]
    fn record_accumulates_totals() {
        let mut stats = Statistics::default();
        stats.record(result(4, 10, 0));
        stats.record(result(7, 10, 1));

        assert_eq!(stats.games_played, 2);
        assert_eq!(stats.total_correct, 11);
        assert_eq!(stats.total_asked, 20);
        assert!((stats.average_accuracy_percent() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn average_uses_questions_actually_asked() {
        let mut stats = Statistics::default();
        stats.record(result(5, 5, 0));
        stats.record(result(5, 10, 1));

        assert_eq!(stats.total_asked, 15);
        assert!((stats.average_accuracy_percent() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn equal_accuracy_keeps_older_best() {
        let mut stats = Statistics::default();
        let first = result(5, 10, 0);
        assert!(stats.record(first));
        assert!(!stats.record(result(5, 10, 1)));
        assert_eq!(stats.best, Some(first));
    }

    #[test]
    fn higher_accuracy_replaces_best() {
        let mut stats = Statistics::default();
        stats.record(result(5, 10, 0));
        let better = result(6, 10, 1);
        assert!(stats.record(better));
        assert_eq!(stats.best, Some(better));
    }

    #[test]
    fn summary_formats_best_and_two_decimals() {
        let mut stats = Statistics::default();
        stats.record(result(2, 3, 0));
        assert_eq!(
            stats.summary_text(),
            "Quizzes played: 1\nBest result: 2/3 (14.11.23 22:13)\nAverage accuracy: 66.67%"
        );
    }
}
