use quiz_core::model::Question;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Not started, or the last catalog load failed.
    Idle,
    Loading,
    InRound,
    RoundComplete,
}

/// What follows an answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: u32 },
    Complete { correct: u32, total: u32 },
}

/// Read-only view of the session, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: RoundPhase,
    pub current_index: u32,
    pub correct_so_far: u32,
    pub questions_per_round: u32,
    pub has_pending_question: bool,
}

/// Transient per-round state, owned by the session's coordination task.
#[derive(Debug)]
pub(crate) struct SessionState {
    phase: RoundPhase,
    current_index: u32,
    correct_so_far: u32,
    current_question: Option<Question>,
    questions_per_round: u32,
}

impl SessionState {
    pub(crate) fn new(questions_per_round: u32) -> Self {
        Self {
            phase: RoundPhase::Idle,
            current_index: 0,
            correct_so_far: 0,
            current_question: None,
            questions_per_round: questions_per_round.max(1),
        }
    }

    pub(crate) fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: RoundPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_question(&mut self, question: Question) {
        self.phase = RoundPhase::InRound;
        self.current_question = Some(question);
    }

    /// Score the pending question and consume it.
    ///
    /// Returns `None` when no question is pending, so repeated or stray input
    /// cannot change the score.
    pub(crate) fn answer(&mut self, user_says_yes: bool) -> Option<bool> {
        let question = self.current_question.take()?;
        let is_correct = question.is_correct(user_says_yes);
        if is_correct {
            self.correct_so_far += 1;
        }
        Some(is_correct)
    }

    /// Move past the answered question. `current_index` is zero-based, so the
    /// round ends on index `questions_per_round - 1`.
    pub(crate) fn advance(&mut self) -> Advance {
        if self.current_index == self.questions_per_round - 1 {
            self.phase = RoundPhase::RoundComplete;
            Advance::Complete {
                correct: self.correct_so_far,
                total: self.questions_per_round,
            }
        } else {
            self.current_index += 1;
            Advance::Next {
                index: self.current_index,
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.current_index = 0;
        self.correct_so_far = 0;
        self.current_question = None;
        self.phase = RoundPhase::Idle;
    }

    /// One-based position label, e.g. `"1/10"`.
    pub(crate) fn progress_label(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.questions_per_round)
    }

    pub(crate) fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            current_index: self.current_index,
            correct_so_far: self.correct_so_far,
            questions_per_round: self.questions_per_round,
            has_pending_question: self.current_question.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes_question() -> Question {
        Question::from_rating(Vec::new(), 7.5, 6.0)
    }

    #[test]
    fn answer_without_question_is_noop() {
        let mut state = SessionState::new(10);
        assert_eq!(state.answer(true), None);
        assert_eq!(state.snapshot().correct_so_far, 0);
    }

    #[test]
    fn answer_consumes_question() {
        let mut state = SessionState::new(10);
        state.set_question(yes_question());

        assert_eq!(state.answer(true), Some(true));
        assert_eq!(state.answer(true), None);
        assert_eq!(state.snapshot().correct_so_far, 1);
        assert!(!state.snapshot().has_pending_question);
    }

    #[test]
    fn wrong_answer_keeps_score() {
        let mut state = SessionState::new(10);
        state.set_question(yes_question());
        assert_eq!(state.answer(false), Some(false));
        assert_eq!(state.snapshot().correct_so_far, 0);
    }

    #[test]
    fn index_eight_advances_to_nine() {
        let mut state = SessionState::new(10);
        state.current_index = 8;
        assert_eq!(state.advance(), Advance::Next { index: 9 });
        assert_eq!(state.phase(), RoundPhase::Idle);
        assert_eq!(state.progress_label(), "10/10");
    }

    #[test]
    fn index_nine_completes_round() {
        let mut state = SessionState::new(10);
        state.current_index = 9;
        state.correct_so_far = 6;
        assert_eq!(
            state.advance(),
            Advance::Complete {
                correct: 6,
                total: 10
            }
        );
        assert_eq!(state.phase(), RoundPhase::RoundComplete);
    }

    #[test]
    fn reset_clears_round() {
        let mut state = SessionState::new(10);
        state.set_question(yes_question());
        state.answer(true);
        state.advance();
        state.set_question(yes_question());
        state.reset();

        assert_eq!(
            state.snapshot(),
            SessionSnapshot {
                phase: RoundPhase::Idle,
                current_index: 0,
                correct_so_far: 0,
                questions_per_round: 10,
                has_pending_question: false,
            }
        );
        assert_eq!(state.answer(true), None);
    }

    #[test]
    fn single_question_round_completes_immediately() {
        let mut state = SessionState::new(0);
        assert_eq!(state.snapshot().questions_per_round, 1);
        assert_eq!(
            state.advance(),
            Advance::Complete {
                correct: 0,
                total: 1
            }
        );
    }
}
