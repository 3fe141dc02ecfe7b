/// Number of questions in a full round.
pub const QUESTIONS_PER_ROUND: u32 = 10;

/// Lower bound of the random rating threshold.
pub const THRESHOLD_MIN: f32 = 6.0;

/// Upper bound (inclusive) of the random rating threshold.
pub const THRESHOLD_MAX: f32 = 9.0;

/// A single yes/no quiz question: "is this movie rated higher than X?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    image: Vec<u8>,
    prompt: String,
    correct_answer: bool,
}

impl Question {
    /// Build the question for a movie with `rating` against `threshold`.
    ///
    /// The answer compares against the exact threshold; the prompt shows it
    /// rounded to one decimal.
    #[must_use]
    pub fn from_rating(image: Vec<u8>, rating: f32, threshold: f32) -> Self {
        Self {
            image,
            prompt: format!("Is this movie rated higher than {threshold:.1}?"),
            correct_answer: rating > threshold,
        }
    }

    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }

    /// Whether the user's yes/no answer matches.
    #[must_use]
    pub fn is_correct(&self, user_says_yes: bool) -> bool {
        user_says_yes == self.correct_answer
    }
}
