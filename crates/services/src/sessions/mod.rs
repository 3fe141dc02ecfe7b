mod controller;
mod events;
mod state;

// Public API of the session subsystem.
pub use controller::{QuizController, ROUND_SUMMARY_ACTION, ROUND_SUMMARY_TITLE};
pub use events::{ChannelObserver, QuizEvent, QuizObserver};
pub use state::{RoundPhase, SessionSnapshot};
