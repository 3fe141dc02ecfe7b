mod game_result;
mod movie;
mod question;
mod statistics;

pub use game_result::{GameResult, GameResultError};
pub use movie::{MovieRecord, MovieRecordError};
pub use question::{Question, QUESTIONS_PER_ROUND, THRESHOLD_MAX, THRESHOLD_MIN};
pub use statistics::Statistics;
