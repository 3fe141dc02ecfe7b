#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod config;
pub mod error;
pub mod question_source;
pub mod sessions;
pub mod statistics_service;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::{HttpCatalogClient, ImageFetcher, MoviesLoader};
pub use config::{CatalogConfig, SessionConfig};
pub use error::{AppServicesError, CatalogError, StatisticsError};
pub use question_source::{QuestionSource, ThresholdSource};
pub use sessions::{
    ChannelObserver, QuizController, QuizEvent, QuizObserver, RoundPhase, SessionSnapshot,
};
pub use statistics_service::{RecordedResult, StatisticsService};
