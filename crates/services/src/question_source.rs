use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use quiz_core::model::{MovieRecord, Question, THRESHOLD_MAX, THRESHOLD_MIN};
use rand::Rng;

use crate::catalog::{ImageFetcher, MoviesLoader};
use crate::error::CatalogError;

/// How the rating cutoff for each question is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ThresholdSource {
    /// Uniform in `THRESHOLD_MIN..=THRESHOLD_MAX`.
    #[default]
    Random,
    /// Always the same cutoff, for deterministic rounds.
    Fixed(f32),
}

impl ThresholdSource {
    #[must_use]
    pub fn draw(&self) -> f32 {
        match self {
            ThresholdSource::Random => rand::rng().random_range(THRESHOLD_MIN..=THRESHOLD_MAX),
            ThresholdSource::Fixed(threshold) => *threshold,
        }
    }
}

/// Turns catalog movies into yes/no questions.
///
/// Cheap to clone; clones share the loaded catalog so a background task can
/// draw questions while the session keeps its own handle.
#[derive(Clone)]
pub struct QuestionSource {
    loader: Arc<dyn MoviesLoader>,
    images: Arc<dyn ImageFetcher>,
    threshold: ThresholdSource,
    catalog: Arc<RwLock<Arc<[MovieRecord]>>>,
}

impl QuestionSource {
    #[must_use]
    pub fn new(loader: Arc<dyn MoviesLoader>, images: Arc<dyn ImageFetcher>) -> Self {
        Self {
            loader,
            images,
            threshold: ThresholdSource::Random,
            catalog: Arc::new(RwLock::new(Arc::from(Vec::new()))),
        }
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: ThresholdSource) -> Self {
        self.threshold = threshold;
        self
    }

    /// Fetch the catalog and replace the stored one. Returns the movie count.
    ///
    /// # Errors
    ///
    /// Returns the loader's `CatalogError`, or `CatalogError::EmptyCatalog`
    /// if the provider answered with no movies. The previous catalog is kept
    /// on failure.
    pub async fn load_catalog(&self) -> Result<usize, CatalogError> {
        debug!("loading movie catalog");
        let movies = self.loader.load_movies().await?;
        if movies.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        let count = movies.len();
        *self.catalog.write().unwrap_or_else(std::sync::PoisonError::into_inner) =
            Arc::from(movies);
        info!("movie catalog ready with {count} movies");
        Ok(count)
    }

    #[must_use]
    pub fn catalog_len(&self) -> usize {
        self.snapshot().len()
    }

    /// Draw a random movie (with replacement) and build a question for it.
    ///
    /// A failed poster download yields an empty image and an unparsable
    /// rating counts as `0.0`; neither fails the question.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyCatalog` if no catalog has been loaded.
    pub async fn next_question(&self) -> Result<Question, CatalogError> {
        let catalog = self.snapshot();
        if catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }
        let movie = &catalog[rand::rng().random_range(0..catalog.len())];

        let image = match self.images.fetch_image(movie.image_url()).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("failed to load poster for {}: {err}", movie.title());
                Vec::new()
            }
        };

        let rating = match movie.parse_rating() {
            Ok(rating) => rating,
            Err(err) => {
                debug!(
                    "rating {:?} of {} is not a number ({err}), using 0",
                    movie.rating_text(),
                    movie.title()
                );
                0.0
            }
        };

        Ok(Question::from_rating(image, rating, self.threshold.draw()))
    }

    fn snapshot(&self) -> Arc<[MovieRecord]> {
        Arc::clone(
            &self
                .catalog
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        )
    }
}
