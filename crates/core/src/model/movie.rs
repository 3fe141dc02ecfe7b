use std::num::ParseFloatError;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MovieRecordError {
    #[error("invalid image url `{raw}`: {reason}")]
    InvalidImageUrl { raw: String, reason: String },
}

/// One entry of the movie catalog as delivered by the data provider.
///
/// The rating is kept as the provider's raw text; parsing happens when a
/// question is built so a malformed rating never rejects the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieRecord {
    title: String,
    rating_text: String,
    image_url: Url,
}

impl MovieRecord {
    /// Build a record, validating the image reference.
    ///
    /// # Errors
    ///
    /// Returns `MovieRecordError::InvalidImageUrl` if `image_url` is not an absolute URL.
    pub fn new(
        title: impl Into<String>,
        rating_text: impl Into<String>,
        image_url: &str,
    ) -> Result<Self, MovieRecordError> {
        let image_url = Url::parse(image_url).map_err(|err| MovieRecordError::InvalidImageUrl {
            raw: image_url.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            title: title.into(),
            rating_text: rating_text.into(),
            image_url,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn rating_text(&self) -> &str {
        &self.rating_text
    }

    #[must_use]
    pub fn image_url(&self) -> &Url {
        &self.image_url
    }

    /// Parse the rating text as a float.
    ///
    /// # Errors
    ///
    /// Returns the parse error for empty or non-numeric ratings.
    pub fn parse_rating(&self) -> Result<f32, ParseFloatError> {
        self.rating_text.trim().parse::<f32>()
    }

    /// Rating as a float, `0.0` when the text is not a number.
    #[must_use]
    pub fn rating_or_zero(&self) -> f32 {
        self.parse_rating().unwrap_or(0.0)
    }
}
