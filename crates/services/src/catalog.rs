use async_trait::async_trait;
use log::warn;
use quiz_core::model::MovieRecord;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::CatalogConfig;
use crate::error::{AppServicesError, CatalogError};

/// Supplies the list of movies questions are drawn from.
#[async_trait]
pub trait MoviesLoader: Send + Sync {
    /// Fetch the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport, status or provider failures.
    async fn load_movies(&self) -> Result<Vec<MovieRecord>, CatalogError>;
}

/// Downloads poster bytes for a movie.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw image bytes behind `url`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the image cannot be downloaded.
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, CatalogError>;
}

/// Poster size requested from the provider's image CDN.
const RESIZED_IMAGE_SUFFIX: &str = "._V0_UX600_.jpg";

/// HTTP client for the movie provider; serves both the catalog and posters.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    config: CatalogConfig,
}

impl HttpCatalogClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Http` if the TLS backend cannot be initialised.
    pub fn new(config: CatalogConfig) -> Result<Self, AppServicesError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MoviesLoader for HttpCatalogClient {
    async fn load_movies(&self) -> Result<Vec<MovieRecord>, CatalogError> {
        let response = self.client.get(self.config.catalog_url()).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }
        let body: CatalogResponse = response.json().await?;
        into_records(body)
    }
}

#[async_trait]
impl ImageFetcher for HttpCatalogClient {
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, CatalogError> {
        let response = self.client.get(resized_image_url(url)).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogResponse {
    #[serde(default)]
    error_message: String,
    #[serde(default)]
    items: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    #[serde(rename = "fullTitle", default)]
    title: String,
    #[serde(rename = "imDbRating", default)]
    rating: String,
    #[serde(rename = "image")]
    image_url: String,
}

/// Items with a broken image URL are dropped; an empty result is an error.
fn into_records(body: CatalogResponse) -> Result<Vec<MovieRecord>, CatalogError> {
    if !body.error_message.trim().is_empty() {
        return Err(CatalogError::Provider(body.error_message));
    }

    let records: Vec<MovieRecord> = body
        .items
        .into_iter()
        .filter_map(
            |item| match MovieRecord::new(item.title, item.rating, &item.image_url) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping catalog item: {err}");
                    None
                }
            },
        )
        .collect();

    if records.is_empty() {
        return Err(CatalogError::EmptyCatalog);
    }
    Ok(records)
}

/// Swap the provider's size suffix (everything after the last `._`) for a
/// mid-size poster. URLs without such a suffix are left alone.
fn resized_image_url(url: &Url) -> Url {
    let path = url.path();
    let Some(pos) = path.rfind("._") else {
        return url.clone();
    };
    let mut resized = url.clone();
    resized.set_path(&format!("{}{RESIZED_IMAGE_SUFFIX}", &path[..pos]));
    resized
}
