//! Loading of remote data: the boundary files and basemap tiles.

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};

use crate::config::AtlasConfig;
use crate::error::AtlasError;

mod boundaries;
mod decoded_image;
pub mod file_cache;
mod tiles;

pub use boundaries::{decode_feature_collection, load_boundaries, BoundaryData, BoundaryLoad};
pub use decoded_image::DecodedImage;
pub use file_cache::FileCacheController;
pub use tiles::{TileKey, TileLoader, DEFAULT_RETRY_DELAY, DEFAULT_TILE_CAPACITY};

/// Source of raw data addressed by url.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Loads the data from the given url.
    async fn load_bytes(&self, url: &str) -> Result<Bytes, AtlasError>;
}

/// Loads data with HTTP GET requests, optionally persisting responses in a file cache.
#[derive(Debug, Clone)]
pub struct UrlDataProvider {
    http_client: reqwest::Client,
    cache: Option<FileCacheController>,
}

impl UrlDataProvider {
    /// Creates a new provider.
    pub fn new(user_agent: &str, cache: Option<FileCacheController>) -> Result<Self, AtlasError> {
        let http_client = reqwest::Client::builder().user_agent(user_agent).build()?;

        Ok(Self { http_client, cache })
    }

    /// Creates a provider with the user agent and cache folder of the configuration.
    pub fn from_config(config: &AtlasConfig) -> Result<Self, AtlasError> {
        let cache = config
            .cache_dir
            .as_ref()
            .map(FileCacheController::new)
            .transpose()?;

        Self::new(&config.user_agent, cache)
    }

    async fn load_from_web(&self, url: &str) -> Result<Bytes, AtlasError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            info!("Failed to load {url}: {status}");
            return Err(AtlasError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl DataProvider for UrlDataProvider {
    async fn load_bytes(&self, url: &str) -> Result<Bytes, AtlasError> {
        if let Some(data) = self.cache.as_ref().and_then(|cache| cache.get(url)) {
            return Ok(data);
        }

        debug!("Loading {url}");
        let data = self.load_from_web(url).await?;

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.insert(url, &data) {
                log::warn!("Failed to write persistent cache entry: {error:?}");
            }
        }

        Ok(data)
    }
}
