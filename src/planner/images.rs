//! Destination image lookup for the planner proxy

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ImageConfig;

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

/// Finds a representative picture for a destination.
///
/// Uses Unsplash search when an access key is configured and falls back to a
/// deterministic placeholder otherwise, or when the search fails.
#[derive(Clone)]
pub struct ImageLookup {
    http: Client,
    access_key: Option<String>,
    search_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

impl ImageLookup {
    #[must_use]
    pub fn new(config: &ImageConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            http,
            access_key: config.unsplash_access_key.clone(),
            search_url: UNSPLASH_SEARCH_URL.to_string(),
        }
    }

    /// Placeholder picture seeded by the destination name
    #[must_use]
    pub fn placeholder(destination: &str) -> String {
        format!(
            "https://picsum.photos/seed/{}/800/600",
            urlencoding::encode(destination)
        )
    }

    /// Image URL for `destination`; never fails
    pub async fn image_for(&self, destination: &str) -> String {
        let Some(access_key) = &self.access_key else {
            return Self::placeholder(destination);
        };

        match self.search(destination, access_key).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                debug!("No Unsplash results for '{}'", destination);
                Self::placeholder(destination)
            }
            Err(e) => {
                warn!("Error fetching image for {}: {}", destination, e);
                Self::placeholder(destination)
            }
        }
    }

    async fn search(&self, destination: &str, access_key: &str) -> reqwest::Result<Option<String>> {
        let response: SearchResponse = self
            .http
            .get(&self.search_url)
            .query(&[
                ("query", destination),
                ("per_page", "1"),
                ("orientation", "landscape"),
                ("client_id", access_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.results.into_iter().next().map(|p| p.urls.regular))
    }
}
