// Read-only HTTP client for the remote sightings feed.

use std::time::Duration;

use thiserror::Error;

use super::model::{FeedResponse, Sighting};

/// Community impling sightings database (Oracle ORDS endpoint).
pub const DEFAULT_FEED_URL: &str =
    "https://puos0bfgxc2lno5-implingdb.adb.us-phoenix-1.oraclecloudapps.com/ords/impling/implingdev/dev";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch failure taxonomy. All variants are recoverable: the tick that hit
/// one simply produces no candidates and the next tick proceeds normally.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure, timeout, or undecodable response body
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The feed answered with a non-success status
    #[error("feed returned status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone)]
pub struct SightingsClient {
    client: reqwest::Client,
    url: String,
}

impl SightingsClient {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One snapshot of the feed, in the order the source reports it.
    pub async fn fetch_sightings(&self) -> Result<Vec<Sighting>, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let feed: FeedResponse = response.json().await?;
        Ok(feed.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::World;

    #[tokio::test]
    async fn test_fetches_and_decodes_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"npcid": 7233, "xcoord": 3200, "ycoord": 3201, "world": 302, "insertedtime": "2025-06-01T12:00:00Z"},
                    {"npcid": 1644, "xcoord": 2700, "ycoord": 3400, "world": "f2p-8", "insertedtime": "2025-06-01T12:00:05Z"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = SightingsClient::new(format!("{}/feed", server.url()));
        let items = client.fetch_sightings().await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].entity_id, 7233);
        assert_eq!(items[1].world, World::Name("f2p-8".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/feed")
            .with_status(503)
            .create_async()
            .await;

        let client = SightingsClient::new(format!("{}/feed", server.url()));
        match client.fetch_sightings().await {
            Err(FetchError::Status(status)) => assert_eq!(status.as_u16(), 503),
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/feed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"items\": [{\"npcid\": \"not a number\"}]}")
            .create_async()
            .await;

        let client = SightingsClient::new(format!("{}/feed", server.url()));
        assert!(matches!(
            client.fetch_sightings().await,
            Err(FetchError::Http(_))
        ));
    }
}
