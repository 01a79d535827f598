//! Read-only HTTP client for the signage API
//!
//! This module provides the typed read interface the validator consumes:
//! - Bearer-token authentication against the login endpoint
//! - Bounded, paginated collection fetching with a hard item cap
//! - Concurrent snapshot acquisition for all four entity kinds
//!
//! The health prober lives in [`health`].

pub mod health;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::config::{Config, FETCH_CAP, PAGE_SIZE};
use crate::error::{Error, Result};
use crate::models::{Content, Display, Playlist, Schedule, Snapshot};

/// Token field names accepted in the login response, in priority order
const TOKEN_FIELDS: &[&str] = &["token", "accessToken", "access_token"];

/// Decoded page body
///
/// The upstream API is not consistent about its list envelope: older
/// endpoints return a bare array, newer ones wrap it in `items` or `data`.
/// The first recognized shape wins. Anything else decodes as `Unrecognized`
/// and is treated as an empty page, so minor upstream shape drift degrades
/// to a short fetch instead of a failed run.
///
/// TODO: the empty-page fallback silently tolerates upstream contract
/// drift; consider logging at warn level with the raw body once the API
/// envelope is stabilized.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PageBody<T> {
    Bare(Vec<T>),
    Items { items: Vec<T> },
    Data { data: Vec<T> },
    Unrecognized(serde_json::Value),
}

impl<T> PageBody<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Items { items } | Self::Data { data: items } => items,
            Self::Unrecognized(_) => Vec::new(),
        }
    }
}

/// HTTP client for the signage read API
pub struct ApiClient {
    /// HTTP client with the configured per-call timeout
    client: Client,

    /// Base address, without trailing slash
    base_url: String,
}

impl ApiClient {
    /// Create a client from the validator configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(&config.api_url, config.request_timeout())
    }

    /// Create a client against an explicit base address
    ///
    /// Used by the unauthenticated health subcommand and by the
    /// integration tests to point at a mock server.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).gzip(true).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange service-account credentials for a bearer token
    ///
    /// No retry: an authentication failure aborts the run immediately.
    ///
    /// # Errors
    ///
    /// Returns `Error::Auth` on a non-success status or when no recognized
    /// token field is present in the response body.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let url = format!("{}/api/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::auth(format!("login rejected with status {status}")));
        }

        let body: serde_json::Value = response.json().await?;
        for field in TOKEN_FIELDS {
            if let Some(token) = body.get(*field).and_then(|v| v.as_str()) {
                tracing::debug!(field = *field, "authenticated against signage API");
                return Ok(token.to_string());
            }
        }

        Err(Error::auth("no token field in login response"))
    }

    /// Fetch a full collection, page by page, up to the item cap
    ///
    /// Stops when a page comes back shorter than the page size or when
    /// [`FETCH_CAP`] items have accumulated (excess from the final page is
    /// truncated). An unrecognized response shape terminates the loop with
    /// whatever was gathered so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::Http` on network failure, `Error::Other` on a
    /// non-success status.
    pub async fn fetch_all<T: DeserializeOwned>(&self, token: &str, path: &str) -> Result<Vec<T>> {
        let mut collected: Vec<T> = Vec::new();
        let mut page = 1usize;

        loop {
            let url = format!("{}{}", self.base_url, path);
            let response = self
                .client
                .get(&url)
                .query(&[("page", page.to_string()), ("limit", PAGE_SIZE.to_string())])
                .bearer_auth(token)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::other(format!(
                    "GET {path} page {page} failed with status {status}"
                )));
            }

            let body: PageBody<T> = response.json().await?;
            let items = body.into_items();
            let page_len = items.len();
            collected.extend(items);

            if collected.len() >= FETCH_CAP {
                collected.truncate(FETCH_CAP);
                tracing::debug!(path, cap = FETCH_CAP, "fetch cap reached, truncating");
                break;
            }
            if page_len < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        tracing::debug!(path, count = collected.len(), "collection fetched");
        Ok(collected)
    }

    /// Fetch the four entity collections concurrently
    ///
    /// The fetches are issued together and all must succeed; validating
    /// against a partial snapshot would produce misleading issues, so any
    /// single failure fails the whole run.
    ///
    /// # Errors
    ///
    /// Propagates the first fetch failure.
    pub async fn fetch_snapshot(&self, token: &str) -> Result<Snapshot> {
        let (contents, playlists, displays, schedules) = tokio::try_join!(
            self.fetch_all::<Content>(token, "/api/content"),
            self.fetch_all::<Playlist>(token, "/api/playlists"),
            self.fetch_all::<Display>(token, "/api/displays"),
            self.fetch_all::<Schedule>(token, "/api/schedules"),
        )?;

        tracing::info!(
            contents = contents.len(),
            playlists = playlists.len(),
            displays = displays.len(),
            schedules = schedules.len(),
            "snapshot fetched"
        );

        Ok(Snapshot {
            contents,
            playlists,
            displays,
            schedules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_body_bare_array() {
        let body: PageBody<Content> = serde_json::from_str(r#"[{"id":"c1"},{"id":"c2"}]"#).unwrap();
        assert_eq!(body.into_items().len(), 2);
    }

    #[test]
    fn test_page_body_items_wrapper() {
        let body: PageBody<Content> =
            serde_json::from_str(r#"{"items":[{"id":"c1"}],"total":10}"#).unwrap();
        assert_eq!(body.into_items().len(), 1);
    }

    #[test]
    fn test_page_body_data_wrapper() {
        let body: PageBody<Content> =
            serde_json::from_str(r#"{"data":[{"id":"c1"}],"page":1}"#).unwrap();
        assert_eq!(body.into_items().len(), 1);
    }

    #[test]
    fn test_page_body_unrecognized_is_empty() {
        let body: PageBody<Content> =
            serde_json::from_str(r#"{"results":[{"id":"c1"}]}"#).unwrap();
        assert!(body.into_items().is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client =
            ApiClient::with_base_url("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
