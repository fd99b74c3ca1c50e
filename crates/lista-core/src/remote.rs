//! Remote commit endpoint client
//!
//! The server of record accepts a list's Markdown body through a per-list
//! save action: a URL-encoded form POST with a single `markdown` field.
//! Any non-2xx response or transport error is reported as a plain failure
//! so callers can keep (or create) the local pending copy.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Request timeout for a single push
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// A client able to commit a list's Markdown to server-of-record state.
///
/// `push` resolves to `true` on success and `false` on any failure; it never
/// panics and never returns an error type, because the caller's only
/// decision is whether the local pending copy must be kept.
pub trait RemoteClient: Send + Sync {
    /// Commit the Markdown body for the given list
    fn push(&self, list_id: &str, markdown: &str) -> impl Future<Output = bool> + Send;
}

/// HTTP implementation of [`RemoteClient`]
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRemoteClient {
    /// Create a client for the given server base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("HTTP client construction");
        Self::with_client(http, base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// The server base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the per-list save-markdown action
    fn save_url(&self, list_id: &str) -> String {
        format!("{}/lists/{}?/saveMarkdown", self.base_url, list_id)
    }
}

impl RemoteClient for HttpRemoteClient {
    async fn push(&self, list_id: &str, markdown: &str) -> bool {
        let url = self.save_url(list_id);
        let result = self
            .http
            .post(&url)
            .form(&[("markdown", markdown)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(list_id, "markdown committed");
                true
            }
            Ok(response) => {
                warn!(list_id, status = %response.status(), "server rejected markdown save");
                false
            }
            Err(err) => {
                // Expected while offline; the caller keeps the pending copy
                debug!(list_id, error = %err, "markdown save did not reach the server");
                false
            }
        }
    }
}
