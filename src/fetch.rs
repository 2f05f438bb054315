//! Remote JSON fetching
//!
//! The cache talks to the network only through [`JsonFetcher`], so tests and
//! alternative transports can stand in for [`HttpFetcher`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when fetching a JSON document
///
/// Cloneable so that every caller waiting on the same request receives the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The server answered with something other than 200 OK
    #[error("{status} status code. Url requested: {url}")]
    Remote {
        status: u16,
        url: String,
        headers: Vec<(String, String)>,
    },

    /// The response body was not valid JSON
    #[error("Failed to parse JSON response from {url}: {message}")]
    Parse { url: String, message: String },

    /// The request never produced a response
    #[error("HTTP request to {url} failed: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    /// HTTP status for remote errors
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The URL that was requested
    pub fn url(&self) -> &str {
        match self {
            FetchError::Remote { url, .. }
            | FetchError::Parse { url, .. }
            | FetchError::Transport { url, .. } => url,
        }
    }
}

/// Fetches and parses a JSON document
#[async_trait]
pub trait JsonFetcher: Send + Sync + 'static {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// [`JsonFetcher`] backed by a reqwest client
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new HttpFetcher with a custom HTTP client (timeouts, proxies, ...)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
                .collect();
            return Err(FetchError::Remote {
                status: status.as_u16(),
                url: url.to_string(),
                headers,
            });
        }

        let text = response.text().await.map_err(transport)?;
        parse_body(url, &text)
    }
}

/// Parses a response body, attributing failures to `url`
pub(crate) fn parse_body(url: &str, body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_body_accepts_objects_and_arrays() {
        let object = parse_body("http://x", r#"{"id":"1322"}"#).unwrap();
        assert_eq!(object["id"], "1322");

        let array = parse_body("http://x", r#"[{"id":"1"},{"id":"2"}]"#).unwrap();
        assert_eq!(array.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_body_reports_url() {
        let err = parse_body("http://api/competitions/1", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
        assert_eq!(err.url(), "http://api/competitions/1");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_remote_error_message() {
        let err = FetchError::Remote {
            status: 404,
            url: "http://api/competitions/1".to_string(),
            headers: vec![("content-type".to_string(), "text/html".to_string())],
        };
        assert_eq!(err.status(), Some(404));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("http://api/competitions/1"));
    }

    #[tokio::test]
    async fn test_http_fetcher_reports_transport_errors() {
        // Port 9 (discard) on localhost is not expected to speak HTTP
        let fetcher = HttpFetcher::new();
        let err = fetcher
            .fetch_json("http://127.0.0.1:9/competitions")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
