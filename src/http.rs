//! HTTP retrieval of HTML pages.
//!
//! One shared `reqwest::Client` carries the browser-like default headers the
//! chart site expects. Pages are read with a size cap and decoded lossily.
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

const MAX_PAGE_SIZE: usize = 10 * 1024 * 1024; // 10MB

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// Header value from config contained characters HTTP does not allow
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),
}

/// Builds the client used for every page request.
///
/// # Errors
///
/// Returns [`FetchError::InvalidHeader`] when the configured `Accept-Language`
/// is not a legal header value, or [`FetchError::Network`] when the TLS
/// backend cannot be initialised.
pub fn build_client(config: &Config) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    let language = HeaderValue::from_str(&config.accept_language)
        .map_err(|_| FetchError::InvalidHeader("Accept-Language"))?;
    headers.insert(ACCEPT_LANGUAGE, language);

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Fetches `url` and returns the body as text.
///
/// `timeout` bounds the whole exchange, body included; `None` leaves it to the
/// transport.
///
/// # Errors
///
/// - [`FetchError::Network`] for connection failures
/// - [`FetchError::HttpStatus`] for any non-2xx response
/// - [`FetchError::Timeout`] when `timeout` elapses
/// - [`FetchError::ResponseTooLarge`] when the body exceeds 10MB
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    tracing::debug!(url = %url, "Fetching page");
    match timeout {
        Some(limit) => tokio::time::timeout(limit, get_text(client, url))
            .await
            .map_err(|_| FetchError::Timeout(limit))?,
        None => get_text(client, url).await,
    }
}

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_text(response, MAX_PAGE_SIZE).await
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
