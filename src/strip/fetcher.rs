//! HTTP fetcher
//!
//! This module handles the outbound requests of the strip pipeline:
//! - Building the HTTP client with the configured user agent and timeout
//! - Fetching the strip page as text
//! - Opening the image response for streaming
//!
//! Nothing here retries. A failed request surfaces as an upstream error and the
//! caller decides whether to run again.

use crate::config::SiteConfig;
use crate::{DilbertError, Result};
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;

/// Builds an HTTP client for the strip site
///
/// At most one redirect is followed; a second hop fails the request.
///
/// # Example
///
/// ```no_run
/// use dilbert_feed::config::SiteConfig;
/// use dilbert_feed::strip::build_http_client;
///
/// let client = build_http_client(&SiteConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &SiteConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(5)))
        .redirect(Policy::limited(1))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Sends a GET and requires a 2xx status
///
/// # Errors
///
/// * `DilbertError::Http` - Connection, timeout or redirect failure
/// * `DilbertError::Upstream` - The server answered with a non-success status
pub async fn fetch(client: &Client, url: &str) -> Result<Response> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DilbertError::http(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DilbertError::upstream(
            url,
            format!("HTTP status not 2xx: {}", status),
        ));
    }

    Ok(response)
}

/// Fetches a page and returns its body as text
pub async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    fetch(client, url)
        .await?
        .text()
        .await
        .map_err(|e| DilbertError::http(url, e))
}
