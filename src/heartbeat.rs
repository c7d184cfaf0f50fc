//! Heartbeat pings
//!
//! A scheduled run pings a monitoring endpoint so a missed or failed schedule
//! shows up as an absent heartbeat.

use crate::{DilbertError, Result};
use reqwest::{redirect::Policy, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartbeatOutput {
    pub endpoint: String,
    pub status: u16,
}

/// Builds the client used for pings: no redirects, short timeout
pub fn build_heartbeat_client(user_agent: &str) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(5))
        .redirect(Policy::none())
        .build()
}

/// Sends a GET to `endpoint` and requires a 2xx answer
pub async fn ping(client: &Client, endpoint: &str) -> Result<HeartbeatOutput> {
    info!("Sending ping to {}", endpoint);

    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(|e| DilbertError::http(endpoint, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DilbertError::upstream(
            endpoint,
            format!("HTTP status not 2xx: {}", status),
        ));
    }

    Ok(HeartbeatOutput {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
    })
}
