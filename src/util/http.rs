//! Shared reqwest plumbing: client construction and status checking that
//! maps failures onto [`IngestError`].
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::IngestError;

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Send and require a 2xx. `url` is only used for error context.
pub async fn send_checked(req: RequestBuilder, url: &str) -> Result<Response, IngestError> {
    let resp = req
        .send()
        .await
        .map_err(|e| IngestError::network(url, e))?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(IngestError::remote(url, Some(status.as_u16()), body));
    }
    Ok(resp)
}

/// Decode a JSON body; undecodable bodies are remote errors.
pub async fn read_json<T: DeserializeOwned>(resp: Response, url: &str) -> Result<T, IngestError> {
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| IngestError::network(url, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        IngestError::remote(
            url,
            None,
            format!("malformed JSON ({e}): {}", String::from_utf8_lossy(&bytes)),
        )
    })
}

pub async fn read_text(resp: Response, url: &str) -> Result<String, IngestError> {
    resp.text().await.map_err(|e| IngestError::network(url, e))
}
