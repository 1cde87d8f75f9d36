use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use crate::error::{Error, Result};

/// Thin wrapper over a shared `reqwest::Client` for JSON GETs.
#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("livedash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(HttpClient { inner })
    }

    /// GET `url` with `query` and decode the JSON body. Non-2xx answers
    /// become `Error::HttpStatus`, undecodable bodies `Error::Payload`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.inner.get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("GET {} returned {}", url, status);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::Payload(format!("{}: {}", url, e)))
    }
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
