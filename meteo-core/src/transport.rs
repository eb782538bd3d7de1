use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use crate::error::ClientError;

/// Fetches a response body for a GET request.
///
/// Implementations return the raw bytes of a successful response and map
/// anything else to a [`ClientError`].
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(ClientError::HttpClient)?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<Vec<u8>, ClientError> {
        debug!("GET {url} {query:?}");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ClientError::NetworkRequest(url.to_string(), e))?;

        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| ClientError::NetworkRequest(url.to_string(), e))?;

        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                url: url.to_string(),
                status,
                body: truncate_body(&String::from_utf8_lossy(&body)),
            });
        }

        debug!("{url} answered {status} with {} bytes", body.len());
        Ok(body.to_vec())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
