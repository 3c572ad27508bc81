use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::RecordId,
    protocol::{delete_query_pairs, ApiEnvelope},
};
use tracing::debug;

use crate::error::TransportError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiEnvelope, TransportError>;

    async fn delete(&self, path: &str, ids: &[RecordId]) -> Result<ApiEnvelope, TransportError>;
}

pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build().map_err(|source| {
            TransportError::Unavailable(format!("failed to build http client: {source}"))
        })?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url.into()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    async fn decode(url: String, response: reqwest::Response) -> Result<ApiEnvelope, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice::<ApiEnvelope>(&body).map_err(|err| TransportError::Decode {
            url,
            reason: err.to_string(),
        })
    }
}

fn normalize_base_url(raw: String) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<ApiEnvelope, TransportError> {
        let url = self.url(path);
        debug!("transport: GET {url} params={}", query.len());
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        Self::decode(url, response).await
    }

    async fn delete(&self, path: &str, ids: &[RecordId]) -> Result<ApiEnvelope, TransportError> {
        let url = self.url(path);
        debug!("transport: DELETE {url} ids={}", ids.len());
        let response = self
            .http
            .delete(&url)
            .query(&delete_query_pairs(ids))
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        Self::decode(url, response).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
