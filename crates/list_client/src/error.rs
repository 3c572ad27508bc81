use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned status {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ListClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server rejected the request: {message}")]
    Rejected { message: String },
    #[error("malformed list payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    #[error("no records selected")]
    EmptySelection,
}

impl ListClientError {
    pub fn user_message(&self) -> String {
        match self {
            ListClientError::Rejected { message } if !message.is_empty() => message.clone(),
            ListClientError::Rejected { .. } => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}
