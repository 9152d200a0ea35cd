use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use skyfinder_core::search::{SearchRequest, SearchResponse};
use skyfinder_store::app_config::SearchConfig;

#[derive(Debug, thiserror::Error)]
pub enum SearchClientError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("search service returned status {0}")]
    Status(u16),
    #[error("search service response is not JSON: {0}")]
    Decode(String),
    #[error("search service response exceeds {0} bytes")]
    TooLarge(usize),
    #[error("circuit breaker [{0}] is open")]
    CircuitOpen(String),
}

/// The external natural-language search service.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchClientError>;
}

/// [`SearchService`] over HTTP: POSTs the request as JSON to one endpoint.
pub struct HttpSearchClient {
    client: Client,
    endpoint: String,
    max_response_bytes: usize,
}

impl HttpSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchService for HttpSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchClientError> {
        debug!("POST {} user_query={:?}", self.endpoint, request.user_query);

        let mut response = self.client.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchClientError::Status(status.as_u16()));
        }

        let limit = self.max_response_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(SearchClientError::TooLarge(limit));
        }

        // content-length may be absent or wrong, so count while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(SearchClientError::TooLarge(limit));
            }
            body.extend_from_slice(&chunk);
        }
        decode_response(&body)
    }
}

/// Any JSON body is accepted; a body that is not an object carrying
/// `results` decodes to a response without results.
pub fn decode_response(body: &[u8]) -> Result<SearchResponse, SearchClientError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| SearchClientError::Decode(e.to_string()))?;
    match value {
        serde_json::Value::Object(mut fields) => Ok(SearchResponse {
            results: fields.remove("results").unwrap_or_default(),
        }),
        _ => Ok(SearchResponse::default()),
    }
}
