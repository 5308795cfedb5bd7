use std::time::Duration;

use bytes::BytesMut;
use client_logging::{client_debug, client_warn};
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::endpoint::{locate_message_url, search_url};
use crate::{FailureKind, MessageBody, SearchError, SearchResponse};

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl SearchSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, term: &str, offset: usize) -> Result<SearchResponse, SearchError>;

    async fn locate_message(&self, id: &str) -> Result<MessageBody, SearchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestSearchBackend {
    settings: SearchSettings,
    client: reqwest::Client,
}

impl ReqwestSearchBackend {
    pub fn new(settings: SearchSettings) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SearchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, SearchError> {
        client_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SearchError::new(FailureKind::NotFound, status.to_string()));
        }
        if !status.is_success() {
            return Err(SearchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(SearchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(SearchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body)
            .map_err(|err| SearchError::new(FailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl SearchBackend for ReqwestSearchBackend {
    async fn search(&self, term: &str, offset: usize) -> Result<SearchResponse, SearchError> {
        let url = search_url(&self.settings.base_url, term, offset)?;
        let response: SearchResponse = self.get_json(url).await?;
        if let Some(echoed) = response.offset {
            if echoed != offset {
                client_warn!("Server answered offset {} for request at {}", echoed, offset);
            }
        }
        Ok(response)
    }

    async fn locate_message(&self, id: &str) -> Result<MessageBody, SearchError> {
        let url = locate_message_url(&self.settings.base_url, id)?;
        self.get_json(url).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        return SearchError::new(FailureKind::Timeout, err.to_string());
    }
    SearchError::new(FailureKind::Network, err.to_string())
}
