//! Client for the chat-history service.
//!
//! The service answers `GET {base}/chat-history?group_name=..&user_id=..` with
//! `{"result": string | [string]}`. There is no authentication and no retry;
//! every failure is returned to the caller as a [`ChatHistoryError`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use formats::chat_output::{ChatHistoryOutput, ChatHistoryResponse};
use serde::Deserialize;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum ChatHistoryError {
    /// Connection failure, timeout, or an error while reading the body.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("chat history service answered {status}")]
    Status { status: reqwest::StatusCode },
    #[error("malformed chat history response: {reason}")]
    MalformedBody { reason: String },
}

/// Anything that can produce chat-history output for a group.
///
/// Methods return boxed futures so the trait stays dyn-compatible.
pub trait ChatHistorySource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        group_name: &'a str,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ChatHistoryOutput, ChatHistoryError>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpChatHistoryConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpChatHistoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
}

/// [`ChatHistorySource`] backed by the HTTP service.
#[derive(Debug, Clone)]
pub struct HttpChatHistory {
    base_url: String,
    client: reqwest::Client,
}

impl HttpChatHistory {
    pub fn new(config: HttpChatHistoryConfig) -> Result<Self, ChatHistoryError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ChatHistoryError::Transport {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the raw `result` for a group.
    pub async fn fetch_summary(
        &self,
        group_name: &str,
        user_id: &str,
    ) -> Result<ChatHistoryOutput, ChatHistoryError> {
        let url = format!("{}/chat-history", self.base_url);
        debug!(%url, group_name, user_id, "fetching chat history");
        let body = self
            .get_bytes(&url, &[("group_name", group_name), ("user_id", user_id)])
            .await?;
        let response: ChatHistoryResponse =
            serde_json::from_slice(&body).map_err(|e| ChatHistoryError::MalformedBody {
                reason: e.to_string(),
            })?;
        Ok(response.result)
    }

    /// Returns the `status` string reported by `GET {base}/health`.
    pub async fn health(&self) -> Result<String, ChatHistoryError> {
        let url = format!("{}/health", self.base_url);
        let body = self.get_bytes(&url, &[]).await?;
        let health: HealthBody =
            serde_json::from_slice(&body).map_err(|e| ChatHistoryError::MalformedBody {
                reason: e.to_string(),
            })?;
        Ok(health.status)
    }

    async fn get_bytes(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<u8>, ChatHistoryError> {
        let transport = |source| ChatHistoryError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%url, %status, "chat history service returned an error status");
            return Err(ChatHistoryError::Status { status });
        }
        let bytes = resp.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

impl ChatHistorySource for HttpChatHistory {
    fn fetch<'a>(
        &'a self,
        group_name: &'a str,
        user_id: &'a str,
    ) -> BoxFuture<'a, Result<ChatHistoryOutput, ChatHistoryError>> {
        Box::pin(self.fetch_summary(group_name, user_id))
    }
}
