use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use super::dto::StatusResponse;
use crate::utils::error::AppError;

/// Review API call timeout (seconds).
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Status fetch interface.
///
/// Abstracts the review API call so tests can substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatusApi: Send + Sync {
    /// Fetches homework statuses changed since `from_date` (epoch seconds).
    async fn fetch_statuses(&self, from_date: i64) -> Result<StatusResponse, AppError>;
}

/// Arc-wrapped StatusApi (Clone support).
pub type SharedStatusApi = Arc<dyn StatusApi>;

/// HTTP client for the Praktikum homework review API.
#[derive(Debug, Clone)]
pub struct PraktikumClient {
    api_url: String,
    token: String,
    client: Client,
}

impl PraktikumClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            client: Client::new(),
        }
    }

    /// Checks the decoded body for error markers.
    ///
    /// The API signals some failures inside a 200 body (`error` object or
    /// `code` string) rather than through the HTTP status.
    fn ensure_ok(response: StatusResponse) -> Result<StatusResponse, AppError> {
        if response.error.is_some() || response.code.is_some() {
            let code = response.code.unwrap_or_else(|| "unknown".to_string());
            let message = response
                .message
                .or_else(|| response.error.map(|e| e.to_string()))
                .unwrap_or_default();
            return Err(AppError::Api { code, message });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl StatusApi for PraktikumClient {
    async fn fetch_statuses(&self, from_date: i64) -> Result<StatusResponse, AppError> {
        tracing::debug!(from_date, "Requesting homework statuses");

        let request = self
            .client
            .get(&self.api_url)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send();

        let response = tokio::time::timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS), request)
            .await
            .map_err(|_| AppError::Transport("request timed out".to_string()))?
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| AppError::JsonParseFailed(e.to_string()))?;

        Self::ensure_ok(body)
    }
}
