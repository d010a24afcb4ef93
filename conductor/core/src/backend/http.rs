//! HTTP Backend Implementation
//!
//! [`ChatBackend`] over the backend's JSON/multipart REST API using
//! `reqwest`. Every request inherits the client-wide timeout from
//! [`BackendConfig`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;

use super::error::BackendError;
use super::reply::ReplyBody;
use super::traits::{BackendConfig, ChatBackend, ConversationRequest, RemoteStatus, UploadFile};

/// Response envelope shared by `/conversation` and `/status`
#[derive(Debug, Deserialize)]
struct MessageEnvelope {
    #[serde(default)]
    message: Value,
}

/// HTTP backend client
#[derive(Clone)]
pub struct HttpBackend {
    /// Base URL, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a new HTTP backend
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`BackendError::Status`]
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode_envelope(response: reqwest::Response) -> Result<Value, BackendError> {
        let envelope: MessageEnvelope = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(envelope.message)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(&self.base_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    async fn converse(&self, request: &ConversationRequest) -> Result<ReplyBody, BackendError> {
        tracing::debug!(
            mode = %request.mode,
            history = request.history.len(),
            "Sending conversation request"
        );

        let response = self
            .http_client
            .post(self.url("conversation"))
            .json(request)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let message = Self::decode_envelope(response).await?;

        Ok(ReplyBody::from_value(message))
    }

    async fn upload(&self, file: UploadFile) -> Result<(), BackendError> {
        let UploadFile {
            file_name,
            mime,
            bytes,
        } = file;
        tracing::debug!(file = %file_name, bytes = bytes.len(), "Uploading document");

        let part = Part::bytes(bytes).file_name(file_name).mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await?;
        Self::ensure_success(response).await?;

        Ok(())
    }

    async fn status(&self) -> Result<RemoteStatus, BackendError> {
        let response = self.http_client.post(self.url("status")).send().await?;
        let response = Self::ensure_success(response).await?;
        let message = Self::decode_envelope(response).await?;

        Ok(match message {
            Value::String(s) => RemoteStatus::from_message(&s),
            other => RemoteStatus::Other(other.to_string()),
        })
    }

    async fn reset_status(&self) -> Result<(), BackendError> {
        let response = self.http_client.get(self.url("reset_status")).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}
