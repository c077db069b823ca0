//! # HTTP Backend Adapter
//!
//! One `reqwest` client implementing every outbound backend port.
//!
//! | Port | Method | Path |
//! |------|--------|------|
//! | `TokenBackend::fetch_token` | GET | `/api/collect/verify/{token}` |
//! | `TokenBackend::register_device` | POST | `/api/collect/register-device/{token}` |
//! | `TokenBackend::fetch_form` | GET | `/api/collect/forms/{token}/{form_id}` |
//! | `SessionBackend::fetch_session` | GET | `/api/cawi/sessions/{id}` |
//! | `SessionBackend::fetch_session_by_token` | GET | `/api/cawi/sessions/by-token/{token}` |
//! | `SessionBackend::save_session` | POST | `/api/cawi/sessions` |
//! | `SubmissionBackend::submit` | POST | `/api/collect/submit/{token}` or `/api/submissions/` |
//!
//! Tokens and ids are percent-encoded as single path segments.

use async_trait::async_trait;
use fc_02_token_verifier::{DeviceRegistration, TokenBackend};
use fc_04_autosave::{RemoteSession, SessionBackend, SessionSaveRequest};
use fc_05_submission_router::SubmissionBackend;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{BackendError, DeviceIdentity, FormDefinition, Submission, TokenRecord};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors building the backend client.
#[derive(Debug, Error)]
pub enum HttpSetupError {
    /// Base URL unparseable or unable to carry a path.
    #[error("Invalid backend URL {url}: {reason}")]
    InvalidUrl {
        /// URL as configured.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// TLS or client configuration failed.
    #[error(transparent)]
    Client(#[from] reqwest::Error),
}

#[derive(Serialize)]
struct RegisterDeviceBody<'a> {
    device_info: &'a DeviceIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pin: Option<&'a str>,
}

/// Backend client for the collection API.
pub struct HttpCollectBackend {
    client: Client,
    base_url: Url,
}

impl HttpCollectBackend {
    /// Client for `base_url`. `timeout` caps each request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpSetupError> {
        let invalid = |reason: String| HttpSetupError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("cannot carry a path".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `segments` appended to the base path, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Backend rejected request");
        Err(BackendError::from_status(
            status.as_u16(),
            error_message(&body, status),
        ))
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, BackendError> {
        let response = self.send(self.client.get(self.url(path))).await?;
        decode(response).await
    }

    async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.client.post(self.url(path)).json(body))
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Transport(err.to_string())
    }
}

/// Human-readable message from an error body: `detail`, then `message`,
/// then the raw text, then the status reason.
pub(crate) fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
    }
    let text = body.trim();
    if !text.is_empty() && !text.starts_with('{') {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[async_trait]
impl TokenBackend for HttpCollectBackend {
    async fn fetch_token(&self, token: &str) -> Result<TokenRecord, BackendError> {
        self.get(&["api", "collect", "verify", token]).await
    }

    async fn register_device(
        &self,
        token: &str,
        device: &DeviceIdentity,
        pin: Option<&str>,
    ) -> Result<DeviceRegistration, BackendError> {
        let body = RegisterDeviceBody {
            device_info: device,
            pin,
        };
        self.post(&["api", "collect", "register-device", token], &body)
            .await
    }

    async fn fetch_form(
        &self,
        token: &str,
        form_id: &str,
    ) -> Result<FormDefinition, BackendError> {
        self.get(&["api", "collect", "forms", token, form_id]).await
    }
}

#[async_trait]
impl SessionBackend for HttpCollectBackend {
    async fn fetch_session(&self, session_id: &str) -> Result<RemoteSession, BackendError> {
        self.get(&["api", "cawi", "sessions", session_id]).await
    }

    async fn fetch_session_by_token(&self, token: &str) -> Result<RemoteSession, BackendError> {
        self.get(&["api", "cawi", "sessions", "by-token", token])
            .await
    }

    async fn save_session(
        &self,
        request: &SessionSaveRequest,
    ) -> Result<RemoteSession, BackendError> {
        self.post(&["api", "cawi", "sessions"], request).await
    }
}

#[async_trait]
impl SubmissionBackend for HttpCollectBackend {
    async fn submit(
        &self,
        token: Option<&str>,
        submission: &Submission,
    ) -> Result<(), BackendError> {
        let url = match token {
            Some(token) => self.url(&["api", "collect", "submit", token]),
            None => self.url(&["api", "submissions", ""]),
        };
        self.send(self.client.post(url).json(submission))
            .await
            .map(|_| ())
    }
}
