//! API client for communicating with the CYin REST backend.
//!
//! Every endpoint answers with a JSON envelope `{status, message, data}`.
//! This module turns that envelope, plus the HTTP status, into a single
//! `Result` per call.

use anyhow::{Context, Result};
use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest, SignUpRequest,
    StatusEvent, WorkLogEntry,
};

use super::error::server_message;
use super::ApiError;

// ============================================================================
// Endpoints
// ============================================================================

const SIGN_UP_PATH: &str = "/customers/signUp";
const LOGIN_PATH: &str = "/api/auth/login";
const EVENT_PATH: &str = "/api/event";
const WORK_PATH: &str = "/api/work";
const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";
const TEST_PATH: &str = "/api/auth/test";

// Messages used when the backend rejects a call without saying why
const SIGN_UP_FAILED: &str = "Sign up failed";
const LOGIN_FAILED: &str = "Login failed";
const LOG_EVENT_FAILED: &str = "Failed to log event";
const LOG_WORK_FAILED: &str = "Failed to log work";
const FORGOT_PASSWORD_FAILED: &str = "Forgot password failed";
const RESET_PASSWORD_FAILED: &str = "Reset password failed";

/// The `message`/`data` members of an accepted envelope; `status` was
/// already checked by `check_response`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct EventAck {
    status: String,
}

/// API client for the CYin backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for the given base URL.
    ///
    /// No request timeout is configured; a hung request waits for the
    /// transport to give up.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    /// An empty token is treated as no token.
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(test)]
    fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_headers(&self) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.token {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending without it"),
            }
        }
        headers
    }

    /// Send a request and return the status with the raw body.
    /// Only transport failures are errors here.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        authenticated: bool,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = self.url(path);
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");

        if authenticated {
            request = request.headers(self.auth_headers());
        }
        if let Some(body) = body {
            // Sets Content-Type: application/json
            request = request.json(body);
        }

        debug!(%method, url = %url, authenticated, "Sending request");
        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Network error");
            ApiError::NetworkError(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        debug!(url = %url, %status, "Response received");
        Ok((status, text))
    }

    /// POST a JSON body and normalize the envelope.
    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        authenticated: bool,
        fallback: &str,
    ) -> Result<Value, ApiError> {
        let (status, text) = self.send(Method::POST, path, Some(body), authenticated).await?;
        Self::check_response(status, &text, fallback)
    }

    /// Check a response against the envelope contract, returning the parsed body.
    ///
    /// Non-2xx fails with the body's message (or `fallback`). A 2xx body must be
    /// JSON with `status: true`; otherwise the call fails the same way.
    fn check_response(status: StatusCode, body: &str, fallback: &str) -> Result<Value, ApiError> {
        if !status.is_success() {
            return Err(ApiError::from_status(status, body, fallback));
        }

        let value: Value = serde_json::from_str(body).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "{} ({}): {}",
                fallback,
                e,
                ApiError::truncate_body(body)
            ))
        })?;

        let accepted = value.get("status").and_then(Value::as_bool).unwrap_or(false);
        if !accepted {
            let message = server_message(&value).unwrap_or_else(|| fallback.to_string());
            debug!(reason = %message, "Request refused by backend");
            return Err(ApiError::Rejected(message));
        }

        Ok(value)
    }

    /// Decode the `data` member of an accepted envelope
    fn data<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, ApiError> {
        let envelope: Envelope<T> = serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed {} response: {}", what, e)))?;
        if let Some(note) = envelope.message.as_deref() {
            debug!(note, "Backend accepted {}", what);
        }
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidResponse(format!("Missing data in {} response", what)))
    }

    // ===== Account =====

    /// Register a new employee account. Returns the backend's `data` payload as-is.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Value, ApiError> {
        let value = self.post(SIGN_UP_PATH, request, false, SIGN_UP_FAILED).await?;
        Ok(value.get("data").cloned().unwrap_or(Value::Null))
    }

    /// Log in with email and password.
    ///
    /// The caller is responsible for storing the returned token in the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let value = self.post(LOGIN_PATH, &request, false, LOGIN_FAILED).await?;
        Self::data(value, "login")
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Value, ApiError> {
        let request = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post(FORGOT_PASSWORD_PATH, &request, false, FORGOT_PASSWORD_FAILED)
            .await
    }

    /// Complete a password reset with the one-time token from the reset link
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Value, ApiError> {
        let request = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post(RESET_PASSWORD_PATH, &request, false, RESET_PASSWORD_FAILED)
            .await
    }

    // ===== Work Logging =====

    /// Report a status event. Returns the status string the backend recorded.
    pub async fn log_event(&self, event: &StatusEvent) -> Result<String, ApiError> {
        let value = self.post(EVENT_PATH, event, true, LOG_EVENT_FAILED).await?;
        let ack: EventAck = Self::data(value, "event")?;
        Ok(ack.status)
    }

    pub async fn log_work(&self, entry: &WorkLogEntry) -> Result<WorkLogEntry, ApiError> {
        let value = self.post(WORK_PATH, entry, true, LOG_WORK_FAILED).await?;
        Self::data(value, "work")
    }

    // ===== Health =====

    /// Check whether the backend is reachable. Never fails.
    pub async fn test_connection(&self) -> bool {
        match self.send::<()>(Method::GET, TEST_PATH, None, false).await {
            Ok((status, _)) => status.is_success(),
            Err(e) => {
                debug!(error = %e, "Connection test failed");
                false
            }
        }
    }
}
