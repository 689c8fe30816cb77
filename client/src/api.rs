// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
//! Thin HTTP client for the task backend.
//!
//! Every method is a single request/response round trip. There is no retry
//! and no caching; timeouts are whatever the underlying `reqwest` client was
//! built with.
use common::{AccessToken, CreateTaskPayload, CurrentUser, OtpIssued, OtpLogin, OtpRequest, Task};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response (connection refused,
    /// timeout, undecodable body, ...).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Request failed with status code {}{}", .status.as_u16(), detail_suffix(.detail))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
}

impl ApiError {
    /// True when the backend refused the credential itself.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Status {
                status: StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN,
                ..
            }
        )
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /tasks/`
    pub async fn list_tasks(&self, token: &str) -> Result<Vec<Task>, ApiError> {
        send_json(self.http.get(self.url("/tasks/")).bearer_auth(token)).await
    }

    /// `POST /tasks/`
    pub async fn create_task(
        &self,
        token: &str,
        payload: &CreateTaskPayload,
    ) -> Result<Task, ApiError> {
        send_json(
            self.http
                .post(self.url("/tasks/"))
                .bearer_auth(token)
                .json(payload),
        )
        .await
    }

    /// `GET /auth/me`
    pub async fn current_user(&self, token: &str) -> Result<CurrentUser, ApiError> {
        send_json(self.http.get(self.url("/auth/me")).bearer_auth(token)).await
    }

    /// `POST /auth/request-otp`
    pub async fn request_otp(&self, email: &str) -> Result<OtpIssued, ApiError> {
        let body = OtpRequest {
            email: email.to_string(),
        };
        send_json(self.http.post(self.url("/auth/request-otp")).json(&body)).await
    }

    /// `POST /auth/login-otp`
    pub async fn login_otp(&self, email: &str, code: &str) -> Result<AccessToken, ApiError> {
        let body = OtpLogin {
            email: email.to_string(),
            code: code.to_string(),
        };
        send_json(self.http.post(self.url("/auth/login-otp")).json(&body)).await
    }
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} -> {}", response.url().path(), status);

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status,
        detail: error_detail(&body),
    })
}

/// Pulls a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, a validation list
/// `{"detail": [{"msg": "..."}]}` and `{"error": "..."}`.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) => return Some(detail.clone()),
        Some(serde_json::Value::Array(items)) => {
            if let Some(msg) = items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(|msg| msg.as_str())
            {
                return Some(msg.to_string());
            }
        }
        _ => {}
    }

    value
        .get("error")
        .and_then(|error| error.as_str())
        .map(str::to_string)
}
