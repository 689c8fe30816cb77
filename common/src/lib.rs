// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod timestamp;

/// A task as returned by the backend.
///
/// The client never edits a task in place: the whole list is fetched again
/// after every change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,

    pub title: String,

    pub completed: bool,

    // Present in backend responses, but nothing on this side relies on it.
    #[serde(default)]
    pub user_id: Option<i64>,

    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_completion_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<CurrentUser>,
}

/// The public profile of the authenticated user (`GET /auth/me`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub nickname: String,
}

/// Body of `POST /tasks/`.
///
/// `estimated_completion_time` is left out of the JSON entirely when absent;
/// the backend must never see an empty string there.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateTaskPayload {
    pub title: String,

    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

/// Body of `POST /auth/request-otp`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OtpRequest {
    pub email: String,
}

/// Body of `POST /auth/login-otp`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OtpLogin {
    pub email: String,
    pub code: String,
}

/// Response of `POST /auth/request-otp`.
///
/// Every field is optional. A backend running in development mode echoes the
/// generated code in `otp`; a production one only confirms the request.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OtpIssued {
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub user: Option<CurrentUser>,
    #[serde(default)]
    pub user_created: Option<bool>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Response of `POST /auth/login-otp`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
