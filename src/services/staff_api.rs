// SPDX-License-Identifier: MIT

//! Staff management API client.
//!
//! Handles:
//! - Credential authentication during card registration
//! - Best-effort attendance record uploads at clock-in/out
//!
//! Sync failures are typed (`SyncError`) and surfaced to the caller as a
//! flag; they must never fail the local attendance operation.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One attempt, no retry; a hung staff API must not block a clock-in/out.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Staff API failure reasons.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("staff API rejected the credentials")]
    Unauthorized,

    #[error("staff API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("staff API request failed: {0}")]
    Transport(String),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Unauthorized => AppError::ExternalAuthFailed,
            other => AppError::ExternalApi(other.to_string()),
        }
    }
}

/// Authenticated staff identity returned by the staff API login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffIdentity {
    pub id: i64,
    pub email: String,
    pub last_name: String,
    pub first_name: String,
}

impl StaffIdentity {
    /// Canonical display name, family name first.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}

/// Flat attendance record payload expected by the staff API.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceUpload {
    pub staff_id: i64,
    /// Calendar work day, YYYY-MM-DD
    pub work_day: String,
    pub school_id: i64,
    /// Transport cost in yen
    pub commuting_costs: u32,
    /// Non-lesson working hours
    pub another_time: f64,
    pub total_lesson: u32,
    pub lesson_ids: Vec<i64>,
    pub total_training_lesson: u32,
    pub deduction_time: f64,
    pub note: String,
}

/// Port for the staff management system.
///
/// `StaffApiClient` implements it for production and
/// `test_utils::MockStaffSync` for tests.
#[async_trait::async_trait]
pub trait StaffSync: Send + Sync {
    /// Verify credentials and return the staff identity.
    async fn authenticate(&self, email: &str, password: &str) -> Result<StaffIdentity, SyncError>;

    /// Submit one attendance record, keyed by (staff, work day) upstream.
    async fn create_attendance(&self, upload: &AttendanceUpload) -> Result<(), SyncError>;
}

/// Staff management API client.
#[derive(Clone)]
pub struct StaffApiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl StaffApiClient {
    /// Create a new client with a bearer token and bounded request timeout.
    pub fn new(base_url: String, api_token: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build staff API HTTP client");

        Self {
            http,
            base_url,
            api_token,
        }
    }

    /// POST with JSON body and JSON response.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SyncError>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await
            .map_err(|e| SyncError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(SyncError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "Staff API request rejected");
            return Err(SyncError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Transport(format!("invalid response body: {}", e)))
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The attendances endpoint wraps the record in a JSON object; we only need
/// to know the call succeeded.
#[derive(Deserialize)]
struct IgnoredResponse {}

#[async_trait::async_trait]
impl StaffSync for StaffApiClient {
    async fn authenticate(&self, email: &str, password: &str) -> Result<StaffIdentity, SyncError> {
        self.post_json("/auth/login", &LoginRequest { email, password })
            .await
    }

    async fn create_attendance(&self, upload: &AttendanceUpload) -> Result<(), SyncError> {
        let _: IgnoredResponse = self.post_json("/attendances", upload).await?;
        Ok(())
    }
}
