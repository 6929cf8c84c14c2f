// SPDX-License-Identifier: MIT

//! In-memory collaborator implementations for tests.
//!
//! `MemoryStore` keeps rows in insertion order so `recent_sessions` returns
//! creation-descending history, matching the Firestore query ordering.

use crate::db::AttendanceStore;
use crate::error::AppError;
use crate::models::{AttendanceSession, User};
use crate::services::staff_api::{AttendanceUpload, StaffIdentity, StaffSync, SyncError};
use std::sync::Mutex;

/// Vec-backed `AttendanceStore`.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    sessions: Mutex<Vec<AttendanceSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user row directly.
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    /// Seed a session row directly (appended as the newest row).
    pub fn add_session(&self, session: AttendanceSession) {
        self.sessions.lock().unwrap().push(session);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Snapshot of all sessions, insertion order.
    pub fn all_sessions(&self) -> Vec<AttendanceSession> {
        self.sessions.lock().unwrap().clone()
    }

    /// Snapshot of all users, insertion order.
    pub fn all_users(&self) -> Vec<User> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl AttendanceStore for MemoryStore {
    async fn find_user_by_card_token(&self, card_token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.card_token == card_token)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_user_by_staff_id(&self, staff_id: i64) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.external_staff_id == Some(staff_id))
            .cloned())
    }

    async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(())
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<AttendanceSession>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .cloned())
    }

    async fn insert_session(&self, session: &AttendanceSession) -> Result<(), AppError> {
        self.sessions.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn update_session(&self, session: &AttendanceSession) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => {
                *existing = session.clone();
                Ok(())
            }
            None => Err(AppError::Database(format!(
                "session {} not found",
                session.id
            ))),
        }
    }

    async fn recent_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceSession>, AppError> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .rev() // creation-descending
            .filter(|s| s.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// Configurable `StaffSync` double that records every upload.
pub struct MockStaffSync {
    fail_uploads: bool,
    identity: Option<StaffIdentity>,
    uploads: Mutex<Vec<AttendanceUpload>>,
}

impl MockStaffSync {
    /// Accepts uploads and authenticates as the given identity.
    pub fn succeeding(identity: StaffIdentity) -> Self {
        Self {
            fail_uploads: false,
            identity: Some(identity),
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every upload and every login.
    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            identity: None,
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn uploads(&self) -> Vec<AttendanceUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl StaffSync for MockStaffSync {
    async fn authenticate(&self, email: &str, _password: &str) -> Result<StaffIdentity, SyncError> {
        match &self.identity {
            Some(identity) if identity.email == email => Ok(identity.clone()),
            _ => Err(SyncError::Unauthorized),
        }
    }

    async fn create_attendance(&self, upload: &AttendanceUpload) -> Result<(), SyncError> {
        if self.fail_uploads {
            return Err(SyncError::Api {
                status: 422,
                body: "validation failed".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(upload.clone());
        Ok(())
    }
}

/// A user with sensible defaults for tests.
pub fn test_user(id: &str, card_token: &str) -> User {
    User {
        id: id.to_string(),
        card_token: card_token.to_string(),
        display_name: "山田 太郎".to_string(),
        email: Some("taro@example.com".to_string()),
        default_transport_cost: 500,
        transport_presets: vec![crate::models::TransportPreset {
            label: "Bus + Train".to_string(),
            amount: 500,
        }],
        default_school_id: Some(3),
        external_staff_id: Some(42),
        created_at: "2026-01-01T00:00:00Z".to_string(),
        updated_at: "2026-01-01T00:00:00Z".to_string(),
    }
}
