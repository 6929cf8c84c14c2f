// SPDX-License-Identifier: MIT

//! Database layer: storage port and the Firestore implementation.

pub mod firestore;

pub use firestore::FirestoreDb;

use crate::error::AppError;
use crate::models::{AttendanceSession, User};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const SESSIONS: &str = "attendance_sessions";
}

/// Port for attendance persistence.
///
/// The service layer only sees this trait; `FirestoreDb` implements it for
/// production and `test_utils::MemoryStore` for tests. Each method is an
/// independent single-row operation; no transaction primitive is assumed.
#[async_trait::async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_user_by_card_token(&self, card_token: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_user_by_staff_id(&self, staff_id: i64) -> Result<Option<User>, AppError>;

    /// Create or update a user, keyed by `user.id`.
    async fn upsert_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_session(&self, session_id: &str) -> Result<Option<AttendanceSession>, AppError>;

    /// Insert a new session, keyed by `session.id`.
    async fn insert_session(&self, session: &AttendanceSession) -> Result<(), AppError>;

    /// Overwrite an existing session, keyed by `session.id`.
    async fn update_session(&self, session: &AttendanceSession) -> Result<(), AppError>;

    /// Most recent sessions for a user, creation-descending, at most `limit`.
    async fn recent_sessions(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<AttendanceSession>, AppError>;
}
