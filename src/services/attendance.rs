// SPDX-License-Identifier: MIT

//! Attendance state resolution and recording.
//!
//! This is the heart of the backend: given a card scan, decide whether the
//! terminal shows the clock-in or clock-out screen, and perform the two
//! state transitions. All open/closed decisions go through
//! `AttendanceSession::is_open` / `select_open_session`.

use crate::db::AttendanceStore;
use crate::error::AppError;
use crate::models::{select_open_session, AttendanceSession, TransportPreset, User};
use crate::services::staff_api::{AttendanceUpload, StaffSync};
use crate::time_utils::{format_utc_rfc3339, format_work_day};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// How many recent sessions to scan for an open one. At most one session
/// should be open anywhere in a user's history, so this is a cost bound on
/// a defensive scan, not a correctness requirement.
const SESSION_LOOKBACK: u32 = 50;

/// Terminal screen decision for a card scan.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status")]
pub enum ScanStatus {
    /// User is off the clock; show the clock-in screen.
    #[serde(rename = "ready_to_in")]
    ReadyToClockIn {
        user_name: String,
        /// Always zero: clock-in never pre-fills a cost.
        default_cost: u32,
        transport_presets: Vec<TransportPreset>,
    },
    /// User has an open session; show the clock-out/report screen.
    #[serde(rename = "ready_to_out")]
    ReadyToClockOut {
        user_name: String,
        default_cost: u32,
        transport_presets: Vec<TransportPreset>,
        session_id: String,
        clock_in_at: String,
    },
}

/// Result of a successful clock-in.
#[derive(Debug, Clone, Serialize)]
pub struct ClockInResult {
    pub session_id: String,
    pub clock_in_at: String,
    /// Whether the staff API mirror succeeded (false when sync is
    /// unconfigured or the attempt failed; the local record is
    /// authoritative either way).
    pub synced: bool,
}

/// Result of a successful clock-out.
#[derive(Debug, Clone, Serialize)]
pub struct ClockOutResult {
    pub session_id: String,
    pub clock_out_at: String,
    pub synced: bool,
}

/// Result of a card registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResult {
    pub user_id: String,
    pub display_name: String,
    pub external_staff_id: i64,
    /// False when an existing user row was updated instead.
    pub created: bool,
}

/// Optional attendance defaults supplied at registration.
#[derive(Debug, Clone, Default)]
pub struct RegisterDefaults {
    pub default_transport_cost: Option<u32>,
    pub default_school_id: Option<i64>,
    pub transport_presets: Option<Vec<TransportPreset>>,
}

/// Attendance service: resolver + recorder over injected collaborators.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    sync: Option<Arc<dyn StaffSync>>,
    fallback_school_id: i64,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        sync: Option<Arc<dyn StaffSync>>,
        fallback_school_id: i64,
    ) -> Self {
        Self {
            store,
            sync,
            fallback_school_id,
        }
    }

    /// Resolve a card scan to the screen the terminal should present.
    ///
    /// Read-only: safe to call repeatedly and concurrently.
    pub async fn resolve(&self, card_token: &str) -> Result<ScanStatus, AppError> {
        let user = self.require_user(card_token).await?;
        let history = self
            .store
            .recent_sessions(&user.id, SESSION_LOOKBACK)
            .await?;

        match select_open_session(&history) {
            Some(open) => Ok(ScanStatus::ReadyToClockOut {
                user_name: user.display_name,
                default_cost: user.default_transport_cost,
                transport_presets: user.transport_presets,
                session_id: open.id.clone(),
                clock_in_at: open.clock_in_at.clone(),
            }),
            None => Ok(ScanStatus::ReadyToClockIn {
                user_name: user.display_name,
                default_cost: 0,
                transport_presets: Vec::new(),
            }),
        }
    }

    /// Open a new attendance session.
    ///
    /// The no-open-session check and the insert are separate single-row
    /// operations; two concurrent clock-ins for the same user can both pass
    /// the check and leave two open sessions. Known limitation: the newest
    /// open session wins everywhere downstream, so the older duplicate ends
    /// up orphaned but harmless.
    pub async fn clock_in(&self, card_token: &str) -> Result<ClockInResult, AppError> {
        let user = self.require_user(card_token).await?;
        let history = self
            .store
            .recent_sessions(&user.id, SESSION_LOOKBACK)
            .await?;

        if select_open_session(&history).is_some() {
            return Err(AppError::AlreadyClockedIn);
        }

        let now = Utc::now();
        let session = AttendanceSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            clock_in_at: format_utc_rfc3339(now),
            clock_out_at: None,
            transport_cost: None,
            class_count: None,
            is_auto_submit: None,
        };
        self.store.insert_session(&session).await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %session.id,
            "Clock-in recorded"
        );

        let upload = self.build_upload(&user, user.default_transport_cost, 0, Vec::new());
        let synced = self.try_sync(&user, upload).await;

        Ok(ClockInResult {
            session_id: session.id,
            clock_in_at: session.clock_in_at,
            synced,
        })
    }

    /// Close the open attendance session with the reported metrics.
    pub async fn clock_out(
        &self,
        card_token: &str,
        transport_cost: i64,
        class_count: i64,
        is_auto_submit: bool,
        lesson_refs: Vec<i64>,
    ) -> Result<ClockOutResult, AppError> {
        let user = self.require_user(card_token).await?;
        let history = self
            .store
            .recent_sessions(&user.id, SESSION_LOOKBACK)
            .await?;

        let open = select_open_session(&history).ok_or(AppError::NoOpenSession)?;

        // Metrics are stored as u32; anything outside that range (negative
        // or oversized) is invalid, never wrapped.
        let transport_cost = u32::try_from(transport_cost).map_err(|_| {
            AppError::InvalidMetrics(format!(
                "transport_cost must be between 0 and {}, got {}",
                u32::MAX,
                transport_cost
            ))
        })?;
        let class_count = u32::try_from(class_count).map_err(|_| {
            AppError::InvalidMetrics(format!(
                "class_count must be between 0 and {}, got {}",
                u32::MAX,
                class_count
            ))
        })?;

        // Re-read the located session by id before writing. If a concurrent
        // closure raced in between the scan and here, surface the conflict
        // instead of silently double-closing.
        let current = self
            .store
            .get_session(&open.id)
            .await?
            .ok_or(AppError::NoOpenSession)?;
        if !current.is_open() {
            return Err(AppError::AlreadyClockedOut);
        }

        let closed = AttendanceSession {
            clock_out_at: Some(format_utc_rfc3339(Utc::now())),
            transport_cost: Some(transport_cost),
            class_count: Some(class_count),
            is_auto_submit: Some(is_auto_submit),
            ..current
        };
        self.store.update_session(&closed).await?;

        tracing::info!(
            user_id = %user.id,
            session_id = %closed.id,
            transport_cost,
            class_count,
            is_auto_submit,
            "Clock-out recorded"
        );

        let upload = self.build_upload(&user, transport_cost, class_count, lesson_refs);
        let synced = self.try_sync(&user, upload).await;

        Ok(ClockOutResult {
            session_id: closed.id,
            clock_out_at: closed.clock_out_at.unwrap_or_default(),
            synced,
        })
    }

    /// Register (or re-register) a card against a staff API identity.
    ///
    /// Upsert order: external staff id, then email, then card token. The
    /// same person may already have a row from an earlier registration
    /// attempt under a different key; the fallbacks turn what would be a
    /// duplicate into an update of the existing row.
    pub async fn register_card(
        &self,
        card_token: &str,
        email: &str,
        password: &str,
        defaults: RegisterDefaults,
    ) -> Result<RegisterResult, AppError> {
        let sync = self.sync.as_ref().ok_or_else(|| {
            AppError::BadRequest("staff API integration is not configured".to_string())
        })?;

        let identity = sync.authenticate(email, password).await?;
        let now = format_utc_rfc3339(Utc::now());

        let existing = match self.store.find_user_by_staff_id(identity.id).await? {
            Some(user) => Some(user),
            None => match self.store.find_user_by_email(&identity.email).await? {
                Some(user) => Some(user),
                None => self.store.find_user_by_card_token(card_token).await?,
            },
        };

        let created = existing.is_none();
        let mut user = existing.unwrap_or_else(|| User {
            id: uuid::Uuid::new_v4().to_string(),
            card_token: card_token.to_string(),
            display_name: String::new(),
            email: None,
            default_transport_cost: 0,
            transport_presets: Vec::new(),
            default_school_id: None,
            external_staff_id: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        });

        user.card_token = card_token.to_string();
        user.display_name = identity.display_name();
        user.email = Some(identity.email.clone());
        user.external_staff_id = Some(identity.id);
        user.updated_at = now;
        if let Some(cost) = defaults.default_transport_cost {
            user.default_transport_cost = cost;
        }
        if let Some(school_id) = defaults.default_school_id {
            user.default_school_id = Some(school_id);
        }
        if let Some(presets) = defaults.transport_presets {
            user.transport_presets = presets;
        }

        self.store.upsert_user(&user).await?;

        tracing::info!(
            user_id = %user.id,
            external_staff_id = identity.id,
            created,
            "Card registered"
        );

        Ok(RegisterResult {
            user_id: user.id,
            display_name: user.display_name,
            external_staff_id: identity.id,
            created,
        })
    }

    async fn require_user(&self, card_token: &str) -> Result<User, AppError> {
        self.store
            .find_user_by_card_token(card_token)
            .await?
            .ok_or(AppError::UnknownCard)
    }

    fn build_upload(
        &self,
        user: &User,
        transport_cost: u32,
        class_count: u32,
        lesson_refs: Vec<i64>,
    ) -> AttendanceUpload {
        AttendanceUpload {
            staff_id: user.external_staff_id.unwrap_or_default(),
            work_day: format_work_day(Utc::now()),
            school_id: user.default_school_id.unwrap_or(self.fallback_school_id),
            commuting_costs: transport_cost,
            another_time: 0.0,
            total_lesson: class_count,
            lesson_ids: lesson_refs,
            total_training_lesson: 0,
            deduction_time: 0.0,
            note: String::new(),
        }
    }

    /// Best-effort staff API upload. Never fails the caller: returns true
    /// on success, false when sync is unconfigured, the user has no staff
    /// id, or the attempt failed.
    async fn try_sync(&self, user: &User, upload: AttendanceUpload) -> bool {
        let Some(sync) = self.sync.as_ref() else {
            return false;
        };
        let Some(staff_id) = user.external_staff_id else {
            tracing::debug!(user_id = %user.id, "No external staff id, skipping sync");
            return false;
        };

        match sync.create_attendance(&upload).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, staff_id, "Staff API sync succeeded");
                true
            }
            Err(err) => {
                // The local record is authoritative; record the failure for
                // later reconciliation and move on.
                tracing::warn!(
                    user_id = %user.id,
                    staff_id,
                    error = %err,
                    "Staff API sync failed"
                );
                false
            }
        }
    }
}
