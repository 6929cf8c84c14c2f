// SPDX-License-Identifier: MIT

//! Attendance-Tracker: card-scan attendance backend for school terminals.
//!
//! This crate provides the backend API behind the NFC attendance terminals:
//! a card scan resolves the staff member's current state, clock-in/out
//! records are stored in Firestore, and closed records are mirrored
//! best-effort to the external staff management API.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod test_utils;
pub mod time_utils;

use config::Config;
use services::AttendanceService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub attendance: AttendanceService,
}
