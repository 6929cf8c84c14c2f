// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod session;
pub mod user;

pub use session::{select_open_session, AttendanceSession};
pub use user::{TransportPreset, User};
