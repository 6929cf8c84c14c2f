// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod attendance;
pub mod staff_api;

pub use attendance::{
    AttendanceService, ClockInResult, ClockOutResult, RegisterDefaults, RegisterResult, ScanStatus,
};
pub use staff_api::{AttendanceUpload, StaffApiClient, StaffIdentity, StaffSync, SyncError};
