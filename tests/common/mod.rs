// SPDX-License-Identifier: MIT

use attendance_tracker::config::Config;
use attendance_tracker::db::AttendanceStore;
use attendance_tracker::routes::create_router;
use attendance_tracker::services::{AttendanceService, StaffIdentity, StaffSync};
use attendance_tracker::test_utils::{MemoryStore, MockStaffSync};
use attendance_tracker::AppState;
use std::sync::Arc;

/// Identity the mock staff API authenticates.
#[allow(dead_code)]
pub fn test_identity() -> StaffIdentity {
    StaffIdentity {
        id: 42,
        email: "taro@example.com".to_string(),
        last_name: "山田".to_string(),
        first_name: "太郎".to_string(),
    }
}

/// Build an attendance service over an in-memory store.
#[allow(dead_code)]
pub fn test_service(
    sync: Option<Arc<dyn StaffSync>>,
) -> (AttendanceService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = AttendanceService::new(store.clone() as Arc<dyn AttendanceStore>, sync, 1);
    (service, store)
}

/// Create a test app over an in-memory store with a working mock sync.
/// Returns the router and the store for seeding/assertions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let sync: Arc<dyn StaffSync> = Arc::new(MockStaffSync::succeeding(test_identity()));
    let config = Config::test_default();

    let attendance = AttendanceService::new(
        store.clone() as Arc<dyn AttendanceStore>,
        Some(sync),
        config.fallback_school_id,
    );

    let state = Arc::new(AppState { config, attendance });

    (create_router(state), store)
}
