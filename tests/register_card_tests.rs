// SPDX-License-Identifier: MIT

//! Card registration tests: staff API auth and the three-level upsert.

use attendance_tracker::error::AppError;
use attendance_tracker::models::TransportPreset;
use attendance_tracker::services::attendance::RegisterDefaults;
use attendance_tracker::services::{StaffIdentity, StaffSync};
use attendance_tracker::test_utils::{test_user, MockStaffSync};
use std::sync::Arc;

mod common;

fn succeeding_sync() -> Arc<dyn StaffSync> {
    Arc::new(MockStaffSync::succeeding(common::test_identity()))
}

#[tokio::test]
async fn test_register_creates_user_from_identity() {
    let (service, store) = common::test_service(Some(succeeding_sync()));

    let result = service
        .register_card(
            "card-new",
            "taro@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap();

    assert!(result.created);
    assert_eq!(result.display_name, "山田 太郎");
    assert_eq!(result.external_staff_id, 42);

    let user = store.all_users().remove(0);
    assert_eq!(user.card_token, "card-new");
    assert_eq!(user.email.as_deref(), Some("taro@example.com"));
    assert_eq!(user.external_staff_id, Some(42));
    assert_eq!(user.default_transport_cost, 0);
}

#[tokio::test]
async fn test_register_rejected_credentials() {
    let (service, store) = common::test_service(Some(succeeding_sync()));

    let err = service
        .register_card(
            "card-new",
            "wrong@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ExternalAuthFailed));
    assert_eq!(store.user_count(), 0);
}

#[tokio::test]
async fn test_register_without_sync_configured() {
    let (service, _store) = common::test_service(None);

    let err = service
        .register_card(
            "card-new",
            "taro@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_register_twice_updates_same_row_by_staff_id() {
    // Same staff identity, new physical card: must update the existing row
    // rather than duplicate the person.
    let (service, store) = common::test_service(Some(succeeding_sync()));

    let first = service
        .register_card(
            "card-old",
            "taro@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap();

    let second = service
        .register_card(
            "card-replacement",
            "taro@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap();

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(store.user_count(), 1);

    let user = store.all_users().remove(0);
    assert_eq!(user.card_token, "card-replacement");
}

#[tokio::test]
async fn test_register_falls_back_to_email_match() {
    // Pre-existing row with the right email but no staff id yet (created
    // under an older registration path).
    let (service, store) = common::test_service(Some(succeeding_sync()));
    let mut legacy = test_user("legacy-id", "card-legacy");
    legacy.external_staff_id = None;
    store.add_user(legacy);

    let result = service
        .register_card(
            "card-new",
            "taro@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap();

    assert!(!result.created);
    assert_eq!(result.user_id, "legacy-id");
    assert_eq!(store.user_count(), 1);

    let user = store.all_users().remove(0);
    assert_eq!(user.external_staff_id, Some(42));
    assert_eq!(user.card_token, "card-new");
}

#[tokio::test]
async fn test_register_falls_back_to_card_token_match() {
    // Row holds the same physical card but stale identity keys; re-keying
    // must update it instead of colliding on the card token.
    let sync: Arc<dyn StaffSync> = Arc::new(MockStaffSync::succeeding(StaffIdentity {
        id: 99,
        email: "hanako@example.com".to_string(),
        last_name: "佐藤".to_string(),
        first_name: "花子".to_string(),
    }));
    let (service, store) = common::test_service(Some(sync));

    let mut stale = test_user("stale-id", "card-shared");
    stale.external_staff_id = None;
    stale.email = Some("old-address@example.com".to_string());
    store.add_user(stale);

    let result = service
        .register_card(
            "card-shared",
            "hanako@example.com",
            "password123",
            RegisterDefaults::default(),
        )
        .await
        .unwrap();

    assert!(!result.created);
    assert_eq!(result.user_id, "stale-id");
    assert_eq!(store.user_count(), 1);

    let user = store.all_users().remove(0);
    assert_eq!(user.external_staff_id, Some(99));
    assert_eq!(user.display_name, "佐藤 花子");
    assert_eq!(user.email.as_deref(), Some("hanako@example.com"));
}

#[tokio::test]
async fn test_register_applies_supplied_defaults() {
    let (service, store) = common::test_service(Some(succeeding_sync()));

    service
        .register_card(
            "card-new",
            "taro@example.com",
            "password123",
            RegisterDefaults {
                default_transport_cost: Some(620),
                default_school_id: Some(5),
                transport_presets: Some(vec![TransportPreset {
                    label: "Bicycle".to_string(),
                    amount: 0,
                }]),
            },
        )
        .await
        .unwrap();

    let user = store.all_users().remove(0);
    assert_eq!(user.default_transport_cost, 620);
    assert_eq!(user.default_school_id, Some(5));
    assert_eq!(user.transport_presets.len(), 1);
    assert_eq!(user.transport_presets[0].label, "Bicycle");
}
