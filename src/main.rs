// SPDX-License-Identifier: MIT

//! Attendance-Tracker API Server
//!
//! Backend for the NFC attendance terminals: resolves card scans, records
//! clock-in/out sessions in Firestore, and mirrors closed records to the
//! external staff management API.

use attendance_tracker::{
    config::Config,
    db::{AttendanceStore, FirestoreDb},
    services::{AttendanceService, StaffApiClient, StaffSync},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Attendance-Tracker API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");
    let store: Arc<dyn AttendanceStore> = Arc::new(db);

    // Initialize the staff API client if configured; sync is optional and
    // the local database stays authoritative without it.
    let sync: Option<Arc<dyn StaffSync>> = match config.staff_api() {
        Some((base_url, token)) => {
            tracing::info!(%base_url, "Staff API sync enabled");
            Some(Arc::new(StaffApiClient::new(
                base_url.to_string(),
                token.to_string(),
            )))
        }
        None => {
            tracing::warn!("STAFF_API_BASE_URL/STAFF_API_TOKEN not set, staff API sync disabled");
            None
        }
    };

    let attendance = AttendanceService::new(store, sync, config.fallback_school_id);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        attendance,
    });

    // Build router
    let app = attendance_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("attendance_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
