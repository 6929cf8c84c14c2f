// SPDX-License-Identifier: MIT

//! Attendance terminal routes: scan, clock-in, clock-out, register-card.

use crate::error::{AppError, Result};
use crate::models::TransportPreset;
use crate::services::attendance::RegisterDefaults;
use crate::services::{ClockInResult, ClockOutResult, RegisterResult, ScanStatus};
use crate::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Terminal-facing routes. Terminals live on a trusted network; there is no
/// per-request authentication on this surface.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/scan", post(scan))
        .route("/api/clock-in", post(clock_in))
        .route("/api/clock-out", post(clock_out))
        .route("/api/register-card", post(register_card))
}

fn validate<T: Validate>(payload: &T) -> Result<()> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Scan ────────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct ScanRequest {
    #[validate(length(min = 1, message = "card_token must not be empty"))]
    card_token: String,
}

/// Resolve a card scan to the next terminal screen.
async fn scan(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ScanStatus>> {
    validate(&payload)?;
    let status = state.attendance.resolve(&payload.card_token).await?;
    Ok(Json(status))
}

// ─── Clock-in / Clock-out ────────────────────────────────────

#[derive(Deserialize, Validate)]
struct ClockInRequest {
    #[validate(length(min = 1, message = "card_token must not be empty"))]
    card_token: String,
}

async fn clock_in(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClockInRequest>,
) -> Result<Json<ClockInResult>> {
    validate(&payload)?;
    let result = state.attendance.clock_in(&payload.card_token).await?;
    Ok(Json(result))
}

#[derive(Deserialize, Validate)]
struct ClockOutRequest {
    #[validate(length(min = 1, message = "card_token must not be empty"))]
    card_token: String,
    /// Deserialized as signed so that negative values reach the
    /// InvalidMetrics check instead of failing JSON parsing.
    transport_cost: i64,
    class_count: i64,
    #[serde(default)]
    is_auto_submit: bool,
    /// Staff API lesson ids covered by this session
    #[serde(default)]
    lesson_refs: Vec<i64>,
}

async fn clock_out(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClockOutRequest>,
) -> Result<Json<ClockOutResult>> {
    validate(&payload)?;
    let result = state
        .attendance
        .clock_out(
            &payload.card_token,
            payload.transport_cost,
            payload.class_count,
            payload.is_auto_submit,
            payload.lesson_refs,
        )
        .await?;
    Ok(Json(result))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Deserialize, Default)]
struct RegisterDefaultsRequest {
    default_transport_cost: Option<u32>,
    default_school_id: Option<i64>,
    transport_presets: Option<Vec<TransportPreset>>,
}

#[derive(Deserialize, Validate)]
struct RegisterCardRequest {
    #[validate(length(min = 1, message = "card_token must not be empty"))]
    card_token: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    password: String,
    #[serde(default)]
    defaults: Option<RegisterDefaultsRequest>,
}

/// Register a card: authenticate against the staff API, then upsert the
/// user row. Unrecognized request fields are dropped by serde.
async fn register_card(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterCardRequest>,
) -> Result<Json<RegisterResult>> {
    validate(&payload)?;

    let defaults = payload
        .defaults
        .map(|d| RegisterDefaults {
            default_transport_cost: d.default_transport_cost,
            default_school_id: d.default_school_id,
            transport_presets: d.transport_presets,
        })
        .unwrap_or_default();

    let result = state
        .attendance
        .register_card(
            &payload.card_token,
            &payload.email,
            &payload.password,
            defaults,
        )
        .await?;
    Ok(Json(result))
}
