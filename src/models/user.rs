// SPDX-License-Identifier: MIT

//! User model for storage and API.

use serde::{Deserialize, Serialize};

/// A named transport-cost preset shown on the clock-out screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportPreset {
    /// Label shown on the terminal (e.g. "Bus + Train")
    pub label: String,
    /// Amount in yen
    pub amount: u32,
}

/// Staff member profile stored in Firestore.
///
/// Keyed 1:1 to a physical NFC card via `card_token`. The optional
/// `external_staff_id` links the row to the staff management API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// UUID, also used as document ID
    pub id: String,
    /// Opaque token read from the NFC card
    pub card_token: String,
    /// Name shown on the terminal
    pub display_name: String,
    /// Staff API login email (may be None for locally-created users)
    pub email: Option<String>,
    /// Transport cost pre-filled at clock-out, in yen
    pub default_transport_cost: u32,
    /// Ordered cost presets for the clock-out screen
    pub transport_presets: Vec<TransportPreset>,
    /// Default work-site for staff API uploads
    pub default_school_id: Option<i64>,
    /// Staff management API primary key (positive), if registered there
    pub external_staff_id: Option<i64>,
    /// When the user was first registered
    pub created_at: String,
    /// Last profile update
    pub updated_at: String,
}
