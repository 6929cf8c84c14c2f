// SPDX-License-Identifier: MIT

//! Attendance session model and the open-session predicate.

use serde::{Deserialize, Serialize};

/// One clock-in/clock-out cycle, stored in Firestore.
///
/// A session is "open" while its clock-out timestamp is logically absent.
/// Closure is terminal: the clock-out timestamp and the reported metrics
/// are set exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSession {
    /// UUID, also used as document ID
    pub id: String,
    /// Owning user's document ID
    pub user_id: String,
    /// Clock-in timestamp (RFC3339 UTC), immutable after creation
    pub clock_in_at: String,
    /// Clock-out timestamp (RFC3339 UTC); absent while the session is open.
    /// Legacy rows written by older clients may hold "" or "null" instead
    /// of a true null.
    pub clock_out_at: Option<String>,
    /// Transport cost actually incurred (yen), reported at clock-out
    pub transport_cost: Option<u32>,
    /// Number of classes taught, reported at clock-out
    pub class_count: Option<u32>,
    /// Whether closure was auto-submitted rather than user-confirmed
    pub is_auto_submit: Option<bool>,
}

impl AttendanceSession {
    /// Whether this session is still open.
    ///
    /// The clock-out marker is treated as absent if it is a true null, an
    /// empty/whitespace string, or the literal "null" in any case. Older
    /// insert paths were not consistent about which of these they wrote, so
    /// every open/closed check in the codebase must go through this
    /// predicate.
    pub fn is_open(&self) -> bool {
        match &self.clock_out_at {
            None => true,
            Some(raw) => {
                let marker = raw.trim();
                marker.is_empty() || marker.eq_ignore_ascii_case("null")
            }
        }
    }
}

/// Select the open session from a creation-descending history slice.
///
/// Returns the first (most recently created) open session. Under normal
/// operation at most one session is open per user; if a past race left a
/// duplicate, the newest one wins and the older duplicate stays orphaned
/// but harmless.
pub fn select_open_session(sessions: &[AttendanceSession]) -> Option<&AttendanceSession> {
    sessions.iter().find(|s| s.is_open())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, clock_out_at: Option<&str>) -> AttendanceSession {
        AttendanceSession {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            clock_in_at: "2026-08-30T09:00:00Z".to_string(),
            clock_out_at: clock_out_at.map(|s| s.to_string()),
            transport_cost: None,
            class_count: None,
            is_auto_submit: None,
        }
    }

    #[test]
    fn test_is_open_absent_encodings() {
        assert!(session("a", None).is_open());
        assert!(session("b", Some("")).is_open());
        assert!(session("c", Some("   ")).is_open());
        assert!(session("d", Some("null")).is_open());
        assert!(session("e", Some("NULL")).is_open());
        assert!(session("f", Some("Null")).is_open());
    }

    #[test]
    fn test_is_open_closed_timestamp() {
        assert!(!session("a", Some("2026-08-30T18:00:00Z")).is_open());
        // "nullish" but not the literal marker
        assert!(!session("b", Some("nul")).is_open());
        assert!(!session("c", Some("nullable")).is_open());
    }

    #[test]
    fn test_select_open_session_none_open() {
        let history = vec![
            session("a", Some("2026-08-30T18:00:00Z")),
            session("b", Some("2026-08-29T18:00:00Z")),
        ];
        assert!(select_open_session(&history).is_none());
        assert!(select_open_session(&[]).is_none());
    }

    #[test]
    fn test_select_open_session_newest_open_wins() {
        // History is creation-descending; a stale duplicate open session
        // further down must not shadow the newest open one.
        let history = vec![
            session("newest-open", None),
            session("stale-open", Some("null")),
            session("closed", Some("2026-08-28T18:00:00Z")),
        ];
        let open = select_open_session(&history).expect("should find open session");
        assert_eq!(open.id, "newest-open");
    }

    #[test]
    fn test_select_open_session_skips_closed_head() {
        let history = vec![
            session("closed", Some("2026-08-30T18:00:00Z")),
            session("legacy-open", Some("")),
        ];
        let open = select_open_session(&history).expect("should find open session");
        assert_eq!(open.id, "legacy-open");
    }
}
