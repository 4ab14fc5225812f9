//! Attendance records.
//!
//! An [`Attendance`] is unique per (session, person). Writes go through an
//! [`AttendanceDraft`], which the store upserts on that key.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Whether the person showed up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Attended.
    #[default]
    Present,
    /// Did not attend.
    Absent,
    /// Did not attend, with a justification.
    Excused,
}

/// A stored attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    /// Unique identifier for the attendance.
    pub id: String,
    /// The session attended.
    pub session_id: String,
    /// The attendee.
    pub person_id: String,
    /// Subscription the attendance is billed against.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Exchange agreement covering the attendance.
    #[serde(default)]
    pub agreement_id: Option<String>,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
    /// When the row was first registered.
    pub registered_at: DateTime<Utc>,
}

impl Attendance {
    /// Returns true if an exchange agreement covers this attendance.
    pub fn is_agreement_covered(&self) -> bool {
        self.agreement_id.is_some()
    }
}

/// The writable fields of an attendance, keyed by (session, person).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceDraft {
    /// The session attended.
    pub session_id: String,
    /// The attendee.
    pub person_id: String,
    /// Subscription to bill against.
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Exchange agreement covering the attendance.
    #[serde(default)]
    pub agreement_id: Option<String>,
    /// Attendance status.
    #[serde(default)]
    pub status: AttendanceStatus,
    /// Free-form comment.
    #[serde(default)]
    pub comment: String,
}

/// An attendance joined with the session facts the calculators filter on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    /// The attendance row.
    pub attendance: Attendance,
    /// Date of the attended session.
    pub session_date: NaiveDate,
    /// Discipline of the attended session.
    pub discipline_id: String,
    /// Organization owning that discipline.
    pub organization_id: String,
    /// Primary instructor of the session.
    pub instructor_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults_to_present() {
        let json = r#"{"session_id": "ses_001", "person_id": "per_001"}"#;
        let draft: AttendanceDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.status, AttendanceStatus::Present);
        assert!(draft.agreement_id.is_none());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::Excused).unwrap(),
            "\"excused\""
        );
    }

    #[test]
    fn test_agreement_covered() {
        let attendance = Attendance {
            id: "att_001".to_string(),
            session_id: "ses_001".to_string(),
            person_id: "per_001".to_string(),
            subscription_id: None,
            agreement_id: Some("conv_001".to_string()),
            status: AttendanceStatus::Present,
            comment: String::new(),
            registered_at: Utc::now(),
        };
        assert!(attendance.is_agreement_covered());
    }
}
