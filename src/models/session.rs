//! Class sessions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a class session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Planned, not yet held.
    #[default]
    Scheduled,
    /// Held.
    Completed,
    /// Called off.
    Cancelled,
}

/// A single dated occurrence of a discipline's class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    /// Unique identifier for the session.
    pub id: String,
    /// The discipline taught. Its organization scopes the session.
    pub discipline_id: String,
    /// Weekly schedule block the session was generated from.
    #[serde(default)]
    pub schedule_block_id: Option<String>,
    /// Primary instructor, paid through settlements.
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// Additional instructors co-teaching the session.
    #[serde(default)]
    pub co_instructor_ids: Vec<String>,
    /// The day the session takes place.
    pub date: NaiveDate,
    /// Lifecycle state.
    #[serde(default)]
    pub status: SessionStatus,
    /// Maximum number of attendees, if limited.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl ClassSession {
    /// Returns true if `person_id` is the primary instructor.
    pub fn is_taught_by(&self, person_id: &str) -> bool {
        self.instructor_id.as_deref() == Some(person_id)
    }
}
