//! Organizations, people and disciplines.

use serde::{Deserialize, Serialize};

/// A studio or academy. Every plan, discipline, tariff and ledger entry
/// belongs to exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Unique identifier for the organization.
    pub id: String,
    /// Trading name.
    pub name: String,
    /// Registered legal name.
    #[serde(default)]
    pub legal_name: String,
    /// Tax identifier (RUT).
    pub tax_id: String,
    /// Contact address for statements.
    #[serde(default)]
    pub contact_email: String,
}

/// A student or instructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique identifier for the person.
    pub id: String,
    /// Given names.
    pub first_names: String,
    /// Family names.
    pub last_names: String,
    /// Contact email, unique per person.
    pub email: String,
    /// Whether the person is still active.
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Person {
    /// Returns "first last", trimmed.
    ///
    /// ```
    /// use academia_billing::models::Person;
    ///
    /// let person = Person {
    ///     id: "per_001".to_string(),
    ///     first_names: "Camila".to_string(),
    ///     last_names: "Gonzalez".to_string(),
    ///     email: "camila@example.com".to_string(),
    ///     active: true,
    /// };
    /// assert_eq!(person.full_name(), "Camila Gonzalez");
    /// ```
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
            .trim()
            .to_string()
    }
}

/// A discipline taught by an organization (yoga, flexibility, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    /// Unique identifier for the discipline.
    pub id: String,
    /// The organization offering it.
    pub organization_id: String,
    /// Display name.
    pub name: String,
    /// Optional level label ("basico", "avanzado").
    #[serde(default)]
    pub level: String,
    /// Whether the discipline is still offered.
    #[serde(default = "default_true")]
    pub active: bool,
}

pub(crate) fn default_true() -> bool {
    true
}
