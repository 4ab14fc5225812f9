//! Storage and query layer.
//!
//! The calculators never touch storage; the [`Store`] trait is the seam the
//! engine and the HTTP layer query through. [`MemoryStore`] is the in-process
//! implementation backed by ordered maps.

mod memory;

pub use memory::MemoryStore;

use crate::error::EngineResult;
use crate::models::{
    Attendance, AttendanceDraft, AttendanceEntry, CashMovement, ClassSession, Discipline,
    ExchangeAgreement, InstructorRate, InstructorSettlement, Organization, Payment, Period,
    Person, Plan, Subscription,
};

/// Queries and writes over the studio's records.
///
/// Lookups by id return [`EngineError::NotFound`](crate::error::EngineError::NotFound)
/// on a miss. Queries that may legitimately match nothing return an empty
/// collection or `None` instead.
pub trait Store: Send + Sync {
    /// Looks up an organization.
    fn organization(&self, id: &str) -> EngineResult<&Organization>;

    /// Looks up a person.
    fn person(&self, id: &str) -> EngineResult<&Person>;

    /// Looks up a discipline.
    fn discipline(&self, id: &str) -> EngineResult<&Discipline>;

    /// Looks up a plan.
    fn plan(&self, id: &str) -> EngineResult<&Plan>;

    /// Looks up a subscription.
    fn subscription(&self, id: &str) -> EngineResult<&Subscription>;

    /// Looks up an exchange agreement.
    fn agreement(&self, id: &str) -> EngineResult<&ExchangeAgreement>;

    /// Looks up a class session.
    fn session(&self, id: &str) -> EngineResult<&ClassSession>;

    /// Looks up a settlement.
    fn settlement(&self, id: &str) -> EngineResult<&InstructorSettlement>;

    /// The person's subscription with the latest start date.
    ///
    /// Ties on start date go to the greater subscription id.
    fn latest_subscription_for(&self, person_id: &str) -> Option<&Subscription>;

    /// All subscriptions, ordered by id.
    fn subscriptions(&self) -> Vec<&Subscription>;

    /// The person's attendance at sessions dated inside `period`.
    fn attendance_for_person(&self, person_id: &str, period: &Period) -> Vec<AttendanceEntry>;

    /// Attendance at sessions the instructor taught as primary instructor,
    /// dated inside `period`, in disciplines of `organization_id`.
    fn attendance_for_instructor(
        &self,
        organization_id: &str,
        instructor_id: &str,
        period: &Period,
    ) -> Vec<AttendanceEntry>;

    /// Attendance registered for a session, ordered by person id.
    fn attendance_for_session(&self, session_id: &str) -> EngineResult<Vec<Attendance>>;

    /// Payments linked to the subscription by its person, by direct
    /// reference, or through a sales document for it.
    ///
    /// Each payment appears once even when several links match.
    fn payments_for_subscription(&self, subscription_id: &str) -> EngineResult<Vec<Payment>>;

    /// The organization's instructor tariffs, in insertion order.
    fn instructor_rates(&self, organization_id: &str) -> Vec<InstructorRate>;

    /// Cash movements, optionally restricted to one organization.
    fn cash_movements(&self, organization_id: Option<&str>) -> Vec<CashMovement>;

    /// Number of class sessions.
    fn session_count(&self) -> usize;

    /// Number of attendance rows.
    fn attendance_count(&self) -> usize;

    /// Inserts or updates the attendance keyed by (session, person).
    ///
    /// An existing row keeps its id and registration time and takes the
    /// draft's subscription, agreement, status and comment.
    fn upsert_attendance(&mut self, draft: AttendanceDraft) -> EngineResult<Attendance>;

    /// Upserts several attendances atomically.
    ///
    /// If any draft is rejected no row is written.
    fn upsert_attendances(&mut self, drafts: Vec<AttendanceDraft>) -> EngineResult<Vec<Attendance>>;

    /// Stores a payment.
    ///
    /// Amounts must lie between zero and
    /// [`max_payment_amount`](crate::calculation::max_payment_amount).
    fn record_payment(&mut self, payment: Payment) -> EngineResult<()>;

    /// Inserts or replaces a settlement.
    fn save_settlement(&mut self, settlement: InstructorSettlement) -> EngineResult<()>;

    /// Normalizes and stores a cash movement, returning the stored record.
    fn save_cash_movement(&mut self, movement: CashMovement) -> EngineResult<CashMovement>;
}
