//! Core data models for the billing engine.
//!
//! This module contains all the domain records the calculators read and the
//! store persists.

mod attendance;
mod audit;
mod cash_movement;
mod instructor;
mod organization;
mod payment;
mod period;
mod plan;
mod session;
mod subscription;

pub use attendance::{Attendance, AttendanceDraft, AttendanceEntry, AttendanceStatus};
pub use audit::{AuditStep, AuditTrace, AuditWarning};
pub use cash_movement::{CashCategory, CashMovement, MovementType};
pub use instructor::{InstructorRate, InstructorSettlement, SettlementStatus};
pub use organization::{Discipline, Organization, Person};
pub use payment::{DocumentStatus, Payment, PaymentMethod, PaymentType, SalesDocument};
pub use period::Period;
pub use plan::Plan;
pub use session::{ClassSession, SessionStatus};
pub use subscription::{ExchangeAgreement, Subscription, SubscriptionStatus};
