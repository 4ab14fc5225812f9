//! The billing engine.
//!
//! [`BillingEngine`] ties the pure calculators to a [`Store`] and a
//! [`Clock`]. Every public method reads the clock at most once, so a single
//! call never straddles midnight with two different "today"s.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::calculation::{
    ActivitySummary, BalanceResult, DEFAULT_RATE_WARNING, DelinquentSubscription,
    EntitlementResult, MonthlyCashSummary, RateSource, SettlementTotals, TariffResolution,
    calculate_balance, calculate_entitlement, cash_totals, compute_settlement_totals,
    default_session_rate, delinquents, monthly_cash_summary, resolve_tariff,
};
use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, AttendanceDraft, AuditTrace, AuditWarning, CashMovement, InstructorSettlement,
    Payment, Period, Person, Plan, SettlementStatus, Subscription,
};
use crate::store::Store;

/// Warning code recorded when a student attended more classes than granted.
pub const OVERCONSUMPTION_WARNING: &str = "OVERCONSUMPTION";

/// Entitlement and balance of one subscription, with the audit trace.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatement {
    /// The subscription.
    pub subscription_id: String,
    /// The student.
    pub person_id: String,
    /// The plan.
    pub plan_id: String,
    /// The date used as "today".
    pub as_of: NaiveDate,
    /// The active period measured.
    pub period: Period,
    /// Classes granted for the period.
    pub classes_entitled: u32,
    /// Quota-consuming attendance in the period.
    pub classes_used: u32,
    /// Classes left.
    pub classes_available: u32,
    /// Classes taken beyond the quota.
    pub classes_overconsumed: u32,
    /// Negotiated or plan price.
    pub base_amount: Decimal,
    /// Discount applied.
    pub discount: Decimal,
    /// What the subscription should cost.
    pub target_amount: Decimal,
    /// Payments counted towards it.
    pub amount_paid: Decimal,
    /// What is still owed.
    pub outstanding_balance: Decimal,
    /// The audit trace recording the calculation.
    pub audit_trace: AuditTrace,
}

/// The student status payload.
#[derive(Debug, Clone, Serialize)]
pub struct StudentStatus {
    /// The student.
    pub persona: Person,
    /// "plan name (organization name)".
    pub plan: String,
    /// Classes granted.
    pub clases_asignadas: u32,
    /// Classes used.
    pub clases_usadas: u32,
    /// Classes taken beyond the quota.
    pub clases_sobreconsumo: u32,
    /// Outstanding balance.
    pub saldo_pendiente: Decimal,
}

/// The fields needed to open a settlement.
#[derive(Debug, Clone)]
pub struct NewSettlement {
    /// The paying organization.
    pub organization_id: String,
    /// The instructor being paid.
    pub instructor_id: String,
    /// First day of the window.
    pub period_start: NaiveDate,
    /// Last day of the window, inclusive.
    pub period_end: NaiveDate,
    /// Free-form notes.
    pub notes: String,
}

/// A stored settlement together with the calculation that produced it.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    /// The settlement as stored.
    pub settlement: InstructorSettlement,
    /// The computed totals.
    pub totals: SettlementTotals,
}

/// Orchestrates the calculators over a store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use academia_billing::clock::FixedClock;
/// use academia_billing::engine::BillingEngine;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
/// let engine = BillingEngine::new(Arc::new(clock));
/// assert_eq!(engine.default_rate(), Decimal::new(3743, 0));
/// ```
#[derive(Clone)]
pub struct BillingEngine {
    clock: Arc<dyn Clock>,
    default_rate: Decimal,
}

impl std::fmt::Debug for BillingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingEngine")
            .field("today", &self.clock.today())
            .field("default_rate", &self.default_rate)
            .finish()
    }
}

impl BillingEngine {
    /// Creates an engine paying the standard default rate.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            default_rate: default_session_rate(),
        }
    }

    /// Overrides the rate paid when no tariff applies.
    pub fn with_default_rate(mut self, rate: Decimal) -> Self {
        self.default_rate = rate;
        self
    }

    /// The rate paid when no tariff applies.
    pub fn default_rate(&self) -> Decimal {
        self.default_rate
    }

    /// Today, according to the engine's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn subscription_and_plan<'s, S: Store + ?Sized>(
        store: &'s S,
        subscription_id: &str,
    ) -> EngineResult<(&'s Subscription, &'s Plan)> {
        let subscription = store.subscription(subscription_id)?;
        let plan = store.plan(&subscription.plan_id)?;
        Ok((subscription, plan))
    }

    fn entitlement<S: Store + ?Sized>(
        store: &S,
        subscription: &Subscription,
        plan: &Plan,
        today: NaiveDate,
        step_number: u32,
    ) -> EntitlementResult {
        let period = subscription.active_period(today);
        let attendance = store.attendance_for_person(&subscription.person_id, &period);
        calculate_entitlement(subscription, plan, &attendance, today, step_number)
    }

    fn balance<S: Store + ?Sized>(
        store: &S,
        subscription: &Subscription,
        plan: &Plan,
        step_number: u32,
    ) -> EngineResult<BalanceResult> {
        let payments = store.payments_for_subscription(&subscription.id)?;
        calculate_balance(subscription, plan, &payments, step_number)
    }

    fn entitlement_for<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<EntitlementResult> {
        let (subscription, plan) = Self::subscription_and_plan(store, subscription_id)?;
        Ok(Self::entitlement(store, subscription, plan, self.today(), 1))
    }

    fn balance_for<S: Store + ?Sized>(
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<BalanceResult> {
        let (subscription, plan) = Self::subscription_and_plan(store, subscription_id)?;
        Self::balance(store, subscription, plan, 1)
    }

    /// Classes the subscription grants up to its end date or today.
    pub fn classes_entitled<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<u32> {
        Ok(self.entitlement_for(store, subscription_id)?.classes_entitled)
    }

    /// Quota-consuming attendance in the subscription's active period.
    pub fn classes_used<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<u32> {
        Ok(self.entitlement_for(store, subscription_id)?.classes_used)
    }

    /// Classes left on the subscription.
    pub fn classes_available<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<u32> {
        Ok(self.entitlement_for(store, subscription_id)?.classes_available)
    }

    /// Classes taken beyond the subscription's quota.
    pub fn classes_overconsumed<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<u32> {
        Ok(self
            .entitlement_for(store, subscription_id)?
            .classes_overconsumed)
    }

    /// What the subscription should cost after discounts.
    pub fn target_amount<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<Decimal> {
        Ok(Self::balance_for(store, subscription_id)?.target_amount)
    }

    /// Sum of the payments counted towards the subscription.
    pub fn amount_paid<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<Decimal> {
        Ok(Self::balance_for(store, subscription_id)?.amount_paid)
    }

    /// What is still owed on the subscription.
    pub fn outstanding_balance<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<Decimal> {
        Ok(Self::balance_for(store, subscription_id)?.outstanding_balance)
    }

    /// Full entitlement and balance statement for a subscription.
    pub fn subscription_statement<S: Store + ?Sized>(
        &self,
        store: &S,
        subscription_id: &str,
    ) -> EngineResult<SubscriptionStatement> {
        let today = self.today();
        let (subscription, plan) = Self::subscription_and_plan(store, subscription_id)?;

        let mut trace = AuditTrace::default();
        let entitlement = Self::entitlement(store, subscription, plan, today, 1);
        trace.steps.extend(entitlement.audit_steps.iter().cloned());
        let balance = Self::balance(store, subscription, plan, trace.next_step_number())?;
        trace.steps.extend(balance.audit_steps.iter().cloned());

        if entitlement.classes_overconsumed > 0 {
            trace.warnings.push(AuditWarning::new(
                OVERCONSUMPTION_WARNING,
                format!(
                    "{} classes attended beyond the {} granted",
                    entitlement.classes_overconsumed, entitlement.classes_entitled
                ),
                "medium",
            ));
        }

        Ok(SubscriptionStatement {
            subscription_id: subscription.id.clone(),
            person_id: subscription.person_id.clone(),
            plan_id: plan.id.clone(),
            as_of: today,
            period: entitlement.period,
            classes_entitled: entitlement.classes_entitled,
            classes_used: entitlement.classes_used,
            classes_available: entitlement.classes_available,
            classes_overconsumed: entitlement.classes_overconsumed,
            base_amount: balance.base_amount,
            discount: balance.discount,
            target_amount: balance.target_amount,
            amount_paid: balance.amount_paid,
            outstanding_balance: balance.outstanding_balance,
            audit_trace: trace,
        })
    }

    /// Status of the person's most recent subscription.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the person does not exist or has never
    /// subscribed.
    pub fn student_status<S: Store + ?Sized>(
        &self,
        store: &S,
        person_id: &str,
    ) -> EngineResult<StudentStatus> {
        let person = store.person(person_id)?;
        let subscription = store
            .latest_subscription_for(person_id)
            .ok_or_else(|| EngineError::not_found("subscription for person", person_id))?;
        let plan = store.plan(&subscription.plan_id)?;
        let organization = store.organization(&plan.organization_id)?;

        let entitlement = Self::entitlement(store, subscription, plan, self.today(), 1);
        let balance = Self::balance(store, subscription, plan, 1)?;

        Ok(StudentStatus {
            persona: person.clone(),
            plan: format!("{} ({})", plan.name, organization.name),
            clases_asignadas: entitlement.classes_entitled,
            clases_usadas: entitlement.classes_used,
            clases_sobreconsumo: entitlement.classes_overconsumed,
            saldo_pendiente: balance.outstanding_balance,
        })
    }

    /// Resolves the instructor tariff for a discipline on a date.
    pub fn resolve_tariff<S: Store + ?Sized>(
        &self,
        store: &S,
        organization_id: &str,
        discipline_id: Option<&str>,
        date: NaiveDate,
    ) -> EngineResult<TariffResolution> {
        store.organization(organization_id)?;
        let rates = store.instructor_rates(organization_id);
        Ok(resolve_tariff(
            &rates,
            organization_id,
            discipline_id,
            date,
            self.default_rate,
            1,
        ))
    }

    /// Computes a settlement's totals without modifying anything.
    pub fn settle<S: Store + ?Sized>(
        &self,
        store: &S,
        settlement: &InstructorSettlement,
    ) -> EngineResult<SettlementTotals> {
        let entries = store.attendance_for_instructor(
            &settlement.organization_id,
            &settlement.instructor_id,
            &settlement.period(),
        );
        let rates = store.instructor_rates(&settlement.organization_id);
        let totals = compute_settlement_totals(settlement, &entries, &rates, self.default_rate)?;

        if totals.audit_trace.has_warning(DEFAULT_RATE_WARNING) {
            debug!(
                settlement_id = %settlement.id,
                instructor_id = %settlement.instructor_id,
                rate = %totals.rate,
                "No tariff applies, paying the default rate"
            );
        }
        Ok(totals)
    }

    fn apply_totals(settlement: &mut InstructorSettlement, totals: &SettlementTotals) {
        settlement.session_ids = totals.session_ids.clone();
        settlement.gross_amount = totals.gross;
        settlement.withholding_amount = totals.withholding;
        settlement.net_amount = totals.net;
    }

    /// Opens a draft settlement, computes it, and stores it.
    pub fn create_settlement<S: Store + ?Sized>(
        &self,
        store: &mut S,
        new: NewSettlement,
    ) -> EngineResult<SettlementOutcome> {
        let mut settlement = InstructorSettlement {
            id: Uuid::new_v4().to_string(),
            organization_id: new.organization_id,
            instructor_id: new.instructor_id,
            period_start: new.period_start,
            period_end: new.period_end,
            session_ids: Vec::new(),
            gross_amount: Decimal::ZERO,
            withholding_amount: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            status: SettlementStatus::Draft,
            notes: new.notes,
            created_at: Utc::now(),
        };
        settlement.validate()?;
        store.organization(&settlement.organization_id)?;
        store.person(&settlement.instructor_id)?;

        let totals = self.settle(store, &settlement)?;
        Self::apply_totals(&mut settlement, &totals);
        store.save_settlement(settlement.clone())?;

        info!(
            settlement_id = %settlement.id,
            instructor_id = %settlement.instructor_id,
            attendance_count = totals.attendance_count,
            gross = %totals.gross,
            net = %totals.net,
            "Settlement computed"
        );
        Ok(SettlementOutcome { settlement, totals })
    }

    /// Recomputes a draft settlement from current attendance and tariffs.
    ///
    /// # Errors
    ///
    /// Returns `Validation` once the settlement has been issued or paid.
    pub fn recalculate_settlement<S: Store + ?Sized>(
        &self,
        store: &mut S,
        settlement_id: &str,
    ) -> EngineResult<SettlementOutcome> {
        let mut settlement = store.settlement(settlement_id)?.clone();
        if settlement.status != SettlementStatus::Draft {
            return Err(EngineError::validation(
                "status",
                format!(
                    "settlement '{}' is {}; only draft settlements can be recalculated",
                    settlement.id,
                    settlement.status.as_str()
                ),
            ));
        }

        let totals = self.settle(store, &settlement)?;
        Self::apply_totals(&mut settlement, &totals);
        store.save_settlement(settlement.clone())?;

        info!(
            settlement_id = %settlement.id,
            attendance_count = totals.attendance_count,
            gross = %totals.gross,
            "Settlement recalculated"
        );
        Ok(SettlementOutcome { settlement, totals })
    }

    /// Moves a settlement forward in its lifecycle.
    pub fn transition_settlement<S: Store + ?Sized>(
        &self,
        store: &mut S,
        settlement_id: &str,
        status: SettlementStatus,
    ) -> EngineResult<InstructorSettlement> {
        let mut settlement = store.settlement(settlement_id)?.clone();
        let from = settlement.status;
        settlement.transition_to(status)?;
        store.save_settlement(settlement.clone())?;

        info!(
            settlement_id = %settlement.id,
            from = from.as_str(),
            to = status.as_str(),
            "Settlement status changed"
        );
        Ok(settlement)
    }

    /// Upserts one attendance.
    pub fn register_attendance<S: Store + ?Sized>(
        &self,
        store: &mut S,
        draft: AttendanceDraft,
    ) -> EngineResult<Attendance> {
        let attendance = store.upsert_attendance(draft)?;
        info!(
            attendance_id = %attendance.id,
            session_id = %attendance.session_id,
            person_id = %attendance.person_id,
            "Attendance registered"
        );
        Ok(attendance)
    }

    /// Upserts several attendances; none are written if any is rejected.
    pub fn register_attendances<S: Store + ?Sized>(
        &self,
        store: &mut S,
        drafts: Vec<AttendanceDraft>,
    ) -> EngineResult<Vec<Attendance>> {
        let rows = store.upsert_attendances(drafts)?;
        info!(count = rows.len(), "Attendance batch registered");
        Ok(rows)
    }

    /// Stores a payment.
    pub fn record_payment<S: Store + ?Sized>(
        &self,
        store: &mut S,
        payment: Payment,
    ) -> EngineResult<Payment> {
        store.record_payment(payment.clone())?;
        info!(
            payment_id = %payment.id,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Normalizes and stores a cash movement.
    pub fn record_cash_movement<S: Store + ?Sized>(
        &self,
        store: &mut S,
        movement: CashMovement,
    ) -> EngineResult<CashMovement> {
        let stored = store.save_cash_movement(movement)?;
        info!(
            movement_id = %stored.id,
            organization_id = %stored.organization_id,
            gross = %stored.gross_amount,
            tax = %stored.tax_amount,
            "Cash movement recorded"
        );
        Ok(stored)
    }

    /// Subscriptions with an outstanding balance, largest first.
    pub fn delinquent_subscriptions<S: Store + ?Sized>(
        &self,
        store: &S,
    ) -> EngineResult<Vec<DelinquentSubscription>> {
        let mut candidates = Vec::new();
        for subscription in store.subscriptions() {
            let plan = store.plan(&subscription.plan_id)?;
            let balance = Self::balance(store, subscription, plan, 1)?;
            let person_name = store
                .person(&subscription.person_id)
                .map(Person::full_name)?;
            candidates.push(DelinquentSubscription {
                subscription_id: subscription.id.clone(),
                person_id: subscription.person_id.clone(),
                person_name,
                plan_name: plan.name.clone(),
                outstanding_balance: balance.outstanding_balance,
            });
        }
        Ok(delinquents(candidates))
    }

    /// Monthly income and expense for an organization.
    pub fn monthly_cash_summary<S: Store + ?Sized>(
        &self,
        store: &S,
        organization_id: &str,
    ) -> EngineResult<Vec<MonthlyCashSummary>> {
        store.organization(organization_id)?;
        monthly_cash_summary(&store.cash_movements(Some(organization_id)))
    }

    /// Global session, attendance and cash totals.
    pub fn activity_summary<S: Store + ?Sized>(
        &self,
        store: &S,
    ) -> EngineResult<ActivitySummary> {
        let (total_income, total_expense) = cash_totals(&store.cash_movements(None))?;
        Ok(ActivitySummary {
            total_sessions: store.session_count(),
            total_attendance: store.attendance_count(),
            total_income,
            total_expense,
        })
    }
}

impl SettlementOutcome {
    /// True if the totals were computed at the default rate.
    pub fn used_default_rate(&self) -> bool {
        self.totals.rate_source == RateSource::Default
    }
}
