//! In-memory store backed by ordered maps.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::{max_payment_amount, normalize};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Attendance, AttendanceDraft, AttendanceEntry, CashMovement, ClassSession, Discipline,
    ExchangeAgreement, InstructorRate, InstructorSettlement, Organization, Payment, Period,
    Person, Plan, SalesDocument, Subscription,
};

use super::Store;

/// A [`Store`] holding every record in memory.
///
/// Attendance is keyed by (session, person), so a second registration for
/// the same pair can only ever update the first.
///
/// # Example
///
/// ```
/// use academia_billing::models::Organization;
/// use academia_billing::store::{MemoryStore, Store};
///
/// let mut store = MemoryStore::new();
/// store
///     .insert_organization(Organization {
///         id: "org_estudio".to_string(),
///         name: "Estudio Elemental".to_string(),
///         legal_name: String::new(),
///         tax_id: "76.123.456-7".to_string(),
///         contact_email: String::new(),
///     })
///     .unwrap();
///
/// assert_eq!(store.organization("org_estudio").unwrap().name, "Estudio Elemental");
/// assert!(store.organization("org_otra").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    organizations: BTreeMap<String, Organization>,
    people: BTreeMap<String, Person>,
    disciplines: BTreeMap<String, Discipline>,
    plans: BTreeMap<String, Plan>,
    subscriptions: BTreeMap<String, Subscription>,
    agreements: BTreeMap<String, ExchangeAgreement>,
    sessions: BTreeMap<String, ClassSession>,
    attendance: BTreeMap<(String, String), Attendance>,
    payments: BTreeMap<String, Payment>,
    documents: BTreeMap<String, SalesDocument>,
    rates: Vec<InstructorRate>,
    settlements: BTreeMap<String, InstructorSettlement>,
    cash_movements: BTreeMap<String, CashMovement>,
}

fn lookup<'a, T>(map: &'a BTreeMap<String, T>, entity: &str, id: &str) -> EngineResult<&'a T> {
    map.get(id).ok_or_else(|| EngineError::not_found(entity, id))
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an organization.
    pub fn insert_organization(&mut self, organization: Organization) -> EngineResult<()> {
        self.organizations
            .insert(organization.id.clone(), organization);
        Ok(())
    }

    /// Adds or replaces a person.
    pub fn insert_person(&mut self, person: Person) -> EngineResult<()> {
        self.people.insert(person.id.clone(), person);
        Ok(())
    }

    /// Adds or replaces a discipline. Its organization must exist.
    pub fn insert_discipline(&mut self, discipline: Discipline) -> EngineResult<()> {
        self.organization(&discipline.organization_id)?;
        self.disciplines.insert(discipline.id.clone(), discipline);
        Ok(())
    }

    /// Adds or replaces a plan after validating it.
    pub fn insert_plan(&mut self, plan: Plan) -> EngineResult<()> {
        plan.validate()?;
        self.organization(&plan.organization_id)?;
        self.plans.insert(plan.id.clone(), plan);
        Ok(())
    }

    /// Adds or replaces a subscription after validating it.
    pub fn insert_subscription(&mut self, subscription: Subscription) -> EngineResult<()> {
        subscription.validate()?;
        self.person(&subscription.person_id)?;
        self.plan(&subscription.plan_id)?;
        for agreement_id in &subscription.agreement_ids {
            self.agreement(agreement_id)?;
        }
        self.subscriptions
            .insert(subscription.id.clone(), subscription);
        Ok(())
    }

    /// Adds or replaces an exchange agreement.
    pub fn insert_agreement(&mut self, agreement: ExchangeAgreement) -> EngineResult<()> {
        self.organization(&agreement.organization_id)?;
        self.agreements.insert(agreement.id.clone(), agreement);
        Ok(())
    }

    /// Adds or replaces a class session. Its discipline and instructors must
    /// exist.
    pub fn insert_session(&mut self, session: ClassSession) -> EngineResult<()> {
        self.discipline(&session.discipline_id)?;
        if let Some(instructor_id) = &session.instructor_id {
            self.person(instructor_id)?;
        }
        for co_instructor in &session.co_instructor_ids {
            self.person(co_instructor)?;
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    /// Adds an instructor tariff.
    pub fn insert_rate(&mut self, rate: InstructorRate) -> EngineResult<()> {
        self.organization(&rate.organization_id)?;
        if let Some(discipline_id) = &rate.discipline_id {
            self.discipline(discipline_id)?;
        }
        if rate.amount_per_session < Decimal::ZERO {
            return Err(EngineError::validation(
                "amount_per_session",
                format!("tariff '{}' has a negative amount", rate.id),
            ));
        }
        if rate.valid_until.is_some_and(|until| until < rate.valid_from) {
            return Err(EngineError::validation(
                "valid_until",
                format!("tariff '{}' ends before it starts", rate.id),
            ));
        }
        self.rates.push(rate);
        Ok(())
    }

    /// Adds or replaces a sales document.
    pub fn insert_sales_document(&mut self, document: SalesDocument) -> EngineResult<()> {
        self.organization(&document.organization_id)?;
        if let Some(subscription_id) = &document.subscription_id {
            self.subscription(subscription_id)?;
        }
        self.documents.insert(document.id.clone(), document);
        Ok(())
    }

    fn entry_for(&self, attendance: &Attendance) -> Option<AttendanceEntry> {
        let session = self.sessions.get(&attendance.session_id)?;
        let discipline = self.disciplines.get(&session.discipline_id)?;
        Some(AttendanceEntry {
            attendance: attendance.clone(),
            session_date: session.date,
            discipline_id: discipline.id.clone(),
            organization_id: discipline.organization_id.clone(),
            instructor_id: session.instructor_id.clone(),
        })
    }

    fn check_draft(&self, draft: &AttendanceDraft) -> EngineResult<()> {
        self.session(&draft.session_id)?;
        self.person(&draft.person_id)?;
        if let Some(subscription_id) = &draft.subscription_id {
            let subscription = self.subscription(subscription_id)?;
            if subscription.person_id != draft.person_id {
                return Err(EngineError::validation(
                    "subscription_id",
                    format!(
                        "subscription '{}' belongs to '{}', not '{}'",
                        subscription_id, subscription.person_id, draft.person_id
                    ),
                ));
            }
        }
        if let Some(agreement_id) = &draft.agreement_id {
            self.agreement(agreement_id)?;
        }
        Ok(())
    }

    fn apply_draft(&mut self, draft: AttendanceDraft) -> Attendance {
        let key = (draft.session_id.clone(), draft.person_id.clone());
        let row = self.attendance.entry(key).or_insert_with(|| Attendance {
            id: Uuid::new_v4().to_string(),
            session_id: draft.session_id.clone(),
            person_id: draft.person_id.clone(),
            subscription_id: None,
            agreement_id: None,
            status: draft.status,
            comment: String::new(),
            registered_at: Utc::now(),
        });
        row.subscription_id = draft.subscription_id;
        row.agreement_id = draft.agreement_id;
        row.status = draft.status;
        row.comment = draft.comment;
        row.clone()
    }
}

impl Store for MemoryStore {
    fn organization(&self, id: &str) -> EngineResult<&Organization> {
        lookup(&self.organizations, "organization", id)
    }

    fn person(&self, id: &str) -> EngineResult<&Person> {
        lookup(&self.people, "person", id)
    }

    fn discipline(&self, id: &str) -> EngineResult<&Discipline> {
        lookup(&self.disciplines, "discipline", id)
    }

    fn plan(&self, id: &str) -> EngineResult<&Plan> {
        lookup(&self.plans, "plan", id)
    }

    fn subscription(&self, id: &str) -> EngineResult<&Subscription> {
        lookup(&self.subscriptions, "subscription", id)
    }

    fn agreement(&self, id: &str) -> EngineResult<&ExchangeAgreement> {
        lookup(&self.agreements, "agreement", id)
    }

    fn session(&self, id: &str) -> EngineResult<&ClassSession> {
        lookup(&self.sessions, "session", id)
    }

    fn settlement(&self, id: &str) -> EngineResult<&InstructorSettlement> {
        lookup(&self.settlements, "settlement", id)
    }

    fn latest_subscription_for(&self, person_id: &str) -> Option<&Subscription> {
        self.subscriptions
            .values()
            .filter(|s| s.person_id == person_id)
            .max_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
    }

    fn subscriptions(&self) -> Vec<&Subscription> {
        self.subscriptions.values().collect()
    }

    fn attendance_for_person(&self, person_id: &str, period: &Period) -> Vec<AttendanceEntry> {
        self.attendance
            .values()
            .filter(|a| a.person_id == person_id)
            .filter_map(|a| self.entry_for(a))
            .filter(|entry| period.contains_date(entry.session_date))
            .collect()
    }

    fn attendance_for_instructor(
        &self,
        organization_id: &str,
        instructor_id: &str,
        period: &Period,
    ) -> Vec<AttendanceEntry> {
        self.attendance
            .values()
            .filter_map(|a| self.entry_for(a))
            .filter(|entry| {
                entry.instructor_id.as_deref() == Some(instructor_id)
                    && entry.organization_id == organization_id
                    && period.contains_date(entry.session_date)
            })
            .collect()
    }

    fn attendance_for_session(&self, session_id: &str) -> EngineResult<Vec<Attendance>> {
        self.session(session_id)?;
        Ok(self
            .attendance
            .range((session_id.to_string(), String::new())..)
            .take_while(|((session, _), _)| session == session_id)
            .map(|(_, attendance)| attendance.clone())
            .collect())
    }

    fn payments_for_subscription(&self, subscription_id: &str) -> EngineResult<Vec<Payment>> {
        let subscription = self.subscription(subscription_id)?;
        let documents: BTreeSet<&str> = self
            .documents
            .values()
            .filter(|d| d.subscription_id.as_deref() == Some(subscription_id))
            .map(|d| d.id.as_str())
            .collect();

        // Keyed by payment id, so each payment is yielded once.
        Ok(self
            .payments
            .values()
            .filter(|p| {
                p.person_id.as_deref() == Some(subscription.person_id.as_str())
                    || p.subscription_id.as_deref() == Some(subscription_id)
                    || p
                        .document_id
                        .as_deref()
                        .is_some_and(|doc| documents.contains(doc))
            })
            .cloned()
            .collect())
    }

    fn instructor_rates(&self, organization_id: &str) -> Vec<InstructorRate> {
        self.rates
            .iter()
            .filter(|r| r.organization_id == organization_id)
            .cloned()
            .collect()
    }

    fn cash_movements(&self, organization_id: Option<&str>) -> Vec<CashMovement> {
        self.cash_movements
            .values()
            .filter(|m| organization_id.is_none_or(|org| m.organization_id == org))
            .cloned()
            .collect()
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn attendance_count(&self) -> usize {
        self.attendance.len()
    }

    fn upsert_attendance(&mut self, draft: AttendanceDraft) -> EngineResult<Attendance> {
        self.check_draft(&draft)?;
        Ok(self.apply_draft(draft))
    }

    fn upsert_attendances(&mut self, drafts: Vec<AttendanceDraft>) -> EngineResult<Vec<Attendance>> {
        for draft in &drafts {
            self.check_draft(draft)?;
        }
        Ok(drafts
            .into_iter()
            .map(|draft| self.apply_draft(draft))
            .collect())
    }

    fn record_payment(&mut self, payment: Payment) -> EngineResult<()> {
        if payment.amount < Decimal::ZERO {
            return Err(EngineError::validation(
                "amount",
                format!("payment '{}' has a negative amount", payment.id),
            ));
        }
        if payment.amount > max_payment_amount() {
            return Err(EngineError::validation(
                "amount",
                format!(
                    "payment '{}' amount {} exceeds the maximum of {}",
                    payment.id,
                    payment.amount,
                    max_payment_amount()
                ),
            ));
        }
        if let Some(person_id) = &payment.person_id {
            self.person(person_id)?;
        }
        if let Some(subscription_id) = &payment.subscription_id {
            self.subscription(subscription_id)?;
        }
        if let Some(session_id) = &payment.session_id {
            self.session(session_id)?;
        }
        if let Some(document_id) = &payment.document_id {
            lookup(&self.documents, "sales document", document_id)?;
        }
        self.payments.insert(payment.id.clone(), payment);
        Ok(())
    }

    fn save_settlement(&mut self, settlement: InstructorSettlement) -> EngineResult<()> {
        settlement.validate()?;
        self.organization(&settlement.organization_id)?;
        self.person(&settlement.instructor_id)?;
        self.settlements
            .insert(settlement.id.clone(), settlement);
        Ok(())
    }

    fn save_cash_movement(&mut self, mut movement: CashMovement) -> EngineResult<CashMovement> {
        movement.validate()?;
        self.organization(&movement.organization_id)?;
        normalize(&mut movement);
        self.cash_movements
            .insert(movement.id.clone(), movement.clone());
        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AttendanceStatus, CashCategory, MovementType, PaymentMethod, PaymentType,
        SettlementStatus, SubscriptionStatus,
    };
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(id: &str) -> Person {
        Person {
            id: id.to_string(),
            first_names: "Ana".to_string(),
            last_names: "Rojas".to_string(),
            email: format!("{}@example.com", id),
            active: true,
        }
    }

    fn create_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .insert_organization(Organization {
                id: "org_estudio".to_string(),
                name: "Estudio Elemental".to_string(),
                legal_name: String::new(),
                tax_id: "76.123.456-7".to_string(),
                contact_email: String::new(),
            })
            .unwrap();
        store.insert_person(person("per_ana")).unwrap();
        store.insert_person(person("per_luis")).unwrap();
        store.insert_person(person("per_profe")).unwrap();
        store
            .insert_discipline(Discipline {
                id: "disc_yoga".to_string(),
                organization_id: "org_estudio".to_string(),
                name: "Yoga".to_string(),
                level: String::new(),
                active: true,
            })
            .unwrap();
        store
            .insert_plan(Plan {
                id: "plan_2x".to_string(),
                organization_id: "org_estudio".to_string(),
                name: "Plan 2 clases".to_string(),
                description: String::new(),
                price: dec("50000"),
                duration_days: 30,
                classes_per_week: 2,
                active: true,
            })
            .unwrap();
        store
            .insert_subscription(Subscription {
                id: "sub_ana".to_string(),
                person_id: "per_ana".to_string(),
                plan_id: "plan_2x".to_string(),
                agreement_ids: vec![],
                start_date: date(2025, 1, 1),
                end_date: Some(date(2025, 1, 31)),
                negotiated_price: None,
                discount_percentage: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                status: SubscriptionStatus::Active,
                notes: String::new(),
            })
            .unwrap();
        for (id, day) in [("ses_1", 10), ("ses_2", 17)] {
            store
                .insert_session(ClassSession {
                    id: id.to_string(),
                    discipline_id: "disc_yoga".to_string(),
                    schedule_block_id: None,
                    instructor_id: Some("per_profe".to_string()),
                    co_instructor_ids: vec![],
                    date: date(2025, 1, day),
                    status: Default::default(),
                    capacity: None,
                    notes: String::new(),
                })
                .unwrap();
        }
        store
    }

    fn draft(session: &str, person: &str) -> AttendanceDraft {
        AttendanceDraft {
            session_id: session.to_string(),
            person_id: person.to_string(),
            subscription_id: None,
            agreement_id: None,
            status: AttendanceStatus::Present,
            comment: String::new(),
        }
    }

    fn payment(id: &str) -> Payment {
        Payment {
            id: id.to_string(),
            person_id: None,
            subscription_id: None,
            session_id: None,
            document_id: None,
            payment_type: PaymentType::Subscription,
            method: PaymentMethod::Transfer,
            date: date(2025, 1, 5),
            amount: dec("10000"),
            reference: String::new(),
        }
    }

    #[test]
    fn test_upsert_updates_existing_row() {
        let mut store = create_test_store();
        let first = store.upsert_attendance(draft("ses_1", "per_ana")).unwrap();

        let mut update = draft("ses_1", "per_ana");
        update.status = AttendanceStatus::Excused;
        update.comment = "aviso previo".to_string();
        let second = store.upsert_attendance(update).unwrap();

        assert_eq!(store.attendance_count(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(first.registered_at, second.registered_at);
        assert_eq!(second.status, AttendanceStatus::Excused);
        assert_eq!(second.comment, "aviso previo");
    }

    #[test]
    fn test_upsert_rejects_unknown_session() {
        let mut store = create_test_store();
        let result = store.upsert_attendance(draft("ses_404", "per_ana"));
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert_eq!(store.attendance_count(), 0);
    }

    #[test]
    fn test_upsert_rejects_foreign_subscription() {
        let mut store = create_test_store();
        let mut foreign = draft("ses_1", "per_luis");
        foreign.subscription_id = Some("sub_ana".to_string());
        assert!(matches!(
            store.upsert_attendance(foreign),
            Err(EngineError::Validation { .. })
        ));
    }

    #[test]
    fn test_bulk_upsert_is_atomic() {
        let mut store = create_test_store();
        let result = store.upsert_attendances(vec![
            draft("ses_1", "per_ana"),
            draft("ses_1", "per_luis"),
            draft("ses_1", "per_nadie"),
        ]);

        assert!(result.is_err());
        assert_eq!(store.attendance_count(), 0);
    }

    #[test]
    fn test_bulk_upsert_collapses_duplicates() {
        let mut store = create_test_store();
        let rows = store
            .upsert_attendances(vec![
                draft("ses_1", "per_ana"),
                draft("ses_1", "per_luis"),
                draft("ses_1", "per_ana"),
            ])
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, rows[2].id);
        assert_eq!(store.attendance_count(), 2);
    }

    #[test]
    fn test_attendance_for_person_filters_period() {
        let mut store = create_test_store();
        store.upsert_attendance(draft("ses_1", "per_ana")).unwrap();
        store.upsert_attendance(draft("ses_2", "per_ana")).unwrap();
        store.upsert_attendance(draft("ses_2", "per_luis")).unwrap();

        let period = Period::new(date(2025, 1, 1), date(2025, 1, 15));
        let entries = store.attendance_for_person("per_ana", &period);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].session_date, date(2025, 1, 10));
        assert_eq!(entries[0].organization_id, "org_estudio");
    }

    #[test]
    fn test_attendance_for_instructor_joins_session_facts() {
        let mut store = create_test_store();
        store.upsert_attendance(draft("ses_1", "per_ana")).unwrap();
        store.upsert_attendance(draft("ses_2", "per_luis")).unwrap();

        let period = Period::new(date(2025, 1, 1), date(2025, 1, 31));
        assert_eq!(
            store
                .attendance_for_instructor("org_estudio", "per_profe", &period)
                .len(),
            2
        );
        assert!(
            store
                .attendance_for_instructor("org_estudio", "per_ana", &period)
                .is_empty()
        );
    }

    #[test]
    fn test_payments_union_is_deduplicated() {
        let mut store = create_test_store();
        store
            .insert_sales_document(SalesDocument {
                id: "doc_1".to_string(),
                organization_id: "org_estudio".to_string(),
                subscription_id: Some("sub_ana".to_string()),
                number: "B-0001".to_string(),
                issue_date: date(2025, 1, 2),
                total_amount: dec("50000"),
                status: Default::default(),
            })
            .unwrap();

        let mut by_all = payment("pay_all");
        by_all.person_id = Some("per_ana".to_string());
        by_all.subscription_id = Some("sub_ana".to_string());
        by_all.document_id = Some("doc_1".to_string());
        let mut by_document = payment("pay_doc");
        by_document.document_id = Some("doc_1".to_string());
        let mut unrelated = payment("pay_luis");
        unrelated.person_id = Some("per_luis".to_string());

        store.record_payment(by_all).unwrap();
        store.record_payment(by_document).unwrap();
        store.record_payment(unrelated).unwrap();

        let payments = store.payments_for_subscription("sub_ana").unwrap();
        let ids: Vec<&str> = payments.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pay_all", "pay_doc"]);
    }

    #[test]
    fn test_payment_over_cap_is_rejected() {
        let mut store = create_test_store();
        let mut oversized = payment("pay_big");
        oversized.amount = dec("100000000");
        match store.record_payment(oversized) {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "amount"),
            other => panic!("Expected Validation error, got {:?}", other),
        }

        let mut largest = payment("pay_max");
        largest.amount = dec("99999999.99");
        assert!(store.record_payment(largest).is_ok());
    }

    #[test]
    fn test_attendance_for_session_lists_only_that_session() {
        let mut store = create_test_store();
        store.upsert_attendance(draft("ses_1", "per_luis")).unwrap();
        store.upsert_attendance(draft("ses_1", "per_ana")).unwrap();
        store.upsert_attendance(draft("ses_2", "per_ana")).unwrap();

        let rows = store.attendance_for_session("ses_1").unwrap();
        let people: Vec<&str> = rows.iter().map(|a| a.person_id.as_str()).collect();
        assert_eq!(people, vec!["per_ana", "per_luis"]);
        assert!(rows.iter().all(|a| a.session_id == "ses_1"));
    }

    #[test]
    fn test_attendance_for_unknown_session_is_not_found() {
        let store = create_test_store();
        assert!(matches!(
            store.attendance_for_session("ses_404"),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_payment_with_unknown_subscription_is_rejected() {
        let mut store = create_test_store();
        let mut orphan = payment("pay_1");
        orphan.subscription_id = Some("sub_404".to_string());
        assert!(store.record_payment(orphan).is_err());
    }

    #[test]
    fn test_save_cash_movement_normalizes() {
        let mut store = create_test_store();
        let stored = store
            .save_cash_movement(CashMovement {
                id: "mov_1".to_string(),
                organization_id: "org_estudio".to_string(),
                movement_type: MovementType::Income,
                category: CashCategory::Workshops,
                date: date(2025, 1, 20),
                gross_amount: dec("119000"),
                affects_tax: true,
                net_amount: dec("1"),
                tax_amount: dec("1"),
                description: String::new(),
                created_at: Utc::now(),
            })
            .unwrap();

        assert_eq!(stored.net_amount, dec("100000.00"));
        assert_eq!(stored.tax_amount, dec("19000.00"));
        assert_eq!(store.cash_movements(Some("org_estudio")), vec![stored]);
        assert!(store.cash_movements(Some("org_otra")).is_empty());
    }

    #[test]
    fn test_invalid_plan_is_rejected() {
        let mut store = create_test_store();
        let mut plan = store.plan("plan_2x").unwrap().clone();
        plan.id = "plan_0x".to_string();
        plan.classes_per_week = 0;
        assert!(store.insert_plan(plan).is_err());
        assert!(store.plan("plan_0x").is_err());
    }

    #[test]
    fn test_save_settlement_validates_period() {
        let mut store = create_test_store();
        let settlement = InstructorSettlement {
            id: "liq_1".to_string(),
            organization_id: "org_estudio".to_string(),
            instructor_id: "per_profe".to_string(),
            period_start: date(2025, 2, 1),
            period_end: date(2025, 1, 1),
            session_ids: vec![],
            gross_amount: Decimal::ZERO,
            withholding_amount: Decimal::ZERO,
            net_amount: Decimal::ZERO,
            status: SettlementStatus::Draft,
            notes: String::new(),
            created_at: Utc::now(),
        };
        assert!(store.save_settlement(settlement).is_err());
        assert!(store.settlement("liq_1").is_err());
    }

    #[test]
    fn test_latest_subscription_by_start_date() {
        let mut store = create_test_store();
        let mut later = store.subscription("sub_ana").unwrap().clone();
        later.id = "sub_ana_feb".to_string();
        later.start_date = date(2025, 2, 1);
        later.end_date = None;
        store.insert_subscription(later).unwrap();

        assert_eq!(
            store.latest_subscription_for("per_ana").unwrap().id,
            "sub_ana_feb"
        );
        assert!(store.latest_subscription_for("per_luis").is_none());
    }
}
