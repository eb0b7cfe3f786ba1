//! Rental transaction engine.
//!
//! The borrow/return state machine over shared station inventory and user
//! balances. Each operation runs in a single transaction scope obtained from
//! the store: every precondition violation surfaces as a typed, user-facing
//! outcome with all state untouched, and any persistence failure aborts the
//! whole operation. The wall clock is read once per operation and that
//! instant is used for both persistence and fee arithmetic.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{enums::GearType, gear::RainGear, station::STATION_CAPACITY},
    pricing,
    repository::{RentalStore, RentalTx},
};

/// Why a borrow or return attempt was refused
#[derive(Debug, Clone, PartialEq)]
pub enum RentalRejection {
    UserNotFound,
    AccountInactive,
    AdminAccount,
    OutstandingRental,
    UnknownGear,
    GearUnavailable,
    InsufficientBalance { required: Decimal },
    EmptySlot,
    WrongReturnSlot { kind: GearType },
    SlotOutOfService,
    SlotOccupied,
    NoOpenRental,
    GearMismatch,
}

impl RentalRejection {
    fn message(&self) -> String {
        match self {
            RentalRejection::UserNotFound => "User not found".to_string(),
            RentalRejection::AccountInactive => {
                "Account is not activated, please activate it first".to_string()
            }
            RentalRejection::AdminAccount => {
                "Admin accounts cannot borrow gear".to_string()
            }
            RentalRejection::OutstandingRental => {
                "You have an unreturned item, please return it before borrowing again".to_string()
            }
            RentalRejection::UnknownGear => "Unknown gear ID".to_string(),
            RentalRejection::GearUnavailable => {
                "This gear is already borrowed or under maintenance".to_string()
            }
            RentalRejection::InsufficientBalance { required } => format!(
                "Insufficient balance, this gear requires a deposit of {}",
                required
            ),
            RentalRejection::EmptySlot => "No gear in the selected slot".to_string(),
            RentalRejection::WrongReturnSlot { kind } => {
                let range = kind.slot_range();
                format!(
                    "Wrong return location: a {} must go back to slots {}-{}",
                    kind,
                    range.start(),
                    range.end()
                )
            }
            RentalRejection::SlotOutOfService => {
                "This slot is out of service, please pick another one".to_string()
            }
            RentalRejection::SlotOccupied => {
                "This slot is already occupied, please pick another one".to_string()
            }
            RentalRejection::NoOpenRental => "No outstanding borrow record found".to_string(),
            RentalRejection::GearMismatch => {
                "The returned gear does not match the borrowed item".to_string()
            }
        }
    }
}

/// Result of a borrow or return attempt.
///
/// Precondition failures are values with `success = false`; infrastructure
/// failures are `AppError` so callers can tell "you did something wrong"
/// apart from "the system is unavailable".
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RentalOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund: Option<Decimal>,
    #[serde(skip)]
    pub rejection: Option<RentalRejection>,
}

impl RentalOutcome {
    fn accepted(message: String) -> Self {
        Self {
            success: true,
            message,
            cost: None,
            refund: None,
            rejection: None,
        }
    }

    fn rejected(rejection: RentalRejection) -> Self {
        Self {
            success: false,
            message: rejection.message(),
            cost: None,
            refund: None,
            rejection: Some(rejection),
        }
    }
}

#[derive(Clone)]
pub struct RentalService {
    store: Arc<dyn RentalStore>,
}

impl RentalService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Borrow a specific gear by its identifier.
    pub async fn borrow_gear(&self, user_id: &str, gear_id: &str) -> AppResult<RentalOutcome> {
        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        let gear = tx.get_gear(gear_id).await?;
        self.complete_borrow(tx, user_id, gear, now).await
    }

    /// Borrow whatever gear occupies the given station bay.
    pub async fn borrow_from_slot(
        &self,
        user_id: &str,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<RentalOutcome> {
        if !(1..=STATION_CAPACITY).contains(&slot_id) {
            return Err(AppError::Validation(format!(
                "Slot index must be between 1 and {}",
                STATION_CAPACITY
            )));
        }
        let now = Utc::now();
        let mut tx = self.store.begin().await?;
        if tx.slot_out_of_service(station_id, slot_id).await? {
            return Ok(RentalOutcome::rejected(RentalRejection::SlotOutOfService));
        }
        let gear = match tx.gear_occupying_slot(station_id, slot_id).await? {
            Some(gear) => Some(gear),
            None => return Ok(RentalOutcome::rejected(RentalRejection::EmptySlot)),
        };
        self.complete_borrow(tx, user_id, gear, now).await
    }

    /// Shared borrow path. Preconditions run in a fixed order so a caller
    /// failing several of them always sees the same outcome; the
    /// conditional gear update is the serialization point between
    /// concurrent borrowers of the same gear.
    async fn complete_borrow(
        &self,
        mut tx: Box<dyn RentalTx>,
        user_id: &str,
        gear: Option<RainGear>,
        now: DateTime<Utc>,
    ) -> AppResult<RentalOutcome> {
        let user = match tx.get_user(user_id).await? {
            Some(user) => user,
            None => return Ok(RentalOutcome::rejected(RentalRejection::UserNotFound)),
        };
        if !user.is_active {
            return Ok(RentalOutcome::rejected(RentalRejection::AccountInactive));
        }
        if user.is_admin() {
            return Ok(RentalOutcome::rejected(RentalRejection::AdminAccount));
        }
        if tx.open_record_for_user(user_id).await?.is_some() {
            return Ok(RentalOutcome::rejected(RentalRejection::OutstandingRental));
        }
        let gear = match gear {
            Some(gear) => gear,
            None => return Ok(RentalOutcome::rejected(RentalRejection::UnknownGear)),
        };
        if !gear.is_available() {
            return Ok(RentalOutcome::rejected(RentalRejection::GearUnavailable));
        }
        let kind = gear
            .kind()
            .ok_or_else(|| AppError::Internal(format!("gear {} has invalid type", gear.gear_id)))?;
        let deposit = kind.deposit();
        if user.credit < deposit {
            return Ok(RentalOutcome::rejected(
                RentalRejection::InsufficientBalance { required: deposit },
            ));
        }

        // Debit first; the guarded update also closes the window where a
        // concurrent operation drained the balance after our read.
        if !tx.adjust_balance(user_id, -deposit).await? {
            return Ok(RentalOutcome::rejected(
                RentalRejection::InsufficientBalance { required: deposit },
            ));
        }
        // Zero rows affected means another caller borrowed it between our
        // read and this write; the dropped transaction undoes the debit.
        if !tx.set_gear_borrowed(&gear.gear_id).await? {
            return Ok(RentalOutcome::rejected(RentalRejection::GearUnavailable));
        }
        let record_id = tx.insert_record(user_id, &gear.gear_id, now).await?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            gear_id = %gear.gear_id,
            record_id,
            %deposit,
            "gear borrowed"
        );
        Ok(RentalOutcome::accepted(
            "Borrow successful! Please take your gear".to_string(),
        ))
    }

    /// Return a borrowed gear into a station bay.
    pub async fn return_gear(
        &self,
        user_id: &str,
        gear_id: &str,
        station_id: i16,
        slot_id: i16,
    ) -> AppResult<RentalOutcome> {
        let now = Utc::now();
        let mut tx = self.store.begin().await?;

        let gear = match tx.get_gear(gear_id).await? {
            Some(gear) => gear,
            None => return Ok(RentalOutcome::rejected(RentalRejection::UnknownGear)),
        };
        let kind = gear
            .kind()
            .ok_or_else(|| AppError::Internal(format!("gear {} has invalid type", gear.gear_id)))?;
        if !kind.slot_range().contains(&slot_id) {
            return Ok(RentalOutcome::rejected(RentalRejection::WrongReturnSlot {
                kind,
            }));
        }
        if tx.slot_out_of_service(station_id, slot_id).await? {
            return Ok(RentalOutcome::rejected(RentalRejection::SlotOutOfService));
        }
        if tx.gear_occupying_slot(station_id, slot_id).await?.is_some() {
            return Ok(RentalOutcome::rejected(RentalRejection::SlotOccupied));
        }
        let record = match tx.open_record_for_user(user_id).await? {
            Some(record) => record,
            None => return Ok(RentalOutcome::rejected(RentalRejection::NoOpenRental)),
        };
        if record.gear_id != gear_id {
            return Ok(RentalOutcome::rejected(RentalRejection::GearMismatch));
        }

        let deposit = kind.deposit();
        let cost = pricing::rental_cost(record.borrow_time, now, kind).min(deposit);
        let refund = deposit - cost;

        // Conditional close: losing here means a concurrent return already
        // reconciled the record.
        if !tx.close_record(record.record_id, now, cost).await? {
            return Ok(RentalOutcome::rejected(RentalRejection::NoOpenRental));
        }
        // An open record implies the gear is Borrowed; anything else is
        // corrupt state and must not be papered over.
        if !tx
            .set_gear_available_at(gear_id, station_id, slot_id)
            .await?
        {
            return Err(AppError::Internal(format!(
                "gear {} has an open record but is not in Borrowed status",
                gear_id
            )));
        }
        if !tx.adjust_balance(user_id, refund).await? {
            return Err(AppError::Internal(format!(
                "failed to credit refund to user {}",
                user_id
            )));
        }
        tx.commit().await?;

        tracing::info!(
            user_id,
            gear_id,
            record_id = record.record_id,
            %cost,
            %refund,
            "gear returned"
        );
        let mut outcome = RentalOutcome::accepted(format!(
            "Return successful! Fee {:.2}, refunded {:.2}",
            cost, refund
        ));
        outcome.cost = Some(cost);
        outcome.refund = Some(refund);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{enums::GearStatus, record::BorrowRecord, user::User};
    use async_trait::async_trait;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // ------------------------------------------------------------------
    // In-memory store: operations apply immediately under a lock, exactly
    // like row-level conditional updates would, and an undo log restores
    // prior state when a transaction is dropped without commit.
    // ------------------------------------------------------------------

    #[derive(Default, Clone)]
    struct MemState {
        users: HashMap<String, User>,
        gears: HashMap<String, RainGear>,
        records: Vec<BorrowRecord>,
        stations: Vec<i16>,
        broken_slots: HashMap<i16, Vec<i16>>,
        next_record_id: i64,
    }

    #[derive(Default)]
    struct MemStore {
        state: Arc<Mutex<MemState>>,
        fail_insert_record: bool,
    }

    enum Undo {
        UserCredit(String, Decimal),
        Gear(String, RainGear),
        RecordInserted(i64),
        RecordRow(i64, BorrowRecord),
    }

    struct MemTx {
        state: Arc<Mutex<MemState>>,
        undo: Vec<Undo>,
        committed: bool,
        fail_insert_record: bool,
    }

    impl Drop for MemTx {
        fn drop(&mut self) {
            if self.committed {
                return;
            }
            let mut s = self.state.lock().unwrap();
            for action in self.undo.drain(..).rev() {
                match action {
                    Undo::UserCredit(id, credit) => {
                        s.users.get_mut(&id).unwrap().credit = credit;
                    }
                    Undo::Gear(id, row) => {
                        s.gears.insert(id, row);
                    }
                    Undo::RecordInserted(id) => {
                        s.records.retain(|r| r.record_id != id);
                    }
                    Undo::RecordRow(id, row) => {
                        if let Some(r) = s.records.iter_mut().find(|r| r.record_id == id) {
                            *r = row;
                        }
                    }
                }
            }
        }
    }

    #[async_trait]
    impl RentalStore for MemStore {
        async fn begin(&self) -> AppResult<Box<dyn RentalTx>> {
            Ok(Box::new(MemTx {
                state: self.state.clone(),
                undo: Vec::new(),
                committed: false,
                fail_insert_record: self.fail_insert_record,
            }))
        }
    }

    #[async_trait]
    impl RentalTx for MemTx {
        async fn get_user(&mut self, user_id: &str) -> AppResult<Option<User>> {
            Ok(self.state.lock().unwrap().users.get(user_id).cloned())
        }

        async fn adjust_balance(&mut self, user_id: &str, delta: Decimal) -> AppResult<bool> {
            let mut s = self.state.lock().unwrap();
            match s.users.get_mut(user_id) {
                Some(user) if user.credit + delta >= Decimal::ZERO => {
                    self.undo
                        .push(Undo::UserCredit(user_id.to_string(), user.credit));
                    user.credit += delta;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn get_gear(&mut self, gear_id: &str) -> AppResult<Option<RainGear>> {
            Ok(self.state.lock().unwrap().gears.get(gear_id).cloned())
        }

        async fn gear_occupying_slot(
            &mut self,
            station_id: i16,
            slot_id: i16,
        ) -> AppResult<Option<RainGear>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .gears
                .values()
                .find(|g| g.station_id == Some(station_id) && g.slot_id == Some(slot_id))
                .cloned())
        }

        async fn set_gear_borrowed(&mut self, gear_id: &str) -> AppResult<bool> {
            let mut s = self.state.lock().unwrap();
            match s.gears.get_mut(gear_id) {
                Some(gear) if gear.status == i16::from(GearStatus::Available) => {
                    self.undo.push(Undo::Gear(gear_id.to_string(), gear.clone()));
                    gear.status = i16::from(GearStatus::Borrowed);
                    gear.station_id = None;
                    gear.slot_id = None;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn set_gear_available_at(
            &mut self,
            gear_id: &str,
            station_id: i16,
            slot_id: i16,
        ) -> AppResult<bool> {
            let mut s = self.state.lock().unwrap();
            match s.gears.get_mut(gear_id) {
                Some(gear) if gear.status == i16::from(GearStatus::Borrowed) => {
                    self.undo.push(Undo::Gear(gear_id.to_string(), gear.clone()));
                    gear.status = i16::from(GearStatus::Available);
                    gear.station_id = Some(station_id);
                    gear.slot_id = Some(slot_id);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn open_record_for_user(
            &mut self,
            user_id: &str,
        ) -> AppResult<Option<BorrowRecord>> {
            Ok(self
                .state
                .lock()
                .unwrap()
                .records
                .iter()
                .find(|r| r.user_id == user_id && r.return_time.is_none())
                .cloned())
        }

        async fn insert_record(
            &mut self,
            user_id: &str,
            gear_id: &str,
            borrow_time: DateTime<Utc>,
        ) -> AppResult<i64> {
            if self.fail_insert_record {
                return Err(AppError::Internal("simulated write failure".to_string()));
            }
            let mut s = self.state.lock().unwrap();
            s.next_record_id += 1;
            let record_id = s.next_record_id;
            s.records.push(BorrowRecord {
                record_id,
                user_id: user_id.to_string(),
                gear_id: gear_id.to_string(),
                borrow_time,
                return_time: None,
                cost: Decimal::ZERO,
            });
            self.undo.push(Undo::RecordInserted(record_id));
            Ok(record_id)
        }

        async fn close_record(
            &mut self,
            record_id: i64,
            return_time: DateTime<Utc>,
            cost: Decimal,
        ) -> AppResult<bool> {
            let mut s = self.state.lock().unwrap();
            match s
                .records
                .iter_mut()
                .find(|r| r.record_id == record_id && r.return_time.is_none())
            {
                Some(record) => {
                    self.undo.push(Undo::RecordRow(record_id, record.clone()));
                    record.return_time = Some(return_time);
                    record.cost = cost;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn slot_out_of_service(
            &mut self,
            station_id: i16,
            slot_id: i16,
        ) -> AppResult<bool> {
            let s = self.state.lock().unwrap();
            if !s.stations.contains(&station_id) {
                return Ok(true);
            }
            Ok(s.broken_slots
                .get(&station_id)
                .map(|slots| slots.contains(&slot_id))
                .unwrap_or(false))
        }

        async fn commit(self: Box<Self>) -> AppResult<()> {
            let mut this = self;
            this.committed = true;
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Fixtures
    // ------------------------------------------------------------------

    fn user(id: &str, credit: Decimal) -> User {
        User {
            user_id: id.to_string(),
            real_name: format!("User {}", id),
            password: Some("hash".to_string()),
            role: 0,
            credit,
            is_active: true,
        }
    }

    fn docked_gear(id: &str, kind: GearType, station_id: i16, slot_id: i16) -> RainGear {
        RainGear {
            gear_id: id.to_string(),
            gear_type: i16::from(kind),
            status: i16::from(GearStatus::Available),
            station_id: Some(station_id),
            slot_id: Some(slot_id),
        }
    }

    fn borrowed_gear(id: &str, kind: GearType) -> RainGear {
        RainGear {
            gear_id: id.to_string(),
            gear_type: i16::from(kind),
            status: i16::from(GearStatus::Borrowed),
            station_id: None,
            slot_id: None,
        }
    }

    fn open_record(record_id: i64, user_id: &str, gear_id: &str, hours_ago: f64) -> BorrowRecord {
        BorrowRecord {
            record_id,
            user_id: user_id.to_string(),
            gear_id: gear_id.to_string(),
            borrow_time: Utc::now() - Duration::seconds((hours_ago * 3600.0) as i64),
            return_time: None,
            cost: Decimal::ZERO,
        }
    }

    struct Harness {
        service: RentalService,
        state: Arc<Mutex<MemState>>,
    }

    fn harness(state: MemState) -> Harness {
        let state = Arc::new(Mutex::new(state));
        let store = Arc::new(MemStore {
            state: state.clone(),
            fail_insert_record: false,
        });
        Harness {
            service: RentalService::new(store),
            state,
        }
    }

    fn base_state() -> MemState {
        let mut state = MemState {
            stations: vec![1, 2],
            next_record_id: 100,
            ..MemState::default()
        };
        state
            .users
            .insert("2021001".to_string(), user("2021001", dec!(100)));
        state.gears.insert(
            "G001".to_string(),
            docked_gear("G001", GearType::StandardPlastic, 1, 1),
        );
        state
    }

    // ------------------------------------------------------------------
    // Borrow
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn borrow_debits_deposit_and_opens_record() {
        let h = harness(base_state());
        let outcome = h.service.borrow_gear("2021001", "G001").await.unwrap();
        assert!(outcome.success, "{}", outcome.message);

        let s = h.state.lock().unwrap();
        assert_eq!(s.users["2021001"].credit, dec!(90));
        let gear = &s.gears["G001"];
        assert_eq!(gear.status, i16::from(GearStatus::Borrowed));
        assert_eq!(gear.station_id, None);
        assert_eq!(gear.slot_id, None);
        let open: Vec<_> = s
            .records
            .iter()
            .filter(|r| r.user_id == "2021001" && r.return_time.is_none())
            .collect();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].gear_id, "G001");
        assert_eq!(open[0].cost, dec!(0));
    }

    #[tokio::test]
    async fn borrow_accepts_balance_exactly_equal_to_deposit() {
        let mut state = base_state();
        state.users.get_mut("2021001").unwrap().credit = dec!(10);
        let h = harness(state);

        let outcome = h.service.borrow_gear("2021001", "G001").await.unwrap();
        assert!(outcome.success);
        assert_eq!(h.state.lock().unwrap().users["2021001"].credit, dec!(0));
    }

    #[tokio::test]
    async fn borrow_rejects_insufficient_balance_and_changes_nothing() {
        let mut state = base_state();
        state.users.get_mut("2021001").unwrap().credit = dec!(15);
        state.gears.insert(
            "G005".to_string(),
            docked_gear("G005", GearType::PremiumWindproof, 1, 5),
        );
        let h = harness(state);

        let outcome = h.service.borrow_gear("2021001", "G005").await.unwrap();
        assert!(!outcome.success);
        assert_eq!(
            outcome.rejection,
            Some(RentalRejection::InsufficientBalance {
                required: dec!(20)
            })
        );
        assert!(outcome.message.contains("20"));

        let s = h.state.lock().unwrap();
        assert_eq!(s.users["2021001"].credit, dec!(15));
        assert_eq!(s.gears["G005"].status, i16::from(GearStatus::Available));
        assert!(s.records.is_empty());
    }

    #[tokio::test]
    async fn borrow_rejects_unknown_user() {
        let h = harness(base_state());
        let outcome = h.service.borrow_gear("nobody", "G001").await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::UserNotFound));
    }

    #[tokio::test]
    async fn borrow_rejects_inactive_account() {
        let mut state = base_state();
        state.users.get_mut("2021001").unwrap().is_active = false;
        let h = harness(state);

        let outcome = h.service.borrow_gear("2021001", "G001").await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::AccountInactive));
    }

    #[tokio::test]
    async fn borrow_rejects_admin_account() {
        let mut state = base_state();
        state.users.get_mut("2021001").unwrap().role = 9;
        let h = harness(state);

        let outcome = h.service.borrow_gear("2021001", "G001").await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::AdminAccount));
    }

    #[tokio::test]
    async fn borrow_rejects_user_with_outstanding_rental() {
        let mut state = base_state();
        state
            .gears
            .insert("G009".to_string(), borrowed_gear("G009", GearType::Sunshade));
        state.records.push(open_record(1, "2021001", "G009", 1.0));
        let h = harness(state);

        let outcome = h.service.borrow_gear("2021001", "G001").await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::OutstandingRental));
    }

    #[tokio::test]
    async fn borrow_rejects_unknown_gear() {
        let h = harness(base_state());
        let outcome = h.service.borrow_gear("2021001", "GXXX").await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::UnknownGear));
    }

    #[tokio::test]
    async fn borrow_rejects_borrowed_and_broken_gear() {
        let mut state = base_state();
        state
            .gears
            .insert("G010".to_string(), borrowed_gear("G010", GearType::Raincoat));
        let mut broken = docked_gear("G011", GearType::Raincoat, 1, 11);
        broken.status = i16::from(GearStatus::Broken);
        state.gears.insert("G011".to_string(), broken);
        let h = harness(state);

        for gear_id in ["G010", "G011"] {
            let outcome = h.service.borrow_gear("2021001", gear_id).await.unwrap();
            assert_eq!(outcome.rejection, Some(RentalRejection::GearUnavailable));
        }
    }

    #[tokio::test]
    async fn borrow_from_slot_resolves_the_docked_gear() {
        let h = harness(base_state());
        let outcome = h.service.borrow_from_slot("2021001", 1, 1).await.unwrap();
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(
            h.state.lock().unwrap().gears["G001"].status,
            i16::from(GearStatus::Borrowed)
        );
    }

    #[tokio::test]
    async fn borrow_from_empty_slot_is_rejected() {
        let h = harness(base_state());
        let outcome = h.service.borrow_from_slot("2021001", 1, 3).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::EmptySlot));
    }

    #[tokio::test]
    async fn borrow_from_out_of_service_slot_is_rejected() {
        let mut state = base_state();
        state.broken_slots.insert(1, vec![1]);
        let h = harness(state);

        let outcome = h.service.borrow_from_slot("2021001", 1, 1).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::SlotOutOfService));
    }

    #[tokio::test]
    async fn concurrent_borrows_of_one_gear_produce_exactly_one_winner() {
        let mut state = base_state();
        state
            .users
            .insert("2021002".to_string(), user("2021002", dec!(50)));
        let h = harness(state);

        let (a, b) = tokio::join!(
            h.service.borrow_gear("2021001", "G001"),
            h.service.borrow_gear("2021002", "G001"),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(a.success != b.success, "exactly one caller must win");
        let loser = if a.success { &b } else { &a };
        assert_eq!(loser.rejection, Some(RentalRejection::GearUnavailable));

        let s = h.state.lock().unwrap();
        let open: Vec<_> = s.records.iter().filter(|r| r.return_time.is_none()).collect();
        assert_eq!(open.len(), 1);
        // The loser's deposit must have been rolled back.
        let total: Decimal = s.users.values().map(|u| u.credit).sum();
        assert_eq!(total, dec!(140));
    }

    #[tokio::test]
    async fn borrow_rolls_back_when_a_write_step_fails() {
        let state = Arc::new(Mutex::new(base_state()));
        let store = Arc::new(MemStore {
            state: state.clone(),
            fail_insert_record: true,
        });
        let service = RentalService::new(store);

        let result = service.borrow_gear("2021001", "G001").await;
        assert!(result.is_err());

        let s = state.lock().unwrap();
        assert_eq!(s.users["2021001"].credit, dec!(100));
        assert_eq!(s.gears["G001"].status, i16::from(GearStatus::Available));
        assert!(s.records.is_empty());
    }

    // ------------------------------------------------------------------
    // Return
    // ------------------------------------------------------------------

    fn returning_state(kind: GearType, hours_ago: f64) -> MemState {
        let mut state = MemState {
            stations: vec![1, 2],
            next_record_id: 100,
            ..MemState::default()
        };
        let deposit = kind.deposit();
        let mut u = user("2021001", dec!(100));
        u.credit -= deposit;
        state.users.insert("2021001".to_string(), u);
        state
            .gears
            .insert("G001".to_string(), borrowed_gear("G001", kind));
        state
            .records
            .push(open_record(7, "2021001", "G001", hours_ago));
        state
    }

    #[tokio::test]
    async fn return_bills_ceiling_hours_and_refunds_the_rest() {
        // 3.5 h at 1/h -> 4; deposit 10 -> refund 6; balance 90 + 6 = 96.
        let h = harness(returning_state(GearType::StandardPlastic, 3.5));
        let outcome = h.service.return_gear("2021001", "G001", 1, 2).await.unwrap();

        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.cost, Some(dec!(4)));
        assert_eq!(outcome.refund, Some(dec!(6)));
        assert_eq!(
            outcome.cost.unwrap() + outcome.refund.unwrap(),
            GearType::StandardPlastic.deposit()
        );

        let s = h.state.lock().unwrap();
        assert_eq!(s.users["2021001"].credit, dec!(96));
        let gear = &s.gears["G001"];
        assert_eq!(gear.status, i16::from(GearStatus::Available));
        assert_eq!(gear.station_id, Some(1));
        assert_eq!(gear.slot_id, Some(2));
        let record = s.records.iter().find(|r| r.record_id == 7).unwrap();
        assert!(record.return_time.is_some());
        assert_eq!(record.cost, dec!(4));
    }

    #[tokio::test]
    async fn return_cost_is_capped_at_the_deposit() {
        let h = harness(returning_state(GearType::StandardPlastic, 1000.0));
        let outcome = h.service.return_gear("2021001", "G001", 1, 1).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.cost, Some(dec!(10)));
        assert_eq!(outcome.refund, Some(dec!(0)));
        // Overstaying never drives the balance below the post-borrow level.
        assert_eq!(h.state.lock().unwrap().users["2021001"].credit, dec!(90));
    }

    #[tokio::test]
    async fn return_to_a_slot_outside_the_type_range_is_rejected() {
        let h = harness(returning_state(GearType::Raincoat, 1.0));
        // Raincoats belong in 11-12.
        let outcome = h.service.return_gear("2021001", "G001", 1, 3).await.unwrap();

        assert_eq!(
            outcome.rejection,
            Some(RentalRejection::WrongReturnSlot {
                kind: GearType::Raincoat
            })
        );
        assert!(outcome.message.contains("11-12"));
        let s = h.state.lock().unwrap();
        assert_eq!(s.gears["G001"].status, i16::from(GearStatus::Borrowed));
        assert!(s.records.iter().all(|r| r.return_time.is_none()));
    }

    #[tokio::test]
    async fn return_to_an_occupied_slot_is_rejected_even_when_in_range() {
        let mut state = returning_state(GearType::StandardPlastic, 1.0);
        state.gears.insert(
            "G002".to_string(),
            docked_gear("G002", GearType::StandardPlastic, 1, 2),
        );
        let h = harness(state);

        let outcome = h.service.return_gear("2021001", "G001", 1, 2).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::SlotOccupied));
    }

    #[tokio::test]
    async fn return_to_an_out_of_service_slot_is_rejected() {
        let mut state = returning_state(GearType::StandardPlastic, 1.0);
        state.broken_slots.insert(1, vec![2]);
        let h = harness(state);

        let outcome = h.service.return_gear("2021001", "G001", 1, 2).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::SlotOutOfService));
    }

    #[tokio::test]
    async fn return_to_an_unknown_station_is_rejected() {
        let h = harness(returning_state(GearType::StandardPlastic, 1.0));
        let outcome = h.service.return_gear("2021001", "G001", 99, 2).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::SlotOutOfService));
    }

    #[tokio::test]
    async fn return_without_an_open_record_is_rejected() {
        let mut state = returning_state(GearType::StandardPlastic, 1.0);
        state.records.clear();
        let h = harness(state);

        let outcome = h.service.return_gear("2021001", "G001", 1, 2).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::NoOpenRental));
    }

    #[tokio::test]
    async fn return_of_a_different_gear_than_borrowed_is_rejected() {
        let mut state = returning_state(GearType::StandardPlastic, 1.0);
        state
            .gears
            .insert("G003".to_string(), borrowed_gear("G003", GearType::StandardPlastic));
        let h = harness(state);

        let outcome = h.service.return_gear("2021001", "G003", 1, 2).await.unwrap();
        assert_eq!(outcome.rejection, Some(RentalRejection::GearMismatch));

        let s = h.state.lock().unwrap();
        assert_eq!(s.users["2021001"].credit, dec!(90));
        assert!(s.records.iter().all(|r| r.return_time.is_none()));
    }

    #[tokio::test]
    async fn immediate_return_costs_nothing_and_refunds_the_full_deposit() {
        let h = harness(returning_state(GearType::Sunshade, 0.0));
        let outcome = h.service.return_gear("2021001", "G001", 1, 9).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.cost, Some(dec!(0)));
        assert_eq!(outcome.refund, Some(GearType::Sunshade.deposit()));
        assert_eq!(h.state.lock().unwrap().users["2021001"].credit, dec!(100));
    }
}
