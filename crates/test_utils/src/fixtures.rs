//! Pre-built Test Fixtures
//!
//! Ready-made dates, ids and a seeded in-memory scenario. Fixtures are
//! deterministic so failures are reproducible.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{Amount, ParticipantId, PeriodId};
use domain_distribution::{
    AccountingPeriod, ConfigurationService, DistributionEngine, InMemoryStore, NewPeriod,
    PeriodManager, SplitConfiguration,
};
use domain_ledger::{
    ApprovalService, BalanceCalculator, CorrectionService, LedgerEntry, LedgerPort, NewLedgerEntry,
};
use domain_participant::{NewParticipant, OwnerRef, Participant, ParticipantDirectory};

/// Calendar fixtures
pub struct DateFixtures;

impl DateFixtures {
    /// First and last day of a month
    pub fn month(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
        let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
        };
        (start, next.pred_opt().unwrap())
    }

    pub fn march_2024() -> (NaiveDate, NaiveDate) {
        Self::month(2024, 3)
    }

    /// A timestamp before every fixture period
    pub fn opening_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
    }
}

/// Deterministic identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn participant_id() -> ParticipantId {
        ParticipantId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    pub fn period_id() -> PeriodId {
        PeriodId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }
}

/// Decimal fixtures
pub struct AmountFixtures;

impl AmountFixtures {
    pub fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    pub fn standard_deposit() -> Amount {
        Self::amount(dec!(1000))
    }
}

/// A fresh in-memory store plus helpers to seed it and build services on it
#[derive(Clone, Default)]
pub struct TestScenario {
    pub store: Arc<InMemoryStore>,
}

impl TestScenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an investor whose balance is `balance`
    pub async fn investor(&self, name: &str, balance: Decimal) -> Participant {
        self.participant(NewParticipant::investor(name), balance, true).await
    }

    /// Registers an active partner whose balance is `balance`
    pub async fn partner(&self, name: &str, balance: Decimal) -> Participant {
        self.participant(NewParticipant::partner(name), balance, true).await
    }

    /// Registers a deactivated partner whose balance is `balance`
    pub async fn inactive_partner(&self, name: &str, balance: Decimal) -> Participant {
        self.participant(NewParticipant::partner(name), balance, false).await
    }

    async fn participant(&self, request: NewParticipant, balance: Decimal, active: bool) -> Participant {
        let participant = Participant::new(request).unwrap();
        let mut participant = self.store.create_participant(participant).await.unwrap();
        if !active {
            participant = self.store.set_active(participant.id, false).await.unwrap();
        }

        let owner = participant.owner_ref();
        if balance > Decimal::ZERO {
            self.deposit(owner, balance).await;
        } else if balance < Decimal::ZERO {
            self.withdraw(owner, -balance).await;
        }
        participant
    }

    pub async fn deposit(&self, owner: OwnerRef, amount: Decimal) -> LedgerEntry {
        self.store
            .append_entry(
                NewLedgerEntry::deposit(owner, AmountFixtures::amount(amount))
                    .dated(DateFixtures::opening_day()),
            )
            .await
            .unwrap()
    }

    pub async fn withdraw(&self, owner: OwnerRef, amount: Decimal) -> LedgerEntry {
        self.store
            .append_entry(
                NewLedgerEntry::withdrawal(owner, AmountFixtures::amount(amount))
                    .dated(DateFixtures::opening_day()),
            )
            .await
            .unwrap()
    }

    /// Opens a pending period covering one calendar month
    pub async fn open_period(&self, sequence_number: u32, label: &str, month: (NaiveDate, NaiveDate)) -> AccountingPeriod {
        self.periods()
            .create(NewPeriod::new(sequence_number, label, month.0, month.1))
            .await
            .unwrap()
    }

    /// Saves a split configuration, which becomes current
    pub async fn save_split(&self, proportional: Decimal, exclusive: Decimal) -> SplitConfiguration {
        self.configurations()
            .save(proportional, exclusive, None, "fixture")
            .await
            .unwrap()
    }

    pub fn engine(&self) -> DistributionEngine {
        DistributionEngine::from_store(self.store.clone(), self.store.clone())
    }

    pub fn periods(&self) -> PeriodManager {
        PeriodManager::new(self.store.clone())
    }

    pub fn configurations(&self) -> ConfigurationService {
        ConfigurationService::new(self.store.clone())
    }

    pub fn balances(&self) -> BalanceCalculator {
        BalanceCalculator::new(self.store.clone(), self.store.clone())
    }

    pub fn approvals(&self) -> ApprovalService {
        ApprovalService::new(self.store.clone(), self.store.clone(), self.store.clone())
    }

    pub fn corrections(&self) -> CorrectionService {
        CorrectionService::new(self.store.clone())
    }
}
