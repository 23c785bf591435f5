//! Test Data Builders
//!
//! Builders with sensible defaults so tests only spell out the fields they
//! care about.

use chrono::{DateTime, NaiveDate, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Amount, PeriodId};
use domain_distribution::NewPeriod;
use domain_ledger::{EntryKind, LedgerEntry, NewLedgerEntry};
use domain_participant::{NewParticipant, OwnerRef, Participant, ParticipantKind};

use crate::fixtures::{DateFixtures, IdFixtures};

/// Builder for participants
pub struct ParticipantBuilder {
    kind: ParticipantKind,
    name: String,
    email: Option<String>,
    active: bool,
}

impl Default for ParticipantBuilder {
    fn default() -> Self {
        Self::investor()
    }
}

impl ParticipantBuilder {
    pub fn investor() -> Self {
        Self {
            kind: ParticipantKind::Investor,
            name: Name().fake(),
            email: None,
            active: true,
        }
    }

    pub fn partner() -> Self {
        Self {
            kind: ParticipantKind::Partner,
            ..Self::investor()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Gives the participant a random valid email
    pub fn with_email(mut self) -> Self {
        self.email = Some(SafeEmail().fake());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn request(&self) -> NewParticipant {
        NewParticipant {
            kind: self.kind,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    pub fn build(self) -> Participant {
        let mut participant = Participant::new(self.request()).unwrap();
        if !self.active {
            participant.set_active(false).unwrap();
        }
        participant
    }
}

/// Builder for period requests
pub struct PeriodBuilder {
    sequence_number: u32,
    label: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl Default for PeriodBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PeriodBuilder {
    /// Period 1, "March 2024"
    pub fn new() -> Self {
        let (start, end) = DateFixtures::march_2024();
        Self {
            sequence_number: 1,
            label: "March 2024".to_string(),
            start,
            end,
        }
    }

    pub fn sequence(mut self, sequence_number: u32) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Covers a whole calendar month
    pub fn month(mut self, year: i32, month: u32) -> Self {
        let (start, end) = DateFixtures::month(year, month);
        self.start = start;
        self.end = end;
        self
    }

    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn build(self) -> NewPeriod {
        NewPeriod::new(self.sequence_number, self.label, self.start, self.end)
    }
}

/// Builder for ledger entries
pub struct LedgerEntryBuilder {
    owner: OwnerRef,
    kind: EntryKind,
    amount: Decimal,
    timestamp: DateTime<Utc>,
    period_id: Option<PeriodId>,
}

impl LedgerEntryBuilder {
    pub fn new(owner: OwnerRef) -> Self {
        Self {
            owner,
            kind: EntryKind::Deposit,
            amount: dec!(100),
            timestamp: DateFixtures::opening_day(),
            period_id: None,
        }
    }

    pub fn deposit(mut self, amount: Decimal) -> Self {
        self.kind = EntryKind::Deposit;
        self.amount = amount;
        self
    }

    pub fn withdrawal(mut self, amount: Decimal) -> Self {
        self.kind = EntryKind::Withdrawal;
        self.amount = amount;
        self
    }

    /// Profit entry tagged with a period (the fixture period if none given)
    pub fn profit(mut self, amount: Decimal, period_id: Option<PeriodId>) -> Self {
        self.kind = EntryKind::Profit;
        self.amount = amount;
        self.period_id = Some(period_id.unwrap_or_else(IdFixtures::period_id));
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn request(&self) -> NewLedgerEntry {
        let mut entry = NewLedgerEntry::new(self.owner, self.kind, Amount::new(self.amount).unwrap())
            .dated(self.timestamp);
        entry.period_id = self.period_id;
        entry
    }

    pub fn build(self) -> LedgerEntry {
        self.request().into_entry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_builder_defaults() {
        let investor = ParticipantBuilder::investor().named("Ana").build();
        assert_eq!(investor.name, "Ana");
        assert!(investor.is_eligible());

        let partner = ParticipantBuilder::partner().with_email().inactive().build();
        assert!(partner.is_partner());
        assert!(!partner.is_eligible());
        assert!(partner.email.is_some());
    }

    #[test]
    fn test_period_builder() {
        let request = PeriodBuilder::new().sequence(4).label("April").month(2024, 4).build();
        assert_eq!(request.sequence_number, 4);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_entry_builder_profit_is_tagged() {
        let owner = ParticipantBuilder::investor().build().owner_ref();
        let entry = LedgerEntryBuilder::new(owner).profit(dec!(12.5), None).build();
        assert_eq!(entry.kind, EntryKind::Profit);
        assert_eq!(entry.period_id, Some(IdFixtures::period_id()));
        assert_eq!(entry.signed_amount(), dec!(12.5));
    }
}
