//! Balance calculation
//!
//! Balances are derived, never stored. Every number here is a fold over
//! ledger entries:
//!
//! ```text
//! balance = Σ deposit + Σ profit − Σ withdrawal
//! ```
//!
//! The fold is commutative, so the result does not depend on the order the
//! store returns entries in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use domain_participant::{OwnerRef, Participant, ParticipantDirectory, ParticipantDirectoryExt};

use crate::entry::{EntryKind, LedgerEntry};
use crate::error::LedgerError;
use crate::ports::LedgerPort;

/// Signed sum of the given entries
///
/// An empty iterator yields zero. The result may be negative if withdrawals
/// exceed deposits and profits.
pub fn compute_balance<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries.into_iter().map(LedgerEntry::signed_amount).sum()
}

/// Per-kind totals for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub profits: Decimal,
    pub balance: Decimal,
    pub entry_count: usize,
}

impl BalanceSummary {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut summary = Self::default();
        for entry in entries {
            let value = entry.amount.value();
            match entry.kind {
                EntryKind::Deposit => summary.deposits += value,
                EntryKind::Withdrawal => summary.withdrawals += value,
                EntryKind::Profit => summary.profits += value,
            }
            summary.entry_count += 1;
        }
        summary.balance = summary.deposits + summary.profits - summary.withdrawals;
        summary
    }
}

/// A participant together with its current balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant: Participant,
    pub balance: Decimal,
}

/// Total invested capital over the eligible participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalSummary {
    /// Capital reported to callers, never below zero
    pub total: Decimal,
    /// Unclamped sum, kept for diagnostics
    pub raw: Decimal,
    /// Eligible participants in creation order
    pub participants: Vec<ParticipantBalance>,
}

impl CapitalSummary {
    pub fn from_balances(participants: Vec<ParticipantBalance>) -> Self {
        let raw: Decimal = participants.iter().map(|p| p.balance).sum();
        Self {
            total: raw.max(Decimal::ZERO),
            raw,
            participants,
        }
    }
}

/// What a participant's dashboard shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub participant: Participant,
    pub summary: BalanceSummary,
    /// Entries, oldest first
    pub entries: Vec<LedgerEntry>,
}

/// Read-only balance service over the ledger and the participant directory
#[derive(Clone)]
pub struct BalanceCalculator {
    ledger: Arc<dyn LedgerPort>,
    directory: Arc<dyn ParticipantDirectory>,
}

impl BalanceCalculator {
    pub fn new(ledger: Arc<dyn LedgerPort>, directory: Arc<dyn ParticipantDirectory>) -> Self {
        Self { ledger, directory }
    }

    /// Current balance of one participant
    ///
    /// # Errors
    ///
    /// `LedgerError::NotFound` if the owner does not exist or is registered
    /// under a different kind.
    pub async fn get_balance(&self, owner: OwnerRef) -> Result<Decimal, LedgerError> {
        self.resolve_owner(owner).await?;
        let entries = self.ledger.list_entries(owner, None).await?;
        Ok(compute_balance(&entries))
    }

    /// Totals and entry list for one participant
    pub async fn statement(&self, owner: OwnerRef) -> Result<Statement, LedgerError> {
        let participant = self.resolve_owner(owner).await?;
        let mut entries = self.ledger.list_entries(owner, None).await?;
        entries.sort_by_key(|e| e.timestamp);
        Ok(Statement {
            participant,
            summary: BalanceSummary::from_entries(&entries),
            entries,
        })
    }

    /// Balances of every eligible participant (investors and active partners)
    ///
    /// Reads the ledger once and groups entries by owner.
    pub async fn eligible_balances(&self) -> Result<Vec<ParticipantBalance>, LedgerError> {
        let participants = self.directory.list_eligible().await?;
        let entries = self.ledger.list_all_entries().await?;

        let mut totals: HashMap<OwnerRef, Decimal> = HashMap::new();
        for entry in &entries {
            *totals.entry(entry.owner).or_default() += entry.signed_amount();
        }

        Ok(participants
            .into_iter()
            .map(|participant| {
                let balance = totals
                    .get(&participant.owner_ref())
                    .copied()
                    .unwrap_or_default();
                ParticipantBalance { participant, balance }
            })
            .collect())
    }

    /// Total invested capital over investors and active partners
    ///
    /// Inactive partners are left out; their entries stay in the ledger.
    pub async fn total_invested_capital(&self) -> Result<CapitalSummary, LedgerError> {
        let balances = self.eligible_balances().await?;
        Ok(CapitalSummary::from_balances(balances))
    }

    async fn resolve_owner(&self, owner: OwnerRef) -> Result<Participant, LedgerError> {
        let participant = self.directory.get_participant(owner.id).await?;
        if participant.kind != owner.kind {
            return Err(LedgerError::NotFound(format!("{}", owner)));
        }
        Ok(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewLedgerEntry;
    use core_kernel::{Amount, ParticipantId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn entry(owner: OwnerRef, kind: EntryKind, cents: i64) -> LedgerEntry {
        let amount = Amount::new(Decimal::new(cents, 2)).unwrap();
        NewLedgerEntry::new(owner, kind, amount).into_entry()
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        assert_eq!(compute_balance(&Vec::<LedgerEntry>::new()), Decimal::ZERO);
        assert_eq!(BalanceSummary::from_entries(&Vec::<LedgerEntry>::new()), BalanceSummary::default());
    }

    #[test]
    fn test_summary_totals() {
        let owner = OwnerRef::investor(ParticipantId::new());
        let entries = vec![
            entry(owner, EntryKind::Deposit, 100_000),
            entry(owner, EntryKind::Profit, 7_000),
            entry(owner, EntryKind::Withdrawal, 20_050),
        ];
        let summary = BalanceSummary::from_entries(&entries);

        assert_eq!(summary.deposits, dec!(1000));
        assert_eq!(summary.profits, dec!(70));
        assert_eq!(summary.withdrawals, dec!(200.50));
        assert_eq!(summary.balance, dec!(869.50));
        assert_eq!(summary.balance, compute_balance(&entries));
    }

    #[test]
    fn test_negative_balance_does_not_fail() {
        let owner = OwnerRef::partner(ParticipantId::new());
        let entries = vec![
            entry(owner, EntryKind::Deposit, 1_000),
            entry(owner, EntryKind::Withdrawal, 5_000),
        ];
        assert_eq!(compute_balance(&entries), dec!(-40));
    }

    #[test]
    fn test_capital_is_clamped() {
        let investor = Participant::new(domain_participant::NewParticipant::investor("Ana")).unwrap();
        let summary = CapitalSummary::from_balances(vec![ParticipantBalance {
            participant: investor,
            balance: dec!(-12.30),
        }]);
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.raw, dec!(-12.30));
    }

    fn kind_strategy() -> impl Strategy<Value = EntryKind> {
        prop_oneof![
            Just(EntryKind::Deposit),
            Just(EntryKind::Withdrawal),
            Just(EntryKind::Profit),
        ]
    }

    proptest! {
        #[test]
        fn balance_is_order_independent(
            (raw, shuffled) in prop::collection::vec((kind_strategy(), 1i64..10_000_000), 0..40)
                .prop_flat_map(|raw| (Just(raw.clone()), Just(raw).prop_shuffle())),
        ) {
            let owner = OwnerRef::investor(ParticipantId::new());
            let build = |raw: &[(EntryKind, i64)]| -> Vec<LedgerEntry> {
                raw.iter().map(|(kind, cents)| entry(owner, *kind, *cents)).collect()
            };

            let expected: Decimal = raw
                .iter()
                .map(|(kind, cents)| kind.sign() * Decimal::new(*cents, 2))
                .sum();

            prop_assert_eq!(compute_balance(&build(raw.as_slice())), expected);
            prop_assert_eq!(compute_balance(&build(shuffled.as_slice())), expected);
        }
    }
}
