//! Tests for domain_ledger

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Amount, LedgerEntryId, ParticipantId, PeriodId};
use domain_participant::OwnerRef;

use domain_ledger::{
    compute_balance, ApprovalRequest, BalanceSummary, EntryKind, LedgerEntry, LedgerError,
    NewLedgerEntry, RequestKind, RequestQuery, RequestStatus,
};

fn amount(value: Decimal) -> Amount {
    Amount::new(value).unwrap()
}

// ============================================================================
// Entry Tests
// ============================================================================

mod entry_tests {
    use super::*;

    #[test]
    fn test_entry_amount_must_be_positive() {
        assert!(Amount::new(dec!(0)).is_err());
        assert!(Amount::new(dec!(-10)).is_err());
    }

    #[test]
    fn test_dated_entry_keeps_timestamp() {
        let owner = OwnerRef::investor(ParticipantId::new());
        let at = Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap();
        let entry = NewLedgerEntry::deposit(owner, amount(dec!(10)))
            .dated(at)
            .with_description("Initial deposit")
            .into_entry();

        assert_eq!(entry.timestamp, at);
        assert_eq!(entry.description, "Initial deposit");
        assert_eq!(entry.owner, owner);
    }

    #[test]
    fn test_profit_entry_carries_period() {
        let period = PeriodId::new();
        let entry = NewLedgerEntry::profit(OwnerRef::partner(ParticipantId::new()), amount(dec!(30)))
            .for_period(period)
            .into_entry();

        assert_eq!(entry.kind, EntryKind::Profit);
        assert_eq!(entry.period_id, Some(period));
    }

    #[test]
    fn test_entry_serializes_kind_in_snake_case() {
        let entry = NewLedgerEntry::withdrawal(OwnerRef::investor(ParticipantId::new()), amount(dec!(1.5)))
            .into_entry();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "withdrawal");
        assert_eq!(json["owner"]["kind"], "investor");
    }
}

// ============================================================================
// Balance Tests
// ============================================================================

mod balance_tests {
    use super::*;

    fn history(owner: OwnerRef) -> Vec<LedgerEntry> {
        vec![
            NewLedgerEntry::deposit(owner, amount(dec!(1000))).into_entry(),
            NewLedgerEntry::deposit(owner, amount(dec!(250))).into_entry(),
            NewLedgerEntry::withdrawal(owner, amount(dec!(300))).into_entry(),
            NewLedgerEntry::profit(owner, amount(dec!(95.25))).into_entry(),
        ]
    }

    #[test]
    fn test_balance_is_the_fold() {
        let owner = OwnerRef::investor(ParticipantId::new());
        assert_eq!(compute_balance(&history(owner)), dec!(1045.25));
    }

    #[test]
    fn test_balance_ignores_order() {
        let owner = OwnerRef::investor(ParticipantId::new());
        let mut entries = history(owner);
        let forward = compute_balance(&entries);
        entries.reverse();
        assert_eq!(compute_balance(&entries), forward);
    }

    #[test]
    fn test_summary_counts_entries() {
        let owner = OwnerRef::partner(ParticipantId::new());
        let summary = BalanceSummary::from_entries(&history(owner));
        assert_eq!(summary.entry_count, 4);
        assert_eq!(summary.deposits, dec!(1250));
        assert_eq!(summary.withdrawals, dec!(300));
        assert_eq!(summary.profits, dec!(95.25));
    }
}

// ============================================================================
// Request Tests
// ============================================================================

mod request_tests {
    use super::*;

    #[test]
    fn test_new_request_is_pending() {
        let request = ApprovalRequest::new(
            OwnerRef::investor(ParticipantId::new()),
            RequestKind::Deposit,
            amount(dec!(500)),
        )
        .with_note("Wire transfer 12/03");

        assert!(request.is_pending());
        assert_eq!(request.note.as_deref(), Some("Wire transfer 12/03"));
        assert!(request.decided_at.is_none());
    }

    #[test]
    fn test_request_kind_maps_to_entry_kind() {
        assert_eq!(RequestKind::Deposit.entry_kind(), EntryKind::Deposit);
        assert_eq!(RequestKind::Withdrawal.entry_kind(), EntryKind::Withdrawal);
    }

    #[test]
    fn test_rejected_request_cannot_be_rejected_again() {
        let mut request = ApprovalRequest::new(
            OwnerRef::partner(ParticipantId::new()),
            RequestKind::Withdrawal,
            amount(dec!(20)),
        );
        request.reject("Duplicate of an earlier request", "admin").unwrap();
        assert!(matches!(
            request.reject("again", "admin"),
            Err(LedgerError::InvalidState(_))
        ));
        assert_eq!(
            request.status,
            RequestStatus::Rejected { reason: "Duplicate of an earlier request".to_string() }
        );
    }

    #[test]
    fn test_status_serialization_is_tagged() {
        let entry_id = LedgerEntryId::new();
        let json = serde_json::to_value(RequestStatus::Approved { entry_id }).unwrap();
        assert_eq!(json["status"], "approved");
        assert_eq!(json["entry_id"], serde_json::to_value(entry_id).unwrap());
    }

    #[test]
    fn test_query_matching() {
        let owner = OwnerRef::investor(ParticipantId::new());
        let mut request = ApprovalRequest::new(owner, RequestKind::Deposit, amount(dec!(5)));

        assert!(RequestQuery::pending().matches(&request));
        assert!(RequestQuery::for_owner(owner).matches(&request));
        assert!(!RequestQuery::for_owner(OwnerRef::investor(ParticipantId::new())).matches(&request));

        request.approve(LedgerEntryId::new(), "admin").unwrap();
        assert!(!RequestQuery::pending().matches(&request));
        assert!(RequestQuery::for_owner(owner).matches(&request));
    }
}
