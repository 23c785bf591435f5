//! Custom Test Assertions
//!
//! Assertion helpers for distribution results that print the allocation
//! table when they fail.

use rust_decimal::Decimal;

use domain_distribution::{AccountingPeriod, DistributionPreview, DistributionWarning};
use domain_ledger::{EntryKind, LedgerEntry};

/// Asserts that two decimals are equal after normalization
pub fn assert_decimal_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "Decimal mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the accounting identity of a distribution:
/// allocated + unallocated == gross, and each pool is either fully
/// allocated or fully reported as unallocated
pub fn assert_distribution_balances(preview: &DistributionPreview) {
    let proportional: Decimal = preview.allocations.iter().map(|a| a.proportional).sum();
    let exclusive: Decimal = preview.allocations.iter().map(|a| a.exclusive).sum();

    assert_eq!(
        preview.proportional_pool + preview.exclusive_pool,
        preview.gross_profit,
        "Pools do not add up to gross profit: {:#?}",
        preview
    );
    assert_eq!(
        preview.allocated() + preview.unallocated,
        preview.gross_profit,
        "Allocated plus unallocated differs from gross profit: {:#?}",
        preview.allocations
    );
    assert!(
        proportional == preview.proportional_pool || proportional.is_zero(),
        "Proportional shares sum to {} but pool is {}",
        proportional,
        preview.proportional_pool
    );
    assert!(
        exclusive == preview.exclusive_pool || exclusive.is_zero(),
        "Exclusive shares sum to {} but pool is {}",
        exclusive,
        preview.exclusive_pool
    );
    for allocation in &preview.allocations {
        assert!(
            allocation.proportional >= Decimal::ZERO && allocation.exclusive >= Decimal::ZERO,
            "Negative share for {}: {:?}",
            allocation.name,
            allocation
        );
    }
}

/// Asserts that a preview carries the zero-capital warning
pub fn assert_no_capital_warning(preview: &DistributionPreview) {
    assert!(
        preview
            .warnings
            .iter()
            .any(|w| matches!(w, DistributionWarning::NoCapital { .. })),
        "Expected a NoCapital warning, got {:?}",
        preview.warnings
    );
}

/// Asserts that a period was processed with the given gross profit
pub fn assert_period_processed(period: &AccountingPeriod, gross_profit: Decimal) {
    assert!(period.processed, "Period {} is still pending", period.label);
    assert!(period.processed_at.is_some(), "Period {} has no processed_at", period.label);
    assert_eq!(
        period.gross_profit_amount,
        Some(gross_profit),
        "Unexpected gross profit on period {}",
        period.label
    );
}

/// Asserts that every entry is a profit entry tagged with the period
pub fn assert_profit_entries_for(entries: &[LedgerEntry], period: &AccountingPeriod) {
    for entry in entries {
        assert_eq!(entry.kind, EntryKind::Profit, "Unexpected entry kind: {:?}", entry);
        assert_eq!(entry.period_id, Some(period.id), "Entry not tagged with period: {:?}", entry);
    }
}
