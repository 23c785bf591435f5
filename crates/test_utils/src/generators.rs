//! Property-Based Test Generators
//!
//! proptest strategies that respect the domain invariants: amounts are
//! positive cents, splits sum to 100, profit percentages lie in (0, 100].

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_distribution::SplitRatio;
use domain_ledger::EntryKind;

/// Positive amounts in cents, up to 10 million
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Balances including zero and negatives
pub fn balance_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        4 => amount_strategy(),
        1 => Just(Decimal::ZERO),
        1 => amount_strategy().prop_map(|a| -a),
    ]
}

pub fn entry_kind_strategy() -> impl Strategy<Value = EntryKind> {
    prop_oneof![
        Just(EntryKind::Deposit),
        Just(EntryKind::Withdrawal),
        Just(EntryKind::Profit),
    ]
}

/// Profit percentages in (0, 100] with two decimals
pub fn profit_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..=10_000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

/// Valid splits with two-decimal exclusive share
pub fn split_strategy() -> impl Strategy<Value = SplitRatio> {
    (0u32..=10_000u32).prop_map(|n| {
        let exclusive = Decimal::new(n as i64, 2);
        SplitRatio::new(dec!(100) - exclusive, exclusive).unwrap()
    })
}

/// A distribution population: investor balances and (balance, active) partners
pub fn population_strategy() -> impl Strategy<Value = (Vec<Decimal>, Vec<(Decimal, bool)>)> {
    (
        prop::collection::vec(balance_strategy(), 0..6),
        prop::collection::vec((balance_strategy(), any::<bool>()), 0..5),
    )
}
