//! Tests for domain_distribution: periods, split configuration and the
//! distribution engine, run against the in-memory store

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{OperationMetadata, PeriodId};
use domain_distribution::{
    DistributionError, DistributionWarning, SequenceAvailability, SplitRatio, SplitSource,
};
use domain_ledger::{EntryKind, LedgerPort};
use test_utils::{
    assert_distribution_balances, assert_no_capital_warning, assert_period_processed,
    assert_profit_entries_for, DateFixtures, PeriodBuilder, TestScenario,
};

fn split(proportional: Decimal, exclusive: Decimal) -> Option<SplitRatio> {
    Some(SplitRatio::new(proportional, exclusive).unwrap())
}

fn admin() -> OperationMetadata {
    OperationMetadata::initiated_by("admin@cvm.example")
}

// ============================================================================
// Configuration Tests
// ============================================================================

mod configuration_tests {
    use super::*;

    #[tokio::test]
    async fn test_save_rejects_pairs_not_summing_to_hundred() {
        let scenario = TestScenario::new();
        let configurations = scenario.configurations();

        let rejected = configurations.save(dec!(60), dec!(39), None, "admin").await;
        assert!(matches!(rejected, Err(DistributionError::InvalidSplit(_))));
        assert!(configurations.current().await.unwrap().is_none());

        let saved = configurations.save(dec!(60), dec!(40), None, "admin").await.unwrap();
        assert_eq!(saved.ratio.proportional.value(), dec!(60));
        assert_eq!(saved.ratio.exclusive.value(), dec!(40));
    }

    #[tokio::test]
    async fn test_save_rejects_splits_finer_than_storage() {
        let scenario = TestScenario::new();
        let configurations = scenario.configurations();

        let rejected = configurations.save(dec!(33.33335), dec!(66.66665), None, "admin").await;
        assert!(matches!(rejected, Err(DistributionError::InvalidSplit(_))));
        assert!(configurations.current().await.unwrap().is_none());

        let saved = configurations.save(dec!(33.3333), dec!(66.6667), None, "admin").await.unwrap();
        assert_eq!(saved.ratio.proportional.value(), dec!(33.3333));
    }

    #[tokio::test]
    async fn test_save_rejects_negative_values() {
        let scenario = TestScenario::new();
        let result = scenario.configurations().save(dec!(105), dec!(-5), None, "admin").await;
        assert!(matches!(result, Err(DistributionError::InvalidSplit(_))));
    }

    #[tokio::test]
    async fn test_history_is_append_only_and_newest_is_current() {
        let scenario = TestScenario::new();
        let configurations = scenario.configurations();

        let first = configurations
            .save(dec!(80), dec!(20), Some("Launch".to_string()), "admin")
            .await
            .unwrap();
        let second = configurations.save(dec!(70), dec!(30), None, "admin").await.unwrap();

        let current = configurations.current().await.unwrap().unwrap();
        assert_eq!(current.id, second.id);

        let history = configurations.history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second.id);
        assert_eq!(history[1], first);
        assert_eq!(history[1].description.as_deref(), Some("Launch"));
    }
}

// ============================================================================
// Period Tests
// ============================================================================

mod period_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let scenario = TestScenario::new();
        let period = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;

        let periods = scenario.periods().list().await.unwrap();
        assert_eq!(periods, vec![period.clone()]);
        assert!(period.is_pending());
    }

    #[tokio::test]
    async fn test_second_pending_period_is_refused() {
        let scenario = TestScenario::new();
        scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;

        let result = scenario
            .periods()
            .create(PeriodBuilder::new().sequence(2).label("April 2024").month(2024, 4).build())
            .await;

        match result {
            Err(DistributionError::Validation(message)) => {
                assert!(message.contains("Process the current period first"), "{}", message)
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overlapping_period_is_refused() {
        let scenario = TestScenario::new();
        let march = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;
        scenario.investor("Ana", dec!(1000)).await;
        scenario
            .engine()
            .commit(march.id, dec!(1), split(dec!(100), dec!(0)), admin())
            .await
            .unwrap();

        let overlapping = PeriodBuilder::new()
            .sequence(2)
            .label("Mid March")
            .dates(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2024, 4, 14).unwrap(),
            )
            .build();
        let result = scenario.periods().create(overlapping).await;
        assert!(matches!(result, Err(DistributionError::Validation(_))));
    }

    #[tokio::test]
    async fn test_inverted_range_and_duplicate_sequence_are_refused() {
        let scenario = TestScenario::new();
        let periods = scenario.periods();

        let inverted = PeriodBuilder::new()
            .dates(
                chrono::NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            )
            .build();
        assert!(matches!(periods.create(inverted).await, Err(DistributionError::Validation(_))));

        let march = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;
        scenario.investor("Ana", dec!(10)).await;
        scenario
            .engine()
            .commit(march.id, dec!(5), split(dec!(100), dec!(0)), admin())
            .await
            .unwrap();

        let duplicate = PeriodBuilder::new().sequence(1).label("April 2024").month(2024, 4).build();
        assert!(matches!(periods.create(duplicate).await, Err(DistributionError::Validation(_))));
    }

    #[tokio::test]
    async fn test_next_available_sequence_number() {
        let scenario = TestScenario::new();
        scenario.investor("Ana", dec!(100)).await;
        let periods = scenario.periods();

        assert_eq!(
            periods.next_available_sequence_number().await.unwrap(),
            SequenceAvailability::Available(1)
        );

        let march = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;
        assert_eq!(
            periods.next_available_sequence_number().await.unwrap(),
            SequenceAvailability::Unavailable
        );

        scenario
            .engine()
            .commit(march.id, dec!(2), split(dec!(100), dec!(0)), admin())
            .await
            .unwrap();
        assert_eq!(
            periods.next_available_sequence_number().await.unwrap(),
            SequenceAvailability::Available(2)
        );
    }

    #[tokio::test]
    async fn test_delete_missing_period() {
        let scenario = TestScenario::new();
        let result = scenario.periods().delete(PeriodId::new()).await;
        assert!(matches!(result, Err(DistributionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_only_its_profit_entries() {
        let scenario = TestScenario::new();
        let ana = scenario.investor("Ana", dec!(1000)).await;
        let bia = scenario.partner("Bia", dec!(500)).await;
        let engine = scenario.engine();

        let march = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;
        engine.commit(march.id, dec!(10), split(dec!(70), dec!(30)), admin()).await.unwrap();

        let april = scenario.open_period(2, "April 2024", DateFixtures::month(2024, 4)).await;
        engine.commit(april.id, dec!(5), split(dec!(70), dec!(30)), admin()).await.unwrap();

        let april_entries = scenario.store.list_period_entries(april.id).await.unwrap();
        let march_entries = scenario.store.list_period_entries(march.id).await.unwrap();
        assert_eq!(april_entries.len(), 2);
        let before = scenario.store.entry_count().await;

        let removed = scenario.periods().delete(april.id).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(scenario.store.entry_count().await, before - 2);
        assert!(scenario.store.list_period_entries(april.id).await.unwrap().is_empty());
        assert_eq!(scenario.store.list_period_entries(march.id).await.unwrap(), march_entries);

        let deposits = scenario.store.list_entries(ana.owner_ref(), Some(EntryKind::Deposit)).await.unwrap();
        assert_eq!(deposits.len(), 1);
        let deposits = scenario.store.list_entries(bia.owner_ref(), Some(EntryKind::Deposit)).await.unwrap();
        assert_eq!(deposits.len(), 1);
        assert!(matches!(
            scenario.periods().get(april.id).await,
            Err(DistributionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deleting_pending_period_unblocks_creation() {
        let scenario = TestScenario::new();
        let march = scenario.open_period(1, "March 2024", DateFixtures::march_2024()).await;

        assert_eq!(scenario.periods().delete(march.id).await.unwrap(), 0);
        assert_eq!(
            scenario.periods().next_available_sequence_number().await.unwrap(),
            SequenceAvailability::Available(1)
        );
    }
}

// ============================================================================
// Engine Tests
// ============================================================================

mod engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_march_end_to_end() {
        let scenario = TestScenario::new();
        let x = scenario.investor("X", dec!(1000)).await;
        let y = scenario.partner("Y", dec!(0)).await;
        scenario.save_split(dec!(70), dec!(30)).await;
        let march = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario.engine().preview(march.id, dec!(10), None).await.unwrap();
        assert_eq!(preview.total_capital, dec!(1000));
        assert_eq!(preview.gross_profit, dec!(100));
        assert_eq!(preview.exclusive_pool, dec!(30));
        assert_eq!(preview.proportional_pool, dec!(70));
        assert!(matches!(preview.split_source, SplitSource::Configuration { .. }));
        assert!(preview.warnings.is_empty());

        let result = scenario
            .engine()
            .commit(march.id, dec!(10), None, admin())
            .await
            .unwrap();

        let period = result.distribution.period.clone();
        assert_period_processed(&period, dec!(100));
        assert_eq!(period.profit_percentage, Some(dec!(10)));
        assert_eq!(period.proportional_percentage, Some(dec!(70)));
        assert_eq!(period.exclusive_percentage, Some(dec!(30)));
        assert_eq!(period.processed_by.as_deref(), Some("admin@cvm.example"));
        assert_eq!(period.commit_id, Some(result.commit_id));

        assert_eq!(result.entries.len(), 2);
        assert_profit_entries_for(&result.entries, &period);
        let to_x = result.entries.iter().find(|e| e.owner == x.owner_ref()).unwrap();
        let to_y = result.entries.iter().find(|e| e.owner == y.owner_ref()).unwrap();
        assert_eq!(to_x.amount.value(), dec!(70));
        assert_eq!(to_y.amount.value(), dec!(30));

        let balances = scenario.balances();
        assert_eq!(balances.get_balance(x.owner_ref()).await.unwrap(), dec!(1070));
        assert_eq!(balances.get_balance(y.owner_ref()).await.unwrap(), dec!(30));
    }

    #[tokio::test]
    async fn test_tiny_pool_over_many_investors_writes_exactly_gross() {
        let scenario = TestScenario::new();
        for i in 0..9 {
            scenario.investor(&format!("I{}", i), dec!(100)).await;
        }
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        // 900 * 0.0067% = 0.0603 -> 0.06 to split nine ways
        let result = scenario
            .engine()
            .commit(period.id, dec!(0.0067), split(dec!(100), dec!(0)), admin())
            .await
            .unwrap();

        let gross = result.distribution.gross_profit;
        assert_eq!(gross, dec!(0.06));
        assert!(result.distribution.allocations.iter().all(|a| a.total >= Decimal::ZERO));

        let written: Decimal = result.entries.iter().map(|e| e.amount.value()).sum();
        assert_eq!(written, gross);
        assert_eq!(result.entries.len(), 6);
        assert!(result.entries.iter().all(|e| e.amount.value() == dec!(0.01)));
    }

    #[tokio::test]
    async fn test_proportional_fairness() {
        let scenario = TestScenario::new();
        let a = scenario.investor("A", dec!(100)).await;
        let b = scenario.investor("B", dec!(300)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(10), split(dec!(100), dec!(0)))
            .await
            .unwrap();

        assert_eq!(preview.proportional_pool, dec!(40));
        assert_eq!(preview.allocation_for(a.id).unwrap().proportional, dec!(10));
        assert_eq!(preview.allocation_for(b.id).unwrap().proportional, dec!(30));
        assert_eq!(preview.allocation_for(a.id).unwrap().capital_share, dec!(0.25));
        assert_eq!(preview.split_source, SplitSource::Override);
        assert_distribution_balances(&preview);
    }

    #[tokio::test]
    async fn test_exclusive_pool_splits_evenly_among_active_partners() {
        let scenario = TestScenario::new();
        scenario.investor("Investor", dec!(300)).await;
        let partners = vec![
            scenario.partner("P1", dec!(0)).await,
            scenario.partner("P2", dec!(0)).await,
            scenario.partner("P3", dec!(0)).await,
        ];
        let inactive = scenario.inactive_partner("P4", dec!(500)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(10), split(dec!(0), dec!(100)))
            .await
            .unwrap();

        assert_eq!(preview.total_capital, dec!(300));
        assert_eq!(preview.exclusive_pool, dec!(30));
        for partner in &partners {
            assert_eq!(preview.allocation_for(partner.id).unwrap().exclusive, dec!(10));
        }
        assert!(preview.allocation_for(inactive.id).is_none());
        assert_distribution_balances(&preview);
    }

    #[tokio::test]
    async fn test_zero_capital_warns_instead_of_failing() {
        let scenario = TestScenario::new();
        let ana = scenario.investor("Ana", dec!(0)).await;
        scenario.partner("Bia", dec!(0)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(10), split(dec!(70), dec!(30)))
            .await
            .unwrap();

        assert_no_capital_warning(&preview);
        assert_eq!(preview.gross_profit, Decimal::ZERO);
        assert!(preview.allocations.iter().all(|a| a.proportional.is_zero()));
        assert_eq!(preview.allocation_for(ana.id).unwrap().capital_share, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_zero_capital_commit_processes_without_entries() {
        let scenario = TestScenario::new();
        scenario.investor("Ana", dec!(0)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let result = scenario
            .engine()
            .commit(period.id, dec!(10), split(dec!(100), dec!(0)), admin())
            .await
            .unwrap();

        assert!(result.entries.is_empty());
        assert_period_processed(&result.distribution.period, Decimal::ZERO);
        assert_no_capital_warning(&result.distribution);
    }

    #[tokio::test]
    async fn test_negative_balance_carries_no_weight() {
        let scenario = TestScenario::new();
        let debtor = scenario.investor("Debtor", dec!(-200)).await;
        let saver = scenario.investor("Saver", dec!(1000)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(10), split(dec!(100), dec!(0)))
            .await
            .unwrap();

        assert_eq!(preview.raw_capital, dec!(800));
        assert_eq!(preview.gross_profit, dec!(80));
        assert_eq!(preview.allocation_for(debtor.id).unwrap().total, Decimal::ZERO);
        assert_eq!(preview.allocation_for(saver.id).unwrap().total, dec!(80));
    }

    #[tokio::test]
    async fn test_rounding_residue_keeps_pool_exact() {
        let scenario = TestScenario::new();
        scenario.investor("A", dec!(100)).await;
        scenario.investor("B", dec!(100)).await;
        scenario.investor("C", dec!(100)).await;
        scenario.partner("P1", dec!(0)).await;
        scenario.partner("P2", dec!(0)).await;
        scenario.partner("P3", dec!(0)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(3.33), split(dec!(66.67), dec!(33.33)))
            .await
            .unwrap();

        assert_eq!(preview.gross_profit, dec!(9.99));
        assert_distribution_balances(&preview);
        assert_eq!(preview.allocated(), preview.gross_profit);
    }

    #[tokio::test]
    async fn test_commit_twice_fails_without_side_effects() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        scenario.partner("Y", dec!(0)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let engine = scenario.engine();

        engine.commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin()).await.unwrap();
        let entries_after_first = scenario.store.entry_count().await;

        let second = engine.commit(period.id, dec!(50), split(dec!(50), dec!(50)), admin()).await;
        assert!(matches!(second, Err(DistributionError::AlreadyProcessed(_))));

        assert_eq!(scenario.store.entry_count().await, entries_after_first);
        let period = scenario.periods().get(period.id).await.unwrap();
        assert_eq!(period.gross_profit_amount, Some(dec!(100)));

        let preview = engine.preview(period.id, dec!(10), split(dec!(70), dec!(30))).await;
        assert!(matches!(preview, Err(DistributionError::AlreadyProcessed(_))));
    }

    #[tokio::test]
    async fn test_concurrent_commits_credit_once() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        scenario.partner("Y", dec!(100)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let engine = scenario.engine();

        let (first, second) = tokio::join!(
            engine.commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin()),
            engine.commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin()),
        );

        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        let failure = if first.is_err() { first.err() } else { second.err() };
        assert!(matches!(failure, Some(DistributionError::AlreadyProcessed(_))));
        assert_eq!(scenario.store.list_period_entries(period.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_failure_rolls_back_commit() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        scenario.partner("Y", dec!(100)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let engine = scenario.engine();
        let entries_before = scenario.store.entry_count().await;

        scenario.store.fail_commit_after(1).await;
        let failed = engine.commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin()).await;

        assert!(matches!(failed, Err(DistributionError::PartialWrite(_))));
        assert_eq!(scenario.store.entry_count().await, entries_before);
        assert!(scenario.periods().get(period.id).await.unwrap().is_pending());

        let retried = engine
            .commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin())
            .await
            .unwrap();
        assert_eq!(retried.entries.len(), 2);
    }

    #[tokio::test]
    async fn test_commit_refuses_unallocated_exclusive_pool() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        scenario.inactive_partner("Gone", dec!(100)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let engine = scenario.engine();

        let preview = engine.preview(period.id, dec!(10), split(dec!(70), dec!(30))).await.unwrap();
        assert_eq!(
            preview.warnings,
            vec![DistributionWarning::UnallocatedExclusivePool { amount: dec!(30) }]
        );
        assert_eq!(preview.unallocated, dec!(30));
        assert_distribution_balances(&preview);

        let commit = engine.commit(period.id, dec!(10), split(dec!(70), dec!(30)), admin()).await;
        assert!(matches!(
            commit,
            Err(DistributionError::UnallocatedExclusivePool { amount }) if amount == dec!(30)
        ));
        assert!(scenario.periods().get(period.id).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_missing_configuration() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let result = scenario.engine().preview(period.id, dec!(10), None).await;
        assert!(matches!(result, Err(DistributionError::NoConfiguration)));
    }

    #[tokio::test]
    async fn test_override_takes_precedence_over_store() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        scenario.partner("Y", dec!(0)).await;
        scenario.save_split(dec!(70), dec!(30)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        let preview = scenario
            .engine()
            .preview(period.id, dec!(10), split(dec!(50), dec!(50)))
            .await
            .unwrap();
        assert_eq!(preview.exclusive_pool, dec!(50));
        assert_eq!(preview.split_source, SplitSource::Override);
    }

    #[tokio::test]
    async fn test_profit_percentage_range() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let engine = scenario.engine();

        for invalid in [dec!(0), dec!(-1), dec!(100.01), dec!(12.345678)] {
            let result = engine.preview(period.id, invalid, split(dec!(100), dec!(0))).await;
            assert!(matches!(result, Err(DistributionError::Validation(_))), "{}", invalid);
        }
        assert!(engine.preview(period.id, dec!(100), split(dec!(100), dec!(0))).await.is_ok());
        assert!(engine.preview(period.id, dec!(12.3456), split(dec!(100), dec!(0))).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_period() {
        let scenario = TestScenario::new();
        let result = scenario.engine().preview(PeriodId::new(), dec!(10), split(dec!(100), dec!(0))).await;
        assert!(matches!(result, Err(DistributionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_preview_writes_nothing() {
        let scenario = TestScenario::new();
        scenario.investor("X", dec!(1000)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
        let before = scenario.store.entry_count().await;

        scenario.engine().preview(period.id, dec!(10), split(dec!(100), dec!(0))).await.unwrap();

        assert_eq!(scenario.store.entry_count().await, before);
        assert!(scenario.periods().get(period.id).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_credited_participants_are_notified() {
        let scenario = TestScenario::new();
        let x = scenario.investor("X", dec!(1000)).await;
        let y = scenario.partner("Y", dec!(0)).await;
        let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;

        scenario
            .engine()
            .commit(period.id, dec!(10), split(dec!(70), dec!(30)), OperationMetadata::default())
            .await
            .unwrap();

        let mut notifications = Vec::new();
        for _ in 0..50 {
            notifications = scenario.store.notifications().await;
            if notifications.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(notifications.len(), 2);
        assert!(notifications.iter().any(|n| n.owner == x.owner_ref()));
        assert!(notifications.iter().any(|n| n.owner == y.owner_ref()));
        let period = scenario.periods().get(period.id).await.unwrap();
        assert_eq!(period.processed_by.as_deref(), Some("system"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::{population_strategy, profit_percentage_strategy, split_strategy};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn distribution_always_accounts_for_gross(
            (investors, partners) in population_strategy(),
            pct in profit_percentage_strategy(),
            ratio in split_strategy(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let preview = runtime.block_on(async {
                let scenario = TestScenario::new();
                for (i, balance) in investors.iter().enumerate() {
                    scenario.investor(&format!("I{}", i), *balance).await;
                }
                for (i, (balance, active)) in partners.iter().enumerate() {
                    if *active {
                        scenario.partner(&format!("P{}", i), *balance).await;
                    } else {
                        scenario.inactive_partner(&format!("P{}", i), *balance).await;
                    }
                }
                let period = scenario.open_period(1, "March", DateFixtures::march_2024()).await;
                scenario.engine().preview(period.id, pct, Some(ratio)).await.unwrap()
            });

            assert_distribution_balances(&preview);
            for allocation in &preview.allocations {
                prop_assert!(allocation.proportional >= Decimal::ZERO);
                prop_assert!(allocation.exclusive >= Decimal::ZERO);
                prop_assert!(allocation.total >= Decimal::ZERO);
            }
            prop_assert!(preview.gross_profit >= Decimal::ZERO);
            prop_assert!(preview.total_capital >= Decimal::ZERO);
        }
    }
}
