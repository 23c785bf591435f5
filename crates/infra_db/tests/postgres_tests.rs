//! PostgreSQL adapter tests
//!
//! Each test starts its own container and applies the schema. They are
//! ignored by default; run them with `cargo test -p infra_db -- --ignored`.

use std::sync::Arc;

use rust_decimal_macros::dec;

use core_kernel::{Amount, HealthCheckable, AdapterHealth, OperationMetadata, PeriodId};
use domain_distribution::{
    ConfigurationService, DistributionEngine, DistributionError, NewPeriod, PeriodManager,
    PeriodPort, SplitRatio,
};
use domain_ledger::{
    ApprovalService, BalanceCalculator, CorrectionService, EntryKind, LedgerError, LedgerPort,
    NewLedgerEntry, RequestKind,
};
use domain_participant::{
    NewParticipant, Participant, ParticipantDirectory, ParticipantDirectoryExt, ParticipantKind,
};
use infra_db::PostgresStore;
use test_utils::{count_rows, db_test, DateFixtures};

async fn register(store: &Arc<PostgresStore>, request: NewParticipant) -> Participant {
    store
        .create_participant(Participant::new(request).unwrap())
        .await
        .unwrap()
}

async fn deposit(store: &Arc<PostgresStore>, participant: &Participant, amount: rust_decimal::Decimal) {
    store
        .append_entry(
            NewLedgerEntry::deposit(participant.owner_ref(), Amount::new(amount).unwrap())
                .dated(DateFixtures::opening_day()),
        )
        .await
        .unwrap();
}

fn engine(store: &Arc<PostgresStore>) -> DistributionEngine {
    DistributionEngine::from_store(store.clone(), store.clone())
}

fn split(proportional: rust_decimal::Decimal, exclusive: rust_decimal::Decimal) -> Option<SplitRatio> {
    Some(SplitRatio::new(proportional, exclusive).unwrap())
}

async fn open_march(store: &Arc<PostgresStore>) -> domain_distribution::AccountingPeriod {
    let (start, end) = DateFixtures::march_2024();
    PeriodManager::new(store.clone())
        .create(NewPeriod::new(1, "March 2024", start, end))
        .await
        .unwrap()
}

db_test!(test_health_check, |db, store| {
    let result = store.health_check().await;
    assert_eq!(result.status, AdapterHealth::Healthy);
    assert!(db.pool().size() > 0);
});

db_test!(test_participant_directory, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana").with_email("ana@example.com")).await;
    let bia = register(&store, NewParticipant::partner("Bia")).await;

    let fetched = store.get_participant(ana.id).await.unwrap();
    assert_eq!(fetched.email.as_deref(), Some("ana@example.com"));

    store.set_active(bia.id, false).await.unwrap();
    assert!(store.list_active_participants(ParticipantKind::Partner).await.unwrap().is_empty());
    assert_eq!(store.list_eligible().await.unwrap().len(), 1);

    let investor_toggle = store.set_active(ana.id, false).await;
    assert!(investor_toggle.is_err());
    assert_eq!(count_rows(db.pool(), "participants").await, 2);
});

db_test!(test_ledger_balances_and_constraints, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana")).await;
    deposit(&store, &ana, dec!(1000)).await;
    store
        .append_entry(NewLedgerEntry::withdrawal(ana.owner_ref(), Amount::new(dec!(250.50)).unwrap()))
        .await
        .unwrap();

    let balances = BalanceCalculator::new(store.clone(), store.clone());
    assert_eq!(balances.get_balance(ana.owner_ref()).await.unwrap(), dec!(749.50));

    let tagged_deposit = NewLedgerEntry::deposit(ana.owner_ref(), Amount::new(dec!(1)).unwrap())
        .for_period(PeriodId::new());
    assert!(store.append_entry(tagged_deposit).await.is_err());

    let wrong_kind = NewLedgerEntry::deposit(
        domain_participant::OwnerRef::partner(ana.id),
        Amount::new(dec!(1)).unwrap(),
    );
    assert!(store.append_entry(wrong_kind).await.unwrap_err().is_not_found());
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
});

db_test!(test_march_distribution_end_to_end, |db, store| {
    let x = register(&store, NewParticipant::investor("X")).await;
    let y = register(&store, NewParticipant::partner("Y")).await;
    deposit(&store, &x, dec!(1000)).await;
    ConfigurationService::new(store.clone())
        .save(dec!(70), dec!(30), None, "admin")
        .await
        .unwrap();
    let march = open_march(&store).await;

    let result = engine(&store)
        .commit(march.id, dec!(10), None, OperationMetadata::initiated_by("admin"))
        .await
        .unwrap();

    assert_eq!(result.entries.len(), 2);
    let period = store.get_period(march.id).await.unwrap();
    assert!(period.processed);
    assert_eq!(period.gross_profit_amount, Some(dec!(100)));
    assert_eq!(period.commit_id, Some(result.commit_id));

    let balances = BalanceCalculator::new(store.clone(), store.clone());
    assert_eq!(balances.get_balance(x.owner_ref()).await.unwrap(), dec!(1070));
    assert_eq!(balances.get_balance(y.owner_ref()).await.unwrap(), dec!(30));
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 3);
});

db_test!(test_second_commit_is_refused, |db, store| {
    let x = register(&store, NewParticipant::investor("X")).await;
    deposit(&store, &x, dec!(1000)).await;
    let march = open_march(&store).await;
    let engine = engine(&store);

    engine
        .commit(march.id, dec!(10), split(dec!(100), dec!(0)), OperationMetadata::default())
        .await
        .unwrap();
    let second = engine
        .commit(march.id, dec!(10), split(dec!(100), dec!(0)), OperationMetadata::default())
        .await;

    assert!(matches!(second, Err(DistributionError::AlreadyProcessed(_))));
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
});

db_test!(test_concurrent_commits_credit_once, |db, store| {
    let x = register(&store, NewParticipant::investor("X")).await;
    deposit(&store, &x, dec!(1000)).await;
    let march = open_march(&store).await;
    let engine = engine(&store);

    let (first, second) = tokio::join!(
        engine.commit(march.id, dec!(10), split(dec!(100), dec!(0)), OperationMetadata::default()),
        engine.commit(march.id, dec!(10), split(dec!(100), dec!(0)), OperationMetadata::default()),
    );

    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(store.list_period_entries(march.id).await.unwrap().len(), 1);
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
});

db_test!(test_period_constraints, |db, store| {
    let x = register(&store, NewParticipant::investor("X")).await;
    deposit(&store, &x, dec!(1000)).await;
    let march = open_march(&store).await;

    // The store refuses a second pending period on its own
    let (start, end) = DateFixtures::month(2024, 4);
    let april = domain_distribution::AccountingPeriod::new(NewPeriod::new(2, "April 2024", start, end)).unwrap();
    assert!(store.insert_period(april.clone()).await.unwrap_err().is_conflict());

    engine(&store)
        .commit(march.id, dec!(5), split(dec!(100), dec!(0)), OperationMetadata::default())
        .await
        .unwrap();

    let (overlap_start, _) = DateFixtures::march_2024();
    let overlapping = domain_distribution::AccountingPeriod::new(NewPeriod::new(
        3,
        "Overlap",
        overlap_start,
        end,
    ))
    .unwrap();
    assert!(store.insert_period(overlapping).await.unwrap_err().is_conflict());

    store.insert_period(april).await.unwrap();
    assert_eq!(count_rows(db.pool(), "accounting_periods").await, 2);
});

db_test!(test_period_delete_cascades, |db, store| {
    let x = register(&store, NewParticipant::investor("X")).await;
    let y = register(&store, NewParticipant::investor("Y")).await;
    deposit(&store, &x, dec!(1000)).await;
    deposit(&store, &y, dec!(500)).await;
    let march = open_march(&store).await;
    engine(&store)
        .commit(march.id, dec!(10), split(dec!(100), dec!(0)), OperationMetadata::default())
        .await
        .unwrap();

    let removed = PeriodManager::new(store.clone()).delete(march.id).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
    assert_eq!(count_rows(db.pool(), "accounting_periods").await, 0);
});

db_test!(test_request_approval_flow, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana")).await;
    deposit(&store, &ana, dec!(100)).await;
    let approvals = ApprovalService::new(store.clone(), store.clone(), store.clone());

    let request = approvals
        .submit(ana.owner_ref(), RequestKind::Withdrawal, dec!(40), None)
        .await
        .unwrap();
    let duplicate = approvals
        .submit(ana.owner_ref(), RequestKind::Withdrawal, dec!(10), None)
        .await;
    assert!(matches!(duplicate, Err(LedgerError::DuplicatePendingRequest { .. })));

    let (approved, entry) = approvals.approve(request.id, "admin").await.unwrap();
    assert!(!approved.is_pending());
    assert_eq!(entry.kind, EntryKind::Withdrawal);

    let again = approvals.reject(request.id, "Too late", "admin").await;
    assert!(matches!(again, Err(LedgerError::InvalidState(_))));
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
});

db_test!(test_participant_delete_cascades, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana")).await;
    let bia = register(&store, NewParticipant::investor("Bia")).await;
    deposit(&store, &ana, dec!(100)).await;
    deposit(&store, &ana, dec!(50)).await;
    deposit(&store, &bia, dec!(10)).await;
    ApprovalService::new(store.clone(), store.clone(), store.clone())
        .submit(ana.owner_ref(), RequestKind::Deposit, dec!(5), None)
        .await
        .unwrap();

    let removed = store.delete_participant(ana.id).await.unwrap();

    assert_eq!(removed, 2);
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 1);
    assert_eq!(count_rows(db.pool(), "approval_requests").await, 0);
    assert!(store.get_participant(ana.id).await.unwrap_err().is_not_found());
});

db_test!(test_entry_corrections, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana")).await;
    deposit(&store, &ana, dec!(1000)).await;
    let entry = store.list_entries(ana.owner_ref(), None).await.unwrap().remove(0);
    let corrections = CorrectionService::new(store.clone());
    let admin = OperationMetadata::initiated_by("admin");

    let corrected = corrections
        .correct(entry.id, dec!(100), "Deposit was 100".to_string(), &admin)
        .await
        .unwrap();
    assert_eq!(corrected.amount.value(), dec!(100));
    assert_eq!(store.get_entry(entry.id).await.unwrap().description, "Deposit was 100");

    corrections.delete(entry.id, &admin).await.unwrap();
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 0);
    assert!(matches!(
        corrections.delete(entry.id, &admin).await,
        Err(LedgerError::NotFound(_))
    ));
});

db_test!(test_percentages_round_trip_unchanged, |db, store| {
    let ana = register(&store, NewParticipant::investor("Ana")).await;
    deposit(&store, &ana, dec!(1000)).await;
    let march = open_march(&store).await;

    let saved = ConfigurationService::new(store.clone())
        .save(dec!(33.3333), dec!(66.6667), None, "admin")
        .await
        .unwrap();
    assert_eq!(saved.ratio.exclusive.value(), dec!(66.6667));

    let result = engine(&store)
        .commit(march.id, dec!(12.3456), None, OperationMetadata::initiated_by("admin"))
        .await;
    assert!(matches!(result, Err(DistributionError::UnallocatedExclusivePool { .. })));

    let result = engine(&store)
        .commit(march.id, dec!(12.3456), split(dec!(100), dec!(0)), OperationMetadata::initiated_by("admin"))
        .await
        .unwrap();
    let stored = store.get_period(march.id).await.unwrap();
    assert_eq!(stored.profit_percentage, Some(dec!(12.3456)));
    assert_eq!(result.distribution.gross_profit, dec!(123.46));
    assert_eq!(count_rows(db.pool(), "ledger_entries").await, 2);
});
