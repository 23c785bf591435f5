//! Monthly profit distribution
//!
//! Given a pending period and a profit percentage, the engine computes
//!
//! ```text
//! gross        = round(capital * pct / 100)
//! exclusive    = round(gross * split.exclusive / 100)
//! proportional = gross - exclusive
//! ```
//!
//! then shares the proportional pool by capital weight across investors and
//! active partners, and the exclusive pool evenly across active partners.
//! Every share is rounded to cents and the shares of each pool sum exactly
//! to the pool.
//!
//! `preview` only computes. `commit` computes the same plan and hands it to
//! the `DistributionStore`, which writes the profit entries and flips the
//! period to processed as one atomic unit.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use core_kernel::{
    allocate_by_weights, allocate_even, round_money, Amount, CommitId, ConfigurationId,
    OperationMetadata, ParticipantId, Percentage, PeriodId,
};
use domain_ledger::{BalanceCalculator, LedgerEntry, LedgerPort, NewLedgerEntry};
use domain_participant::{OwnerRef, ParticipantDirectory, ParticipantKind};

use crate::error::{DistributionError, DistributionWarning};
use crate::notification::{Notification, NotificationSink, Severity};
use crate::period::{AccountingPeriod, ProcessingRecord};
use crate::ports::{CommitDistribution, ConfigurationPort, DistributionStore, PeriodPort};
use crate::split::{ConfigurationService, SplitRatio};

/// Decimal places kept for the displayed capital share
const CAPITAL_SHARE_PRECISION: u32 = 6;

/// Identity stamped on commits that carry no caller
const SYSTEM_ACTOR: &str = "system";

/// Where the split used by a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SplitSource {
    /// Ad-hoc split supplied for this run
    Override,
    /// Current record of the configuration store
    Configuration { configuration_id: ConfigurationId },
}

/// One row of the allocation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub participant_id: ParticipantId,
    pub kind: ParticipantKind,
    pub name: String,
    pub balance: Decimal,
    /// Fraction of total capital, 0 for non-positive balances
    pub capital_share: Decimal,
    pub proportional: Decimal,
    pub exclusive: Decimal,
    pub total: Decimal,
}

impl Allocation {
    pub fn owner(&self) -> OwnerRef {
        OwnerRef { id: self.participant_id, kind: self.kind }
    }
}

/// Computed distribution for a pending period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionPreview {
    pub period: AccountingPeriod,
    pub profit_percentage: Percentage,
    pub split: SplitRatio,
    pub split_source: SplitSource,
    /// Capital the profit is computed on, never negative
    pub total_capital: Decimal,
    /// Unclamped capital, for diagnostics
    pub raw_capital: Decimal,
    pub gross_profit: Decimal,
    pub proportional_pool: Decimal,
    pub exclusive_pool: Decimal,
    pub allocations: Vec<Allocation>,
    /// Part of the gross profit no participant receives
    pub unallocated: Decimal,
    pub warnings: Vec<DistributionWarning>,
}

impl DistributionPreview {
    pub fn allocated(&self) -> Decimal {
        self.allocations.iter().map(|a| a.total).sum()
    }

    pub fn allocation_for(&self, id: ParticipantId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.participant_id == id)
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionResult {
    pub commit_id: CommitId,
    /// The computed distribution; `distribution.period` is the processed period
    pub distribution: DistributionPreview,
    /// Profit entries written, one per credited participant
    pub entries: Vec<LedgerEntry>,
}

/// Computes and commits monthly profit distributions
#[derive(Clone)]
pub struct DistributionEngine {
    periods: Arc<dyn PeriodPort>,
    configurations: ConfigurationService,
    balances: BalanceCalculator,
    store: Arc<dyn DistributionStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl DistributionEngine {
    pub fn new(
        periods: Arc<dyn PeriodPort>,
        configurations: Arc<dyn ConfigurationPort>,
        ledger: Arc<dyn LedgerPort>,
        directory: Arc<dyn ParticipantDirectory>,
        store: Arc<dyn DistributionStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            periods,
            configurations: ConfigurationService::new(configurations),
            balances: BalanceCalculator::new(ledger, directory),
            store,
            notifier,
        }
    }

    /// Builds an engine whose ports are all served by one store
    pub fn from_store<S>(store: Arc<S>, notifier: Arc<dyn NotificationSink>) -> Self
    where
        S: PeriodPort + ConfigurationPort + LedgerPort + ParticipantDirectory + DistributionStore,
    {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            notifier,
        )
    }

    /// Computes the distribution without writing anything
    ///
    /// # Errors
    ///
    /// - `NotFound` if the period does not exist
    /// - `AlreadyProcessed` if the period was already distributed
    /// - `NoConfiguration` if no override is given and none was ever saved
    /// - `Validation` if the percentage is not in (0, 100]
    pub async fn preview(
        &self,
        period_id: PeriodId,
        profit_percentage: Decimal,
        split_override: Option<SplitRatio>,
    ) -> Result<DistributionPreview, DistributionError> {
        let preview = self.plan(period_id, profit_percentage, split_override).await?;
        for warning in &preview.warnings {
            warn!(period_id = %period_id, "{}", warning);
        }
        Ok(preview)
    }

    /// Computes the distribution and commits it atomically
    ///
    /// Fails like `preview`, and additionally with
    /// `UnallocatedExclusivePool` when the exclusive pool is positive but no
    /// partner is active, and `PartialWrite` when the store failed and rolled
    /// the attempt back. Notifications go out after the commit on a spawned
    /// task and never affect the outcome.
    pub async fn commit(
        &self,
        period_id: PeriodId,
        profit_percentage: Decimal,
        split_override: Option<SplitRatio>,
        metadata: OperationMetadata,
    ) -> Result<DistributionResult, DistributionError> {
        let mut plan = self.plan(period_id, profit_percentage, split_override).await?;

        for warning in &plan.warnings {
            if let DistributionWarning::UnallocatedExclusivePool { amount } = warning {
                warn!(period_id = %period_id, amount = %amount, "Refusing commit with undistributed exclusive pool");
                return Err(DistributionError::UnallocatedExclusivePool { amount: *amount });
            }
            warn!(period_id = %period_id, "{}", warning);
        }

        ensure_balanced(&plan)?;

        let description = plan.period.entry_description();
        let entries = plan
            .allocations
            .iter()
            .filter(|a| !a.total.is_zero())
            .map(|a| -> Result<NewLedgerEntry, DistributionError> {
                Ok(NewLedgerEntry::profit(a.owner(), Amount::new(a.total)?)
                    .for_period(period_id)
                    .with_description(description.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let record = ProcessingRecord {
            commit_id: CommitId::new_v7(),
            processed_at: Utc::now(),
            processed_by: metadata.actor_or(SYSTEM_ACTOR).to_string(),
            gross_profit_amount: plan.gross_profit,
            profit_percentage: plan.profit_percentage,
            split: plan.split,
        };
        let commit_id = record.commit_id;

        let committed = self
            .store
            .commit_distribution(CommitDistribution {
                period_id,
                record,
                entries,
            })
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    DistributionError::AlreadyProcessed(plan.period.label.clone())
                } else if e.is_not_found() {
                    DistributionError::from(e)
                } else {
                    DistributionError::PartialWrite(e.to_string())
                }
            })?;

        info!(
            period_id = %period_id,
            commit_id = %commit_id,
            correlation_id = ?metadata.correlation_id,
            gross_profit = %plan.gross_profit,
            credited = committed.entries.len(),
            processed_by = ?committed.period.processed_by,
            "Distribution committed"
        );

        self.dispatch_notifications(&committed.period, &committed.entries);

        plan.period = committed.period;
        Ok(DistributionResult {
            commit_id,
            distribution: plan,
            entries: committed.entries,
        })
    }

    async fn plan(
        &self,
        period_id: PeriodId,
        profit_percentage: Decimal,
        split_override: Option<SplitRatio>,
    ) -> Result<DistributionPreview, DistributionError> {
        let period = self.periods.get_period(period_id).await?;
        if period.processed {
            return Err(DistributionError::AlreadyProcessed(period.label));
        }

        let (split, split_source) = match split_override {
            Some(split) => (split, SplitSource::Override),
            None => {
                let current = self
                    .configurations
                    .current()
                    .await?
                    .ok_or(DistributionError::NoConfiguration)?;
                (
                    current.ratio,
                    SplitSource::Configuration { configuration_id: current.id },
                )
            }
        };

        let profit_percentage = validate_profit_percentage(profit_percentage)?;

        let capital = self.balances.total_invested_capital().await?;
        let gross_profit = round_money(profit_percentage.apply(capital.total));
        let (proportional_pool, exclusive_pool) = split.pools(gross_profit);

        let mut warnings = Vec::new();
        let mut unallocated = Decimal::ZERO;

        let weights: Vec<Decimal> = capital
            .participants
            .iter()
            .map(|p| p.balance.max(Decimal::ZERO))
            .collect();
        let weight_sum: Decimal = weights.iter().sum();

        let proportional = if capital.total.is_zero() || weight_sum.is_zero() {
            warnings.push(DistributionWarning::NoCapital { proportional_pool });
            unallocated += proportional_pool;
            vec![Decimal::ZERO; weights.len()]
        } else {
            allocate_by_weights(proportional_pool, &weights)?
        };

        let partner_slots: Vec<usize> = capital
            .participants
            .iter()
            .enumerate()
            .filter(|(_, p)| p.participant.kind == ParticipantKind::Partner)
            .map(|(i, _)| i)
            .collect();

        let mut exclusive = vec![Decimal::ZERO; weights.len()];
        if partner_slots.is_empty() {
            if exclusive_pool > Decimal::ZERO {
                warnings.push(DistributionWarning::UnallocatedExclusivePool { amount: exclusive_pool });
                unallocated += exclusive_pool;
            }
        } else {
            let shares = allocate_even(exclusive_pool, partner_slots.len())?;
            for (slot, share) in partner_slots.into_iter().zip(shares) {
                exclusive[slot] = share;
            }
        }

        let allocations = capital
            .participants
            .into_iter()
            .enumerate()
            .map(|(i, p)| {
                let capital_share = if weight_sum.is_zero() {
                    Decimal::ZERO
                } else {
                    (weights[i] / weight_sum).round_dp(CAPITAL_SHARE_PRECISION)
                };
                Allocation {
                    participant_id: p.participant.id,
                    kind: p.participant.kind,
                    name: p.participant.name,
                    balance: p.balance,
                    capital_share,
                    proportional: proportional[i],
                    exclusive: exclusive[i],
                    total: proportional[i] + exclusive[i],
                }
            })
            .collect();

        Ok(DistributionPreview {
            period,
            profit_percentage,
            split,
            split_source,
            total_capital: capital.total,
            raw_capital: capital.raw,
            gross_profit,
            proportional_pool,
            exclusive_pool,
            allocations,
            unallocated,
            warnings,
        })
    }

    fn dispatch_notifications(&self, period: &AccountingPeriod, entries: &[LedgerEntry]) {
        if entries.is_empty() {
            return;
        }

        let notifications: Vec<Notification> = entries
            .iter()
            .map(|entry| {
                Notification::new(
                    entry.owner,
                    "Profit credited",
                    format!("{} was credited for period {}", entry.amount, period.label),
                    Severity::Info,
                )
            })
            .collect();

        let notifier = Arc::clone(&self.notifier);
        let period_id = period.id;
        tokio::spawn(async move {
            for notification in notifications {
                let owner = notification.owner;
                if let Err(error) = notifier.notify(notification).await {
                    warn!(period_id = %period_id, owner = %owner, error = %error, "Failed to send notification");
                }
            }
        });
    }
}

/// Refuses a plan that would debit anyone or credit more or less than the
/// gross profit minus what is reported as unallocated
fn ensure_balanced(plan: &DistributionPreview) -> Result<(), DistributionError> {
    if let Some(negative) = plan.allocations.iter().find(|a| a.total < Decimal::ZERO) {
        return Err(DistributionError::InvalidAllocation(format!(
            "{} would receive {}",
            negative.participant_id, negative.total
        )));
    }

    let allocated = plan.allocated();
    if allocated + plan.unallocated != plan.gross_profit {
        return Err(DistributionError::InvalidAllocation(format!(
            "allocations of {} plus {} unallocated do not match gross profit {}",
            allocated, plan.unallocated, plan.gross_profit
        )));
    }
    Ok(())
}

fn validate_profit_percentage(value: Decimal) -> Result<Percentage, DistributionError> {
    let percentage = Percentage::new(value)?;
    if percentage.is_zero() {
        return Err(DistributionError::Validation(
            "Profit percentage must be greater than zero".to_string(),
        ));
    }
    Ok(percentage)
}
