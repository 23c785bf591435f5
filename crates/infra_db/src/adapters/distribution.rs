//! PostgreSQL period, configuration and distribution stores

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use core_kernel::{CommitId, ConfigurationId, DateRange, PeriodId, PortError};
use domain_distribution::{
    AccountingPeriod, CommitDistribution, CommittedDistribution, ConfigurationPort,
    DistributionStore, Notification, NotificationSink, PeriodPort, Severity, SplitConfiguration,
    SplitRatio,
};
use domain_ledger::EntryKind;
use domain_participant::OwnerRef;

use super::ledger::{entry_to_row, row_to_entry};
use super::{corrupt, db_to_port_error, kind_to_db, PostgresStore};
use crate::repositories::{ConfigurationRow, NotificationRow, PeriodRow, ProcessingUpdate, SeverityDb};

#[async_trait]
impl PeriodPort for PostgresStore {
    #[instrument(skip(self))]
    async fn list_periods(&self) -> Result<Vec<AccountingPeriod>, PortError> {
        let rows = self.periods.list().await.map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_period).collect()
    }

    #[instrument(skip(self), fields(period_id = %id))]
    async fn get_period(&self, id: PeriodId) -> Result<AccountingPeriod, PortError> {
        let row = self.periods.get_by_id(id.into()).await.map_err(db_to_port_error)?;
        row_to_period(row)
    }

    #[instrument(skip(self, period), fields(period_id = %period.id, sequence = period.sequence_number))]
    async fn insert_period(&self, period: AccountingPeriod) -> Result<AccountingPeriod, PortError> {
        let row = self
            .periods
            .insert(&period_to_row(&period)?)
            .await
            .map_err(db_to_port_error)?;
        row_to_period(row)
    }

    #[instrument(skip(self), fields(period_id = %id))]
    async fn delete_period(&self, id: PeriodId) -> Result<u64, PortError> {
        let removed = self
            .periods
            .delete_cascade(id.into())
            .await
            .map_err(db_to_port_error)?;
        info!(entries_removed = removed, "Period deleted");
        Ok(removed)
    }
}

#[async_trait]
impl ConfigurationPort for PostgresStore {
    #[instrument(skip(self))]
    async fn current_configuration(&self) -> Result<Option<SplitConfiguration>, PortError> {
        let row = self.configurations.current().await.map_err(db_to_port_error)?;
        row.map(row_to_configuration).transpose()
    }

    #[instrument(skip(self, configuration), fields(configuration_id = %configuration.id))]
    async fn append_configuration(&self, configuration: SplitConfiguration) -> Result<SplitConfiguration, PortError> {
        let row = ConfigurationRow {
            configuration_id: configuration.id.into(),
            proportional_percentage: configuration.ratio.proportional.value(),
            exclusive_percentage: configuration.ratio.exclusive.value(),
            description: configuration.description.clone(),
            created_at: configuration.created_at,
            created_by: configuration.created_by.clone(),
        };
        let row = self.configurations.append(&row).await.map_err(db_to_port_error)?;
        row_to_configuration(row)
    }

    #[instrument(skip(self))]
    async fn configuration_history(&self) -> Result<Vec<SplitConfiguration>, PortError> {
        let rows = self.configurations.history().await.map_err(db_to_port_error)?;
        rows.into_iter().map(row_to_configuration).collect()
    }
}

#[async_trait]
impl DistributionStore for PostgresStore {
    #[instrument(skip(self, commit), fields(period_id = %commit.period_id, entries = commit.entries.len()))]
    async fn commit_distribution(&self, commit: CommitDistribution) -> Result<CommittedDistribution, PortError> {
        let mut rows = Vec::with_capacity(commit.entries.len());
        for entry in commit.entries {
            if entry.kind != EntryKind::Profit || entry.period_id != Some(commit.period_id) {
                return Err(PortError::validation(
                    "Distribution entries must be profit entries tagged with the period",
                ));
            }
            rows.push(entry_to_row(&entry.into_entry()));
        }

        let record = &commit.record;
        let processing = ProcessingUpdate {
            commit_id: record.commit_id.into(),
            processed_at: record.processed_at,
            processed_by: record.processed_by.clone(),
            gross_profit_amount: record.gross_profit_amount,
            profit_percentage: record.profit_percentage.value(),
            proportional_percentage: record.split.proportional.value(),
            exclusive_percentage: record.split.exclusive.value(),
        };

        let (period, entries) = self
            .periods
            .commit_distribution(commit.period_id.into(), &processing, &rows)
            .await
            .map_err(|e| {
                warn!(error = %e, "Distribution commit rolled back");
                db_to_port_error(e)
            })?;

        Ok(CommittedDistribution {
            period: row_to_period(period)?,
            entries: entries.into_iter().map(row_to_entry).collect::<Result<_, _>>()?,
        })
    }
}

#[async_trait]
impl NotificationSink for PostgresStore {
    #[instrument(skip(self, notification), fields(owner = %notification.owner))]
    async fn notify(&self, notification: Notification) -> Result<(), PortError> {
        let row = NotificationRow {
            notification_id: notification.id.into(),
            owner_id: notification.owner.id.into(),
            owner_kind: kind_to_db(notification.owner.kind),
            title: notification.title,
            message: notification.message,
            severity: match notification.severity {
                Severity::Info => SeverityDb::Info,
                Severity::Warning => SeverityDb::Warning,
                Severity::Critical => SeverityDb::Critical,
            },
            created_at: notification.created_at,
        };
        self.notifications.insert(&row).await.map_err(db_to_port_error)?;
        Ok(())
    }
}

impl PostgresStore {
    /// Stored notifications of one participant, newest first
    pub async fn notifications_for(&self, owner: OwnerRef) -> Result<Vec<NotificationRow>, PortError> {
        self.notifications
            .list_for_owner(owner.id.into())
            .await
            .map_err(db_to_port_error)
    }
}

fn period_to_row(period: &AccountingPeriod) -> Result<PeriodRow, PortError> {
    Ok(PeriodRow {
        period_id: period.id.into(),
        sequence_number: i32::try_from(period.sequence_number)
            .map_err(|_| PortError::validation_field("Sequence number is too large", "sequence_number"))?,
        label: period.label.clone(),
        start_date: period.range.start,
        end_date: period.range.end,
        processed: period.processed,
        processed_at: period.processed_at,
        processed_by: period.processed_by.clone(),
        gross_profit_amount: period.gross_profit_amount,
        profit_percentage: period.profit_percentage,
        proportional_percentage: period.proportional_percentage,
        exclusive_percentage: period.exclusive_percentage,
        commit_id: period.commit_id.map(Into::into),
        created_at: period.created_at,
    })
}

fn row_to_period(row: PeriodRow) -> Result<AccountingPeriod, PortError> {
    Ok(AccountingPeriod {
        id: PeriodId::from_uuid(row.period_id),
        sequence_number: u32::try_from(row.sequence_number).map_err(corrupt)?,
        label: row.label,
        range: DateRange::new(row.start_date, row.end_date).map_err(corrupt)?,
        processed: row.processed,
        processed_at: row.processed_at,
        processed_by: row.processed_by,
        gross_profit_amount: row.gross_profit_amount,
        profit_percentage: row.profit_percentage,
        proportional_percentage: row.proportional_percentage,
        exclusive_percentage: row.exclusive_percentage,
        commit_id: row.commit_id.map(CommitId::from_uuid),
        created_at: row.created_at,
    })
}

fn row_to_configuration(row: ConfigurationRow) -> Result<SplitConfiguration, PortError> {
    Ok(SplitConfiguration {
        id: ConfigurationId::from_uuid(row.configuration_id),
        ratio: SplitRatio::new(row.proportional_percentage, row.exclusive_percentage).map_err(corrupt)?,
        description: row.description,
        created_at: row.created_at,
        created_by: row.created_by,
    })
}
