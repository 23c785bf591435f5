//! In-memory store for tests
//!
//! Implements every port of the participant, ledger and distribution domains
//! over one `RwLock`. Multi-row operations (distribution commit, period and
//! participant cascades, request approval) prepare their changes first and
//! apply them only once nothing can fail, so a failure never leaves partial
//! state behind. `fail_commit_after` injects a store failure in the middle of
//! a commit to exercise that path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, Amount, DomainPort, HealthCheckResult, HealthCheckable, LedgerEntryId,
    ParticipantId, PeriodId, PortError, RequestId,
};
use domain_ledger::{
    ApprovalRequest, EntryKind, LedgerEntry, LedgerError, LedgerPort, NewLedgerEntry, RequestPort,
    RequestQuery,
};
use domain_participant::{OwnerRef, Participant, ParticipantDirectory, ParticipantQuery};

use crate::notification::{Notification, NotificationSink};
use crate::period::AccountingPeriod;
use crate::ports::{
    CommitDistribution, CommittedDistribution, ConfigurationPort, DistributionStore, PeriodPort,
};
use crate::split::SplitConfiguration;

#[derive(Debug, Default)]
struct StoreState {
    /// Creation order
    participants: Vec<Participant>,
    /// Append order
    entries: Vec<LedgerEntry>,
    requests: Vec<ApprovalRequest>,
    periods: Vec<AccountingPeriod>,
    /// Oldest first
    configurations: Vec<SplitConfiguration>,
    notifications: Vec<Notification>,
    /// One-shot: the next commit fails after staging this many entries
    fail_after_entries: Option<usize>,
}

impl StoreState {
    fn participant(&self, id: ParticipantId) -> Result<&Participant, PortError> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PortError::not_found("Participant", id))
    }

    fn ensure_owner(&self, owner: OwnerRef) -> Result<(), PortError> {
        let participant = self.participant(owner.id)?;
        if participant.kind != owner.kind {
            return Err(PortError::not_found("Participant", owner));
        }
        Ok(())
    }

    fn period_index(&self, id: PeriodId) -> Result<usize, PortError> {
        self.periods
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PortError::not_found("Period", id))
    }

    fn request_index(&self, id: RequestId) -> Result<usize, PortError> {
        self.requests
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PortError::not_found("Request", id))
    }

    /// Checks an entry the way the database constraints would
    fn stage_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, PortError> {
        entry.validate().map_err(ledger_to_port_error)?;
        self.ensure_owner(entry.owner)?;
        if let Some(period_id) = entry.period_id {
            self.period_index(period_id)?;
        }
        Ok(entry.into_entry())
    }
}

fn ledger_to_port_error(error: LedgerError) -> PortError {
    match error {
        LedgerError::InvalidState(message) => PortError::conflict(message),
        other => PortError::validation(other.to_string()),
    }
}

/// In-memory implementation of every store port
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next distribution commit fail after staging `entries` profit
    /// entries
    pub async fn fail_commit_after(&self, entries: usize) {
        self.state.write().await.fail_after_entries = Some(entries);
    }

    /// Notifications delivered through this store's `NotificationSink`
    pub async fn notifications(&self) -> Vec<Notification> {
        self.state.read().await.notifications.clone()
    }

    pub async fn entry_count(&self) -> usize {
        self.state.read().await.entries.len()
    }
}

impl DomainPort for InMemoryStore {}

#[async_trait]
impl HealthCheckable for InMemoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ParticipantDirectory for InMemoryStore {
    async fn create_participant(&self, participant: Participant) -> Result<Participant, PortError> {
        let mut state = self.state.write().await;
        if state.participants.iter().any(|p| p.id == participant.id) {
            return Err(PortError::conflict(format!("Participant {} already exists", participant.id)));
        }
        state.participants.push(participant.clone());
        Ok(participant)
    }

    async fn get_participant(&self, id: ParticipantId) -> Result<Participant, PortError> {
        self.state.read().await.participant(id).cloned()
    }

    async fn find_participants(&self, query: ParticipantQuery) -> Result<Vec<Participant>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .participants
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    async fn set_active(&self, id: ParticipantId, active: bool) -> Result<Participant, PortError> {
        let mut state = self.state.write().await;
        let participant = state
            .participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PortError::not_found("Participant", id))?;
        participant
            .set_active(active)
            .map_err(|e| PortError::validation(e.to_string()))?;
        Ok(participant.clone())
    }

    async fn delete_participant(&self, id: ParticipantId) -> Result<u64, PortError> {
        let mut state = self.state.write().await;
        state.participant(id)?;

        let before = state.entries.len();
        state.entries.retain(|e| e.owner.id != id);
        let removed = (before - state.entries.len()) as u64;
        state.requests.retain(|r| r.owner.id != id);
        state.participants.retain(|p| p.id != id);
        Ok(removed)
    }
}

#[async_trait]
impl LedgerPort for InMemoryStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, PortError> {
        let mut state = self.state.write().await;
        let entry = state.stage_entry(entry)?;
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, id: LedgerEntryId) -> Result<LedgerEntry, PortError> {
        self.state
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("LedgerEntry", id))
    }

    async fn list_entries(
        &self,
        owner: OwnerRef,
        kind: Option<EntryKind>,
    ) -> Result<Vec<LedgerEntry>, PortError> {
        let state = self.state.read().await;
        let mut entries: Vec<LedgerEntry> = state
            .entries
            .iter()
            .filter(|e| e.owner == owner && kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn list_all_entries(&self) -> Result<Vec<LedgerEntry>, PortError> {
        let mut entries = self.state.read().await.entries.clone();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn list_period_entries(&self, period_id: PeriodId) -> Result<Vec<LedgerEntry>, PortError> {
        let state = self.state.read().await;
        let mut entries: Vec<LedgerEntry> = state
            .entries
            .iter()
            .filter(|e| e.period_id == Some(period_id))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    async fn delete_entry(&self, id: LedgerEntryId) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        if state.entries.len() == before {
            return Err(PortError::not_found("LedgerEntry", id));
        }
        Ok(())
    }

    async fn correct_entry(
        &self,
        id: LedgerEntryId,
        amount: Amount,
        description: String,
    ) -> Result<LedgerEntry, PortError> {
        let mut state = self.state.write().await;
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| PortError::not_found("LedgerEntry", id))?;
        entry.amount = amount;
        entry.description = description;
        Ok(entry.clone())
    }
}

#[async_trait]
impl RequestPort for InMemoryStore {
    async fn insert_request(&self, request: ApprovalRequest) -> Result<ApprovalRequest, PortError> {
        let mut state = self.state.write().await;
        state.ensure_owner(request.owner)?;
        let duplicate = state
            .requests
            .iter()
            .any(|r| r.is_pending() && r.owner == request.owner && r.kind == request.kind);
        if duplicate {
            return Err(PortError::conflict(format!(
                "A pending {} request already exists for {}",
                request.kind, request.owner
            )));
        }
        state.requests.push(request.clone());
        Ok(request)
    }

    async fn get_request(&self, id: RequestId) -> Result<ApprovalRequest, PortError> {
        let state = self.state.read().await;
        let index = state.request_index(id)?;
        Ok(state.requests[index].clone())
    }

    async fn list_requests(&self, query: RequestQuery) -> Result<Vec<ApprovalRequest>, PortError> {
        let state = self.state.read().await;
        let mut requests: Vec<ApprovalRequest> = state
            .requests
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn approve_request(
        &self,
        id: RequestId,
        entry: NewLedgerEntry,
        decided_by: String,
    ) -> Result<(ApprovalRequest, LedgerEntry), PortError> {
        let mut state = self.state.write().await;
        let index = state.request_index(id)?;

        let mut request = state.requests[index].clone();
        let entry = state.stage_entry(entry)?;
        request
            .approve(entry.id, decided_by)
            .map_err(ledger_to_port_error)?;

        state.entries.push(entry.clone());
        state.requests[index] = request.clone();
        Ok((request, entry))
    }

    async fn reject_request(
        &self,
        id: RequestId,
        reason: String,
        decided_by: String,
    ) -> Result<ApprovalRequest, PortError> {
        let mut state = self.state.write().await;
        let index = state.request_index(id)?;
        let request = &mut state.requests[index];
        request
            .reject(reason, decided_by)
            .map_err(ledger_to_port_error)?;
        Ok(request.clone())
    }
}

#[async_trait]
impl PeriodPort for InMemoryStore {
    async fn list_periods(&self) -> Result<Vec<AccountingPeriod>, PortError> {
        let mut periods = self.state.read().await.periods.clone();
        periods.sort_by_key(|p| p.sequence_number);
        Ok(periods)
    }

    async fn get_period(&self, id: PeriodId) -> Result<AccountingPeriod, PortError> {
        let state = self.state.read().await;
        let index = state.period_index(id)?;
        Ok(state.periods[index].clone())
    }

    async fn insert_period(&self, period: AccountingPeriod) -> Result<AccountingPeriod, PortError> {
        let mut state = self.state.write().await;
        if state.periods.iter().any(AccountingPeriod::is_pending) {
            return Err(PortError::conflict("Another period is still pending"));
        }
        if state.periods.iter().any(|p| p.sequence_number == period.sequence_number) {
            return Err(PortError::conflict(format!(
                "Sequence number {} is already used",
                period.sequence_number
            )));
        }
        if state.periods.iter().any(|p| p.range.overlaps(&period.range)) {
            return Err(PortError::conflict(format!(
                "Date range {} overlaps an existing period",
                period.range
            )));
        }
        state.periods.push(period.clone());
        Ok(period)
    }

    async fn delete_period(&self, id: PeriodId) -> Result<u64, PortError> {
        let mut state = self.state.write().await;
        let index = state.period_index(id)?;

        let before = state.entries.len();
        state.entries.retain(|e| e.period_id != Some(id));
        let removed = (before - state.entries.len()) as u64;
        state.periods.remove(index);
        Ok(removed)
    }
}

#[async_trait]
impl ConfigurationPort for InMemoryStore {
    async fn current_configuration(&self) -> Result<Option<SplitConfiguration>, PortError> {
        Ok(self.state.read().await.configurations.last().cloned())
    }

    async fn append_configuration(&self, configuration: SplitConfiguration) -> Result<SplitConfiguration, PortError> {
        self.state.write().await.configurations.push(configuration.clone());
        Ok(configuration)
    }

    async fn configuration_history(&self) -> Result<Vec<SplitConfiguration>, PortError> {
        let mut history = self.state.read().await.configurations.clone();
        history.reverse();
        Ok(history)
    }
}

#[async_trait]
impl DistributionStore for InMemoryStore {
    async fn commit_distribution(&self, commit: CommitDistribution) -> Result<CommittedDistribution, PortError> {
        let mut state = self.state.write().await;
        let index = state.period_index(commit.period_id)?;

        let mut period = state.periods[index].clone();
        if period.processed {
            return Err(PortError::conflict(format!("Period {} is already processed", period.id)));
        }

        let fail_after = state.fail_after_entries.take();
        let mut staged = Vec::with_capacity(commit.entries.len());
        for entry in commit.entries {
            if fail_after == Some(staged.len()) {
                return Err(PortError::internal(format!(
                    "Injected failure after {} profit entries",
                    staged.len()
                )));
            }
            if entry.kind != EntryKind::Profit || entry.period_id != Some(commit.period_id) {
                return Err(PortError::validation(
                    "Distribution entries must be profit entries tagged with the period",
                ));
            }
            staged.push(state.stage_entry(entry)?);
        }

        period
            .mark_processed(&commit.record)
            .map_err(|e| PortError::conflict(e.to_string()))?;

        state.entries.extend(staged.iter().cloned());
        state.periods[index] = period.clone();
        Ok(CommittedDistribution { period, entries: staged })
    }
}

#[async_trait]
impl NotificationSink for InMemoryStore {
    async fn notify(&self, notification: Notification) -> Result<(), PortError> {
        self.state.write().await.notifications.push(notification);
        Ok(())
    }
}
