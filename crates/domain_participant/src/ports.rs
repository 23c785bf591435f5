//! Participant Directory Port
//!
//! The directory is the only way the rest of the system learns who the
//! investors and partners are. It is implemented by the PostgreSQL adapter
//! in `infra_db` and by the in-memory store used in tests.
//!
//! ```rust,ignore
//! let partners = directory.list_active_participants(ParticipantKind::Partner).await?;
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, ParticipantId, PortError};
use crate::participant::{Participant, ParticipantKind};

/// Query parameters for listing participants
#[derive(Debug, Clone, Default)]
pub struct ParticipantQuery {
    /// Filter by kind
    pub kind: Option<ParticipantKind>,
    /// Only return participants eligible for distribution
    /// (every investor, active partners)
    pub eligible_only: bool,
}

impl ParticipantQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_kind(kind: ParticipantKind) -> Self {
        Self { kind: Some(kind), ..Default::default() }
    }

    pub fn eligible() -> Self {
        Self { eligible_only: true, ..Default::default() }
    }

    pub fn matches(&self, participant: &Participant) -> bool {
        if let Some(kind) = self.kind {
            if participant.kind != kind {
                return false;
            }
        }
        !self.eligible_only || participant.is_eligible()
    }
}

/// Port for participant storage
///
/// Listing operations return participants ordered by creation time so that
/// allocation tables are deterministic.
#[async_trait]
pub trait ParticipantDirectory: DomainPort {
    /// Stores a new participant
    async fn create_participant(&self, participant: Participant) -> Result<Participant, PortError>;

    /// Retrieves a participant, or `PortError::NotFound`
    async fn get_participant(&self, id: ParticipantId) -> Result<Participant, PortError>;

    /// Lists participants matching the query
    async fn find_participants(&self, query: ParticipantQuery) -> Result<Vec<Participant>, PortError>;

    /// Activates or deactivates a partner
    ///
    /// Investors are rejected with `PortError::Validation`.
    async fn set_active(&self, id: ParticipantId, active: bool) -> Result<Participant, PortError>;

    /// Deletes a participant together with its ledger entries and requests
    ///
    /// The cascade is atomic. Returns the number of ledger entries removed.
    async fn delete_participant(&self, id: ParticipantId) -> Result<u64, PortError>;
}

/// Convenience lookups built on `ParticipantDirectory`
#[async_trait]
pub trait ParticipantDirectoryExt: ParticipantDirectory {
    /// Lists eligible participants of one kind (every investor, active partners)
    async fn list_active_participants(&self, kind: ParticipantKind) -> Result<Vec<Participant>, PortError> {
        self.find_participants(ParticipantQuery {
            kind: Some(kind),
            eligible_only: true,
        })
        .await
    }

    /// Lists every participant eligible for distribution
    async fn list_eligible(&self) -> Result<Vec<Participant>, PortError> {
        self.find_participants(ParticipantQuery::eligible()).await
    }
}

impl<T: ParticipantDirectory + ?Sized> ParticipantDirectoryExt for T {}
