//! PostgreSQL participant directory

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use core_kernel::{ParticipantId, PortError};
use domain_participant::{Participant, ParticipantDirectory, ParticipantQuery};

use super::{db_to_port_error, kind_from_db, kind_to_db, PostgresStore};
use crate::repositories::ParticipantRow;

#[async_trait]
impl ParticipantDirectory for PostgresStore {
    #[instrument(skip(self, participant), fields(participant_id = %participant.id))]
    async fn create_participant(&self, participant: Participant) -> Result<Participant, PortError> {
        let row = self
            .participants
            .insert(&participant_to_row(&participant))
            .await
            .map_err(db_to_port_error)?;
        info!(kind = participant.kind.as_str(), "Participant created");
        Ok(row_to_participant(row))
    }

    #[instrument(skip(self), fields(participant_id = %id))]
    async fn get_participant(&self, id: ParticipantId) -> Result<Participant, PortError> {
        debug!("Fetching participant");
        self.participants
            .get_by_id(id.into())
            .await
            .map(row_to_participant)
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self))]
    async fn find_participants(&self, query: ParticipantQuery) -> Result<Vec<Participant>, PortError> {
        let rows = self
            .participants
            .find(query.kind.map(kind_to_db), query.eligible_only)
            .await
            .map_err(db_to_port_error)?;
        Ok(rows.into_iter().map(row_to_participant).collect())
    }

    #[instrument(skip(self), fields(participant_id = %id))]
    async fn set_active(&self, id: ParticipantId, active: bool) -> Result<Participant, PortError> {
        let mut participant = self.get_participant(id).await?;
        participant
            .set_active(active)
            .map_err(|e| PortError::validation(e.to_string()))?;

        self.participants
            .set_active(id.into(), active)
            .await
            .map(row_to_participant)
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(participant_id = %id))]
    async fn delete_participant(&self, id: ParticipantId) -> Result<u64, PortError> {
        let removed = self
            .participants
            .delete_cascade(id.into())
            .await
            .map_err(db_to_port_error)?;
        info!(entries_removed = removed, "Participant deleted");
        Ok(removed)
    }
}

fn participant_to_row(participant: &Participant) -> ParticipantRow {
    ParticipantRow {
        participant_id: participant.id.into(),
        kind: kind_to_db(participant.kind),
        name: participant.name.clone(),
        email: participant.email.clone(),
        is_active: participant.is_active,
        created_at: participant.created_at,
    }
}

fn row_to_participant(row: ParticipantRow) -> Participant {
    Participant {
        id: ParticipantId::from_uuid(row.participant_id),
        kind: kind_from_db(row.kind),
        name: row.name,
        email: row.email,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}
