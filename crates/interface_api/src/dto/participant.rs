//! Participant DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ParticipantId;
use domain_participant::{NewParticipant, ParticipantKind, ParticipantQuery};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateParticipantRequest {
    pub kind: ParticipantKind,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}

impl From<CreateParticipantRequest> for NewParticipant {
    fn from(request: CreateParticipantRequest) -> Self {
        NewParticipant {
            kind: request.kind,
            name: request.name,
            email: request.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParticipantsQuery {
    pub kind: Option<ParticipantKind>,
    /// Only investors and active partners
    #[serde(default)]
    pub active_only: bool,
}

impl From<ListParticipantsQuery> for ParticipantQuery {
    fn from(query: ListParticipantsQuery) -> Self {
        ParticipantQuery {
            kind: query.kind,
            eligible_only: query.active_only,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub participant_id: ParticipantId,
    pub kind: ParticipantKind,
    pub balance: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteParticipantResponse {
    pub participant_id: ParticipantId,
    pub entries_removed: u64,
}
