//! Deposit and withdrawal request DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::ParticipantId;
use domain_ledger::{ApprovalRequest, LedgerEntry, RequestKind};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    pub participant_id: ParticipantId,
    pub kind: RequestKind,
    pub amount: Decimal,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RejectRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListRequestsQuery {
    pub participant_id: Option<ParticipantId>,
    #[serde(default)]
    pub pending_only: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub request: ApprovalRequest,
    pub entry: LedgerEntry,
}
