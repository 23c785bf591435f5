//! Period DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::PeriodId;
use domain_distribution::NewPeriod;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePeriodRequest {
    #[validate(range(min = 1))]
    pub sequence_number: u32,
    #[validate(length(min = 1, max = 100))]
    pub label: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<CreatePeriodRequest> for NewPeriod {
    fn from(request: CreatePeriodRequest) -> Self {
        NewPeriod::new(
            request.sequence_number,
            request.label.trim(),
            request.start_date,
            request.end_date,
        )
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePeriodResponse {
    pub period_id: PeriodId,
    pub entries_removed: u64,
}
