//! Ledger entry correction DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CorrectEntryRequest {
    pub amount: Decimal,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
}
