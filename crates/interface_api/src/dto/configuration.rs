//! Configuration DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SaveConfigurationRequest {
    pub proportional_percentage: Decimal,
    pub exclusive_percentage: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}
