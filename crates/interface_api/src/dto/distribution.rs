//! Distribution DTOs

use rust_decimal::Decimal;
use serde::Deserialize;

use domain_distribution::{DistributionError, SplitRatio};

/// Body of preview and commit calls
#[derive(Debug, Deserialize)]
pub struct DistributionRequest {
    /// Percentage of total capital paid out, in (0, 100]
    pub profit_percentage: Decimal,
    /// One-off split; the saved configuration applies when absent
    pub split: Option<SplitOverride>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SplitOverride {
    pub proportional: Decimal,
    pub exclusive: Decimal,
}

impl DistributionRequest {
    /// The override as a validated ratio
    pub fn split_ratio(&self) -> Result<Option<SplitRatio>, DistributionError> {
        self.split
            .map(|s| SplitRatio::new(s.proportional, s.exclusive))
            .transpose()
    }
}
