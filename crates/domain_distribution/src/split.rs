//! Proportional / exclusive split configuration

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use core_kernel::{round_money, ConfigurationId, Percentage};

use crate::error::DistributionError;
use crate::ports::ConfigurationPort;

/// How gross profit is divided between the two pools
///
/// Both sides are non-negative and sum to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSplit", into = "RawSplit")]
pub struct SplitRatio {
    /// Share of gross profit divided by capital weight
    pub proportional: Percentage,
    /// Share of gross profit divided evenly among active partners
    pub exclusive: Percentage,
}

#[derive(Serialize, Deserialize)]
struct RawSplit {
    proportional: Decimal,
    exclusive: Decimal,
}

impl TryFrom<RawSplit> for SplitRatio {
    type Error = DistributionError;

    fn try_from(raw: RawSplit) -> Result<Self, Self::Error> {
        SplitRatio::new(raw.proportional, raw.exclusive)
    }
}

impl From<SplitRatio> for RawSplit {
    fn from(split: SplitRatio) -> Self {
        RawSplit {
            proportional: split.proportional.value(),
            exclusive: split.exclusive.value(),
        }
    }
}

impl SplitRatio {
    /// Creates a split
    ///
    /// # Errors
    ///
    /// `InvalidSplit` if either side is negative or above 100, or the two do
    /// not sum to exactly 100.
    pub fn new(proportional: Decimal, exclusive: Decimal) -> Result<Self, DistributionError> {
        let total = proportional + exclusive;
        if total != dec!(100) {
            return Err(DistributionError::InvalidSplit(format!(
                "Proportional and exclusive must sum to 100%, got {}%",
                total.normalize()
            )));
        }

        let proportional = Percentage::new(proportional)
            .map_err(|e| DistributionError::InvalidSplit(e.to_string()))?;
        let exclusive = Percentage::new(exclusive)
            .map_err(|e| DistributionError::InvalidSplit(e.to_string()))?;

        Ok(Self { proportional, exclusive })
    }

    /// Divides `gross` into `(proportional_pool, exclusive_pool)`
    ///
    /// The exclusive pool is rounded to cents and the proportional pool takes
    /// the rest, so the pools always sum to the rounded gross.
    pub fn pools(&self, gross: Decimal) -> (Decimal, Decimal) {
        let gross = round_money(gross);
        let exclusive = round_money(self.exclusive.apply(gross));
        (gross - exclusive, exclusive)
    }
}

/// One saved version of the split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitConfiguration {
    pub id: ConfigurationId,
    pub ratio: SplitRatio,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl SplitConfiguration {
    pub fn new(ratio: SplitRatio, description: Option<String>, created_by: impl Into<String>) -> Self {
        Self {
            id: ConfigurationId::new_v7(),
            ratio,
            description: description.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
            created_by: created_by.into(),
        }
    }
}

/// Append-only store of split configurations; the newest record is current
#[derive(Clone)]
pub struct ConfigurationService {
    store: Arc<dyn ConfigurationPort>,
}

impl ConfigurationService {
    pub fn new(store: Arc<dyn ConfigurationPort>) -> Self {
        Self { store }
    }

    /// The configuration in effect, if one was ever saved
    pub async fn current(&self) -> Result<Option<SplitConfiguration>, DistributionError> {
        Ok(self.store.current_configuration().await?)
    }

    /// Validates and appends a new configuration, which becomes current
    pub async fn save(
        &self,
        proportional: Decimal,
        exclusive: Decimal,
        description: Option<String>,
        created_by: &str,
    ) -> Result<SplitConfiguration, DistributionError> {
        let ratio = SplitRatio::new(proportional, exclusive)?;
        let configuration = self
            .store
            .append_configuration(SplitConfiguration::new(ratio, description, created_by))
            .await?;

        info!(
            configuration_id = %configuration.id,
            proportional = %ratio.proportional,
            exclusive = %ratio.exclusive,
            created_by,
            "Distribution configuration saved"
        );
        Ok(configuration)
    }

    /// Every saved configuration, newest first
    pub async fn history(&self) -> Result<Vec<SplitConfiguration>, DistributionError> {
        Ok(self.store.configuration_history().await?)
    }
}
