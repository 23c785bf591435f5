//! Request and response bodies

pub mod period;
pub mod distribution;
pub mod participant;
pub mod configuration;
pub mod request;
pub mod entry;

use serde::Deserialize;

/// `?confirm=true` guard for destructive operations
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}
