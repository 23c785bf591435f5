//! Participant entity
//!
//! A participant is anyone who can own ledger entries: an investor or a
//! partner. The kind decides how the distribution engine treats it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use core_kernel::ParticipantId;
use crate::error::ParticipantError;

/// The kind of participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Regular investor, always eligible
    Investor,
    /// Partner, eligible only while active; shares the exclusive pool
    Partner,
}

impl ParticipantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantKind::Investor => "investor",
            ParticipantKind::Partner => "partner",
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the owner of a ledger entry or request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
}

impl OwnerRef {
    pub fn investor(id: ParticipantId) -> Self {
        Self { id, kind: ParticipantKind::Investor }
    }

    pub fn partner(id: ParticipantId) -> Self {
        Self { id, kind: ParticipantKind::Partner }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// An investor or partner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub kind: ParticipantKind,
    pub name: String,
    pub email: Option<String>,
    /// Only meaningful for partners; investors are stored as active
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Participant {
    /// Creates a participant from a validated request
    pub fn new(request: NewParticipant) -> Result<Self, ParticipantError> {
        request.validate()?;
        Ok(Self {
            id: ParticipantId::new_v7(),
            kind: request.kind,
            name: request.name.trim().to_string(),
            email: request.email,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    pub fn owner_ref(&self) -> OwnerRef {
        OwnerRef { id: self.id, kind: self.kind }
    }

    pub fn is_partner(&self) -> bool {
        self.kind == ParticipantKind::Partner
    }

    /// Whether this participant takes part in profit distribution
    ///
    /// Investors are always eligible; partners only while active.
    pub fn is_eligible(&self) -> bool {
        match self.kind {
            ParticipantKind::Investor => true,
            ParticipantKind::Partner => self.is_active,
        }
    }

    /// Activates or deactivates a partner
    pub fn set_active(&mut self, active: bool) -> Result<(), ParticipantError> {
        if !self.is_partner() {
            return Err(ParticipantError::NotAPartner);
        }
        self.is_active = active;
        Ok(())
    }
}

/// Request to register a participant
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewParticipant {
    pub kind: ParticipantKind,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}

impl NewParticipant {
    pub fn investor(name: impl Into<String>) -> Self {
        Self { kind: ParticipantKind::Investor, name: name.into(), email: None }
    }

    pub fn partner(name: impl Into<String>) -> Self {
        Self { kind: ParticipantKind::Partner, name: name.into(), email: None }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investor_is_always_eligible() {
        let mut investor = Participant::new(NewParticipant::investor("Ana")).unwrap();
        assert!(investor.is_eligible());
        assert!(matches!(investor.set_active(false), Err(ParticipantError::NotAPartner)));
        assert!(investor.is_eligible());
    }

    #[test]
    fn test_inactive_partner_is_not_eligible() {
        let mut partner = Participant::new(NewParticipant::partner("Bruno")).unwrap();
        assert!(partner.is_eligible());
        partner.set_active(false).unwrap();
        assert!(!partner.is_eligible());
    }

    #[test]
    fn test_new_participant_validation() {
        assert!(Participant::new(NewParticipant::investor("")).is_err());
        assert!(Participant::new(NewParticipant::investor("Ana").with_email("not-an-email")).is_err());
        let ok = Participant::new(NewParticipant::partner("  Carla  ").with_email("carla@cvm.example")).unwrap();
        assert_eq!(ok.name, "Carla");
    }

    #[test]
    fn test_owner_ref_display() {
        let partner = Participant::new(NewParticipant::partner("Dora")).unwrap();
        assert!(partner.owner_ref().to_string().starts_with("partner PTC-"));
    }
}
