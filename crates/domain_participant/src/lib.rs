//! Participant Domain
//!
//! Participants are the owners of ledger entries. There are two kinds:
//!
//! - **Investor**: always eligible for profit distribution
//! - **Partner**: a referral-style co-investor; eligible only while active,
//!   and the sole recipient of the exclusive profit pool
//!
//! Deactivating a partner removes it from future distributions but never
//! touches its historical ledger entries.

pub mod participant;
pub mod ports;
pub mod error;

pub use participant::{Participant, ParticipantKind, OwnerRef, NewParticipant};
pub use ports::{ParticipantDirectory, ParticipantDirectoryExt, ParticipantQuery};
pub use error::ParticipantError;
