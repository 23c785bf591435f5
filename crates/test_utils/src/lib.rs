//! Test Utilities Crate
//!
//! Shared test infrastructure for the CVM Capital workspace.
//!
//! # Modules
//!
//! - `fixtures`: Deterministic dates and ids, and `TestScenario`, a seeded
//!   in-memory store with the domain services wired on top
//! - `builders`: Builders for participants, periods and ledger entries
//! - `database`: PostgreSQL test containers running the real schema
//! - `assertions`: Distribution-specific assertion helpers
//! - `generators`: proptest strategies that respect the domain invariants

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
