//! Domain layer for budget reconciliation
//!
//! Value types, collaborator ports and domain errors.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
