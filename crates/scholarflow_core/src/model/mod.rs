//! Domain model for tracked applications.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep scholarship and admission records in one shape so list, CSV and
//!   timeline views read the same record.
//!
//! # Invariants
//! - Every record is identified by a stable `ApplicationId`.
//! - Records are validated before every write.

pub mod application;
