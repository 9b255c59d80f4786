//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI/FFI layers decoupled from storage details.

pub mod application_service;
