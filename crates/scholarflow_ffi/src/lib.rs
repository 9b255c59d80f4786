//! Flutter-facing bindings for ScholarFlow core.

pub mod api;
