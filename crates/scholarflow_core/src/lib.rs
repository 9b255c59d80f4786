//! Core domain logic for ScholarFlow.
//! This crate is the single source of truth for application records and the
//! timeline layout engine.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod timeline;
pub mod transfer;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::application::{
    Application, ApplicationDetails, ApplicationId, ApplicationKind, ApplicationValidationError,
    DeadlineStatus, GrantedBy, Region, Stage, TimelineStatus,
};
pub use repo::application_repo::{
    ApplicationListQuery, ApplicationRepository, RepoError, RepoResult, SortDirection, SortField,
    SortOptions, SqliteApplicationRepository,
};
pub use service::application_service::{
    ApplicationService, ExportSummary, ImportError, ImportSummary,
};
pub use timeline::{
    parse_iso_date, AxisLabel, AxisMark, InvalidDateInput, ItemGeometry, TimeRange, TimelineItem,
    TimelineLayout, TodayMarker, ZoomLevel,
};
pub use transfer::{applications_to_csv, parse_csv, CsvError, CsvRow, CSV_HEADERS};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
