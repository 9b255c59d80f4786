//! Application use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD, CSV transfer and timeline entry points for core
//!   callers (CLI, FFI).
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - The timeline is always laid out from the same filtered/sorted list the
//!   list view shows, one row per record.
//! - `today` is a parameter; the service never reads the clock for layout.

use crate::model::application::{Application, ApplicationId, Stage};
use crate::repo::application_repo::{
    ApplicationListQuery, ApplicationRepository, RepoError, RepoResult,
};
use crate::timeline::{TimelineLayout, ZoomLevel};
use crate::transfer::{applications_to_csv, parse_csv, rows_to_applications, CsvError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failure while importing CSV text.
#[derive(Debug)]
pub enum ImportError {
    Csv(CsvError),
    Repo(RepoError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv import failed: {err}"),
            Self::Repo(err) => write!(f, "csv import failed: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<CsvError> for ImportError {
    fn from(value: CsvError) -> Self {
        Self::Csv(value)
    }
}

impl From<RepoError> for ImportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Outcome of a successful CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub ids: Vec<ApplicationId>,
}

/// Outcome of a CSV export.
///
/// `exported` counts records; quoted fields may span several text lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub csv: String,
}

/// Use-case service wrapper for application records.
pub struct ApplicationService<R: ApplicationRepository> {
    repo: R,
}

impl<R: ApplicationRepository> ApplicationService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_application(&self, application: &Application) -> RepoResult<ApplicationId> {
        let id = self.repo.create_application(application)?;
        info!(
            "event=application_create module=service status=ok kind={}",
            application.kind().label()
        );
        Ok(id)
    }

    /// Replaces an existing record by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_application(&self, application: &Application) -> RepoResult<()> {
        self.repo.update_application(application)
    }

    /// Moves one record to `stage`.
    pub fn set_stage(&self, id: ApplicationId, stage: Stage) -> RepoResult<()> {
        let mut application = self
            .repo
            .get_application(id)?
            .ok_or(RepoError::NotFound(id))?;
        application.stage = stage;
        self.repo.update_application(&application)
    }

    pub fn get_application(&self, id: ApplicationId) -> RepoResult<Option<Application>> {
        self.repo.get_application(id)
    }

    /// Lists records using filter, sort and pagination options.
    pub fn list_applications(&self, query: &ApplicationListQuery) -> RepoResult<Vec<Application>> {
        self.repo.list_applications(query)
    }

    pub fn delete_application(&self, id: ApplicationId) -> RepoResult<()> {
        self.repo.delete_application(id)?;
        info!("event=application_delete module=service status=ok");
        Ok(())
    }

    /// Countries present in the store, for filter pickers.
    pub fn list_countries(&self) -> RepoResult<Vec<String>> {
        self.repo.list_countries()
    }

    /// Parses CSV text and appends every row as a new record.
    ///
    /// Nothing is written unless every row parses and validates.
    pub fn import_csv(&self, text: &str) -> Result<ImportSummary, ImportError> {
        let applications = parse_csv(text)
            .and_then(|rows| rows_to_applications(&rows))
            .inspect_err(|err| {
                warn!("event=csv_import module=service status=error error={err}");
            })?;

        let imported = self.repo.import_applications(&applications)?;
        info!("event=csv_import module=service status=ok count={imported}");

        Ok(ImportSummary {
            imported,
            ids: applications.iter().map(|application| application.id).collect(),
        })
    }

    /// Renders the records matching `query` as CSV.
    pub fn export_csv(&self, query: &ApplicationListQuery) -> RepoResult<ExportSummary> {
        let applications = self.repo.list_applications(query)?;
        info!(
            "event=csv_export module=service status=ok count={}",
            applications.len()
        );
        Ok(ExportSummary {
            exported: applications.len(),
            csv: applications_to_csv(&applications),
        })
    }

    /// Lays out the records matching `query` on the timeline.
    pub fn timeline(
        &self,
        query: &ApplicationListQuery,
        today: NaiveDate,
        zoom: ZoomLevel,
    ) -> RepoResult<TimelineLayout<ApplicationId>> {
        let items = self
            .repo
            .list_applications(query)?
            .iter()
            .map(Application::timeline_item)
            .collect::<Vec<_>>();
        Ok(TimelineLayout::compute(&items, today, zoom))
    }
}
