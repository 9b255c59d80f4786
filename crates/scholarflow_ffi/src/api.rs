//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose application CRUD, CSV transfer and timeline layout to Dart via
//!   FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Record ids and dates cross the boundary as strings (UUID, `YYYY-MM-DD`).
//! - The database path is resolved once per process from `CoreConfig`.

use chrono::{Local, NaiveDate};
use log::warn;
use scholarflow_core::db::open_db;
use scholarflow_core::timeline::calendar::days_between;
use scholarflow_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, parse_iso_date,
    ping as ping_inner, Application, ApplicationDetails, ApplicationId, ApplicationListQuery,
    ApplicationService, CoreConfig, GrantedBy, Region, SortDirection, SortField, SortOptions,
    SqliteApplicationRepository, Stage, TimelineLayout, ZoomLevel,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat application projection for list views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationItem {
    pub id: String,
    /// `scholarship|admission`.
    pub kind: String,
    pub name: String,
    /// Granting body for scholarships, school for admissions.
    pub organization: String,
    pub country: String,
    pub region: String,
    pub link: String,
    pub application_open: String,
    pub deadline: String,
    pub stage: String,
    /// `EST|CON`.
    pub timeline_status: String,
    pub notes: String,
    /// Days from today until the deadline; negative when past due.
    pub days_left: i64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationListResponse {
    pub ok: bool,
    pub items: Vec<ApplicationItem>,
    pub message: String,
}

/// Generic action response envelope for write operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationActionResponse {
    pub ok: bool,
    /// Affected record ID.
    pub application_id: Option<String>,
    pub message: String,
}

impl ApplicationActionResponse {
    fn success(message: impl Into<String>, application_id: ApplicationId) -> Self {
        Self {
            ok: true,
            application_id: Some(application_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            application_id: None,
            message: message.into(),
        }
    }
}

/// CSV import/export envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTransferResponse {
    pub ok: bool,
    /// Rows imported or exported.
    pub count: u32,
    /// Exported CSV text; empty for imports and failures.
    pub csv: String,
    pub message: String,
}

/// Timeline layout envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineResponse {
    pub ok: bool,
    /// Layout and axis decorations serialized as JSON.
    pub layout_json: String,
    /// Scroll offset centering today.
    pub initial_scroll_px: f64,
    /// Scroll offset centering `focus_id`, when requested and laid out.
    pub focus_scroll_px: Option<f64>,
    pub message: String,
}

impl TimelineResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            layout_json: String::new(),
            initial_scroll_px: 0.0,
            focus_scroll_px: None,
            message: message.into(),
        }
    }
}

/// Lists applications with optional stage/country filters.
///
/// Input semantics:
/// - `stage`, `country`: exact values; `None` or blank means no filter.
/// - `sort`: `deadline|created_at|name`, defaults to `deadline`.
/// - `descending`: reverses the sort direction.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn application_list(
    stage: Option<String>,
    country: Option<String>,
    sort: Option<String>,
    descending: bool,
) -> ApplicationListResponse {
    let result = build_query(stage, country, sort, descending).and_then(|query| {
        with_service(|service| {
            service
                .list_applications(&query)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(applications) => {
            let today = Local::now().date_naive();
            let items = applications
                .iter()
                .map(|application| to_item(application, today))
                .collect::<Vec<_>>();
            let message = format!("Found {} application(s).", items.len());
            ApplicationListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => ApplicationListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("application_list failed: {err}"),
        },
    }
}

/// Creates a scholarship record.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Dates are `YYYY-MM-DD`; `granted_by` is `University|Government|Both`.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn application_create_scholarship(
    name: String,
    granted_by: String,
    country: String,
    region: String,
    link: String,
    application_open: String,
    deadline: String,
) -> ApplicationActionResponse {
    let result = GrantedBy::from_label(&granted_by)
        .ok_or_else(|| format!("invalid granted_by `{granted_by}`"))
        .and_then(|granted_by| {
            new_application(
                ApplicationDetails::Scholarship {
                    scholarship_name: name.trim().to_string(),
                    granted_by,
                    link: link.trim().to_string(),
                },
                &country,
                &region,
                &application_open,
                &deadline,
            )
        })
        .and_then(|application| {
            with_service(|service| {
                service
                    .add_application(&application)
                    .map_err(|err| err.to_string())
            })
        });

    match result {
        Ok(id) => ApplicationActionResponse::success("Scholarship created.", id),
        Err(err) => ApplicationActionResponse::failure(format!(
            "application_create_scholarship failed: {err}"
        )),
    }
}

/// Creates an admission record.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn application_create_admission(
    program_name: String,
    school: String,
    country: String,
    region: String,
    program_link: String,
    requirement_link: String,
    application_open: String,
    deadline: String,
) -> ApplicationActionResponse {
    let result = new_application(
        ApplicationDetails::Admission {
            program_name: program_name.trim().to_string(),
            school: school.trim().to_string(),
            program_link: program_link.trim().to_string(),
            requirement_link: requirement_link.trim().to_string(),
        },
        &country,
        &region,
        &application_open,
        &deadline,
    )
    .and_then(|application| {
        with_service(|service| {
            service
                .add_application(&application)
                .map_err(|err| err.to_string())
        })
    });

    match result {
        Ok(id) => ApplicationActionResponse::success("Admission created.", id),
        Err(err) => ApplicationActionResponse::failure(format!(
            "application_create_admission failed: {err}"
        )),
    }
}

/// Moves one record to another stage.
#[flutter_rust_bridge::frb(sync)]
pub fn application_set_stage(application_id: String, stage: String) -> ApplicationActionResponse {
    let result = parse_id(&application_id).and_then(|id| {
        let stage = Stage::from_label(&stage).ok_or_else(|| format!("invalid stage `{stage}`"))?;
        with_service(|service| service.set_stage(id, stage).map_err(|err| err.to_string()))?;
        Ok(id)
    });

    match result {
        Ok(id) => ApplicationActionResponse::success("Stage updated.", id),
        Err(err) => {
            ApplicationActionResponse::failure(format!("application_set_stage failed: {err}"))
        }
    }
}

/// Deletes one record permanently.
#[flutter_rust_bridge::frb(sync)]
pub fn application_delete(application_id: String) -> ApplicationActionResponse {
    let result = parse_id(&application_id).and_then(|id| {
        with_service(|service| service.delete_application(id).map_err(|err| err.to_string()))?;
        Ok(id)
    });

    match result {
        Ok(id) => ApplicationActionResponse::success("Application deleted.", id),
        Err(err) => ApplicationActionResponse::failure(format!("application_delete failed: {err}")),
    }
}

/// Imports CSV text; nothing is written when any row is invalid.
#[flutter_rust_bridge::frb(sync)]
pub fn csv_import(text: String) -> CsvTransferResponse {
    match with_service(|service| service.import_csv(&text).map_err(|err| err.to_string())) {
        Ok(summary) => CsvTransferResponse {
            ok: true,
            count: u32::try_from(summary.imported).unwrap_or(u32::MAX),
            csv: String::new(),
            message: format!("Imported {} application(s).", summary.imported),
        },
        Err(err) => CsvTransferResponse {
            ok: false,
            count: 0,
            csv: String::new(),
            message: format!("csv_import failed: {err}"),
        },
    }
}

/// Exports every record as CSV, deadline ascending.
#[flutter_rust_bridge::frb(sync)]
pub fn csv_export() -> CsvTransferResponse {
    let query = ApplicationListQuery::default();
    match with_service(|service| service.export_csv(&query).map_err(|err| err.to_string())) {
        Ok(export) => CsvTransferResponse {
            ok: true,
            count: u32::try_from(export.exported).unwrap_or(u32::MAX),
            csv: export.csv,
            message: format!("Exported {} application(s).", export.exported),
        },
        Err(err) => CsvTransferResponse {
            ok: false,
            count: 0,
            csv: String::new(),
            message: format!("csv_export failed: {err}"),
        },
    }
}

/// Lays out the filtered records on the timeline.
///
/// Input semantics:
/// - `zoom`: `coarse|medium|fine` (aliases `month|week|day`).
/// - `today`: `YYYY-MM-DD`; `None` uses the local calendar date.
/// - `viewport_width`: visible width in pixels; `None` or `<= 0` yields
///   scroll offsets of `0`.
/// - `focus_id`: record to compute a scroll target for.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn timeline_layout(
    zoom: String,
    today: Option<String>,
    viewport_width: Option<f64>,
    stage: Option<String>,
    country: Option<String>,
    focus_id: Option<String>,
) -> TimelineResponse {
    let zoom = match zoom.parse::<ZoomLevel>() {
        Ok(zoom) => zoom,
        Err(err) => return TimelineResponse::failure(format!("timeline_layout failed: {err}")),
    };
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => return TimelineResponse::failure(format!("timeline_layout failed: {err}")),
    };
    let focus = match focus_id.as_deref().map(parse_id).transpose() {
        Ok(focus) => focus,
        Err(err) => return TimelineResponse::failure(format!("timeline_layout failed: {err}")),
    };

    let layout = build_query(stage, country, None, false).and_then(|query| {
        with_service(|service| {
            service
                .timeline(&query, today, zoom)
                .map_err(|err| err.to_string())
        })
    });
    let layout = match layout {
        Ok(layout) => layout,
        Err(err) => return TimelineResponse::failure(format!("timeline_layout failed: {err}")),
    };

    match layout_to_json(&layout) {
        Ok(layout_json) => TimelineResponse {
            ok: true,
            layout_json,
            initial_scroll_px: layout.initial_scroll_px(viewport_width),
            focus_scroll_px: focus.and_then(|id| layout.scroll_to(&id, viewport_width)),
            message: format!("Laid out {} application(s).", layout.bars.len()),
        },
        Err(err) => {
            warn!("event=timeline_serialize module=ffi status=error error={err}");
            TimelineResponse::failure(format!("timeline_layout failed: {err}"))
        }
    }
}

fn layout_to_json(layout: &TimelineLayout<ApplicationId>) -> Result<String, serde_json::Error> {
    let decorations = layout.decorations().collect::<Vec<_>>();
    let mut view = serde_json::Map::new();
    view.insert("layout".to_string(), serde_json::to_value(layout)?);
    view.insert("decorations".to_string(), serde_json::to_value(decorations)?);
    serde_json::to_string(&view)
}

fn build_query(
    stage: Option<String>,
    country: Option<String>,
    sort: Option<String>,
    descending: bool,
) -> Result<ApplicationListQuery, String> {
    let stages = match non_blank(stage) {
        Some(raw) => vec![Stage::from_label(&raw).ok_or_else(|| format!("invalid stage `{raw}`"))?],
        None => Vec::new(),
    };
    let field = match non_blank(sort).as_deref() {
        None | Some("deadline") => SortField::Deadline,
        Some("created_at") | Some("createdAt") => SortField::CreatedAt,
        Some("name") => SortField::Name,
        Some(other) => return Err(format!("invalid sort `{other}`")),
    };

    Ok(ApplicationListQuery {
        stages,
        countries: non_blank(country).into_iter().collect(),
        sort: SortOptions {
            field,
            direction: if descending {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        },
        ..ApplicationListQuery::default()
    })
}

fn new_application(
    details: ApplicationDetails,
    country: &str,
    region: &str,
    application_open: &str,
    deadline: &str,
) -> Result<Application, String> {
    let region = if region.trim().is_empty() {
        Region::Europe
    } else {
        Region::from_label(region).ok_or_else(|| format!("invalid region `{region}`"))?
    };
    let open = parse_iso_date(application_open).map_err(|err| err.to_string())?;
    let deadline = parse_iso_date(deadline).map_err(|err| err.to_string())?;
    Ok(Application::new(
        details,
        country.trim(),
        region,
        open,
        deadline,
    ))
}

fn to_item(application: &Application, today: NaiveDate) -> ApplicationItem {
    ApplicationItem {
        id: application.id.to_string(),
        kind: application.kind().label().to_string(),
        name: application.name().to_string(),
        organization: application.organization().to_string(),
        country: application.country.clone(),
        region: application.region.label().to_string(),
        link: application.primary_link().to_string(),
        application_open: application.application_open.format("%Y-%m-%d").to_string(),
        deadline: application.deadline.format("%Y-%m-%d").to_string(),
        stage: application.stage.label().to_string(),
        timeline_status: application.timeline_status.label().to_string(),
        notes: application.notes.clone(),
        days_left: days_between(today, application.deadline),
    }
}

fn resolve_today(today: Option<String>) -> Result<NaiveDate, String> {
    match non_blank(today) {
        Some(raw) => parse_iso_date(&raw).map_err(|err| err.to_string()),
        None => Ok(Local::now().date_naive()),
    }
}

fn parse_id(raw: &str) -> Result<ApplicationId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid application id `{raw}`"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn with_service<T>(
    f: impl FnOnce(&ApplicationService<SqliteApplicationRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let service = ApplicationService::new(SqliteApplicationRepository::new(&conn));
    f(&service)
}
