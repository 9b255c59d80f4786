//! Application repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, filtered listing and bulk import over `applications`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Application::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - List order is fully deterministic: sort key first, then `id ASC`.
//! - Bulk import is all-or-nothing.

use crate::db::DbError;
use crate::model::application::{
    Application, ApplicationDetails, ApplicationId, ApplicationKind, ApplicationValidationError,
    GrantedBy, Region, Stage, TimelineStatus,
};
use crate::timeline::parse_iso_date;
use chrono::NaiveDate;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const APPLICATION_SELECT_SQL: &str = "SELECT
    id,
    type,
    name,
    organization,
    country,
    region,
    link,
    requirement_link,
    application_open,
    deadline,
    stage,
    timeline_status,
    notes,
    created_at,
    updated_at
FROM applications";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for application persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ApplicationValidationError),
    Db(DbError),
    NotFound(ApplicationId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "application not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted application data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ApplicationValidationError> for RepoError {
    fn from(value: ApplicationValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Field used to order list results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Deadline,
    CreatedAt,
    Name,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort options; defaults to deadline ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOptions {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Query options for listing applications.
///
/// Empty filter lists mean "no constraint"; non-empty lists match any of
/// their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationListQuery {
    pub stages: Vec<Stage>,
    pub countries: Vec<String>,
    pub kinds: Vec<ApplicationKind>,
    pub sort: SortOptions,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for application records.
pub trait ApplicationRepository {
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId>;
    /// Replaces every mutable field; `created_at` is kept and `updated_at`
    /// is refreshed by the store.
    fn update_application(&self, application: &Application) -> RepoResult<()>;
    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<Application>>;
    fn list_applications(&self, query: &ApplicationListQuery) -> RepoResult<Vec<Application>>;
    fn delete_application(&self, id: ApplicationId) -> RepoResult<()>;
    /// Inserts all records in one transaction and returns the count.
    fn import_applications(&self, applications: &[Application]) -> RepoResult<usize>;
    /// Distinct countries in ascending order.
    fn list_countries(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed application repository.
pub struct SqliteApplicationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteApplicationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ApplicationRepository for SqliteApplicationRepository<'_> {
    fn create_application(&self, application: &Application) -> RepoResult<ApplicationId> {
        application.validate()?;
        insert_application(self.conn, application)?;
        Ok(application.id)
    }

    fn update_application(&self, application: &Application) -> RepoResult<()> {
        application.validate()?;
        let columns = DetailColumns::from(application);

        let changed = self.conn.execute(
            "UPDATE applications
             SET
                type = ?1,
                name = ?2,
                organization = ?3,
                country = ?4,
                region = ?5,
                link = ?6,
                requirement_link = ?7,
                application_open = ?8,
                deadline = ?9,
                stage = ?10,
                timeline_status = ?11,
                notes = ?12,
                updated_at = MAX(updated_at + 1, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             WHERE id = ?13;",
            params![
                application.kind().label(),
                application.name(),
                application.organization(),
                application.country.as_str(),
                application.region.label(),
                application.primary_link(),
                columns.requirement_link,
                date_to_db(application.application_open),
                date_to_db(application.deadline),
                application.stage.label(),
                application.timeline_status.label(),
                application.notes.as_str(),
                application.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(application.id));
        }

        Ok(())
    }

    fn get_application(&self, id: ApplicationId) -> RepoResult<Option<Application>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{APPLICATION_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_application_row(row)?));
        }

        Ok(None)
    }

    fn list_applications(&self, query: &ApplicationListQuery) -> RepoResult<Vec<Application>> {
        let mut sql = format!("{APPLICATION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        push_in_filter(
            &mut sql,
            &mut bind_values,
            "stage",
            query.stages.iter().map(|stage| stage.label().to_string()),
        );
        push_in_filter(
            &mut sql,
            &mut bind_values,
            "country",
            query.countries.iter().cloned(),
        );
        push_in_filter(
            &mut sql,
            &mut bind_values,
            "type",
            query.kinds.iter().map(|kind| kind.label().to_string()),
        );

        let column = match query.sort.field {
            SortField::Deadline => "deadline",
            SortField::CreatedAt => "created_at",
            SortField::Name => "name",
        };
        let direction = match query.sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {column} {direction}, id ASC"));

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut applications = Vec::new();

        while let Some(row) = rows.next()? {
            applications.push(parse_application_row(row)?);
        }

        Ok(applications)
    }

    fn delete_application(&self, id: ApplicationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn import_applications(&self, applications: &[Application]) -> RepoResult<usize> {
        for application in applications {
            application.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        for application in applications {
            insert_application(&tx, application)?;
        }
        tx.commit()?;

        info!(
            "event=applications_import module=repo status=ok count={}",
            applications.len()
        );
        Ok(applications.len())
    }

    fn list_countries(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT country FROM applications ORDER BY country ASC;")?;
        let countries = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(countries)
    }
}

/// Kind-specific columns that have no accessor on `Application`.
struct DetailColumns<'a> {
    requirement_link: &'a str,
}

impl<'a> From<&'a Application> for DetailColumns<'a> {
    fn from(application: &'a Application) -> Self {
        let requirement_link = match &application.details {
            ApplicationDetails::Scholarship { .. } => "",
            ApplicationDetails::Admission {
                requirement_link, ..
            } => requirement_link.as_str(),
        };
        Self { requirement_link }
    }
}

fn insert_application(conn: &Connection, application: &Application) -> RepoResult<()> {
    let columns = DetailColumns::from(application);
    conn.execute(
        "INSERT INTO applications (
            id,
            type,
            name,
            organization,
            country,
            region,
            link,
            requirement_link,
            application_open,
            deadline,
            stage,
            timeline_status,
            notes,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
        params![
            application.id.to_string(),
            application.kind().label(),
            application.name(),
            application.organization(),
            application.country.as_str(),
            application.region.label(),
            application.primary_link(),
            columns.requirement_link,
            date_to_db(application.application_open),
            date_to_db(application.deadline),
            application.stage.label(),
            application.timeline_status.label(),
            application.notes.as_str(),
            application.created_at,
            application.updated_at,
        ],
    )?;
    Ok(())
}

fn push_in_filter(
    sql: &mut String,
    bind_values: &mut Vec<Value>,
    column: &str,
    values: impl Iterator<Item = String>,
) {
    let start = bind_values.len();
    bind_values.extend(values.map(Value::Text));
    let count = bind_values.len() - start;
    if count == 0 {
        return;
    }
    let placeholders = vec!["?"; count].join(", ");
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
}

fn parse_application_row(row: &Row<'_>) -> RepoResult<Application> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in applications.id"))
    })?;

    let type_text: String = row.get("type")?;
    let kind = ApplicationKind::from_label(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid type `{type_text}` in applications.type"))
    })?;

    let name: String = row.get("name")?;
    let organization: String = row.get("organization")?;
    let link: String = row.get("link")?;
    let details = match kind {
        ApplicationKind::Scholarship => ApplicationDetails::Scholarship {
            scholarship_name: name,
            granted_by: GrantedBy::from_label(&organization).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid granted_by `{organization}` in applications.organization"
                ))
            })?,
            link,
        },
        ApplicationKind::Admission => ApplicationDetails::Admission {
            program_name: name,
            school: organization,
            program_link: link,
            requirement_link: row.get("requirement_link")?,
        },
    };

    let region_text: String = row.get("region")?;
    let region = Region::from_label(&region_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid region `{region_text}` in applications.region"))
    })?;

    let stage_text: String = row.get("stage")?;
    let stage = Stage::from_label(&stage_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid stage `{stage_text}` in applications.stage"))
    })?;

    let status_text: String = row.get("timeline_status")?;
    let timeline_status = TimelineStatus::from_label(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timeline status `{status_text}` in applications.timeline_status"
        ))
    })?;

    let application = Application {
        id,
        details,
        country: row.get("country")?,
        region,
        application_open: parse_db_date(row, "application_open")?,
        deadline: parse_db_date(row, "deadline")?,
        stage,
        timeline_status,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    application.validate()?;
    Ok(application)
}

fn parse_db_date(row: &Row<'_>, column: &str) -> RepoResult<NaiveDate> {
    let text: String = row.get(column)?;
    parse_iso_date(&text)
        .map_err(|err| RepoError::InvalidData(format!("{err} in applications.{column}")))
}

fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
