//! ScholarFlow command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto `ApplicationService` use cases.
//! - Resolve configuration from environment plus flag overrides.
//!
//! # Invariants
//! - The clock is read here only; core calls always receive `today`.
//! - JSON output goes to stdout, status lines go to stderr.

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use scholarflow_core::db::open_db;
use scholarflow_core::{
    init_logging_from_config, parse_iso_date, Application, ApplicationDetails, ApplicationId,
    ApplicationKind, ApplicationListQuery, ApplicationService, CoreConfig, DeadlineStatus,
    GrantedBy, InvalidDateInput, Region, SortDirection, SortField, SortOptions,
    SqliteApplicationRepository, Stage, TimelineLayout, TimelineStatus, ZoomLevel,
};

#[derive(Parser, Debug)]
#[command(name = "scholarflow", version, about = "Track scholarship and admission deadlines")]
struct Cli {
    /// SQLite database path (overrides SCHOLARFLOW_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log directory (overrides SCHOLARFLOW_LOG_DIR).
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (overrides SCHOLARFLOW_LOG_LEVEL).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a scholarship or admission record.
    Add(AddArgs),
    /// Move a record to another stage.
    UpdateStage(UpdateStageArgs),
    /// Delete a record permanently.
    Delete(DeleteArgs),
    /// List records with filters and sorting.
    List(ListArgs),
    /// Import records from a CSV file.
    Import(ImportArgs),
    /// Export records as CSV.
    Export(ExportArgs),
    /// Print the timeline layout as JSON.
    Timeline(TimelineArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Scholarship,
    Admission,
}

impl From<KindArg> for ApplicationKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Scholarship => Self::Scholarship,
            KindArg::Admission => Self::Admission,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Deadline,
    CreatedAt,
    Name,
}

impl From<SortArg> for SortField {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::Deadline => Self::Deadline,
            SortArg::CreatedAt => Self::CreatedAt,
            SortArg::Name => Self::Name,
        }
    }
}

#[derive(Parser, Debug)]
struct AddArgs {
    #[arg(long, value_enum)]
    kind: KindArg,

    /// Scholarship name or program name.
    #[arg(long)]
    name: String,

    /// Granting body (University|Government|Both) or school name.
    #[arg(long)]
    organization: String,

    #[arg(long)]
    country: String,

    #[arg(long, value_parser = parse_region, default_value = "Europe")]
    region: Region,

    /// Scholarship link or program link.
    #[arg(long, default_value = "")]
    link: String,

    /// Admission requirements page.
    #[arg(long, default_value = "")]
    requirement_link: String,

    /// Application window opening date (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    open: NaiveDate,

    /// Deadline (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    deadline: NaiveDate,

    #[arg(long, value_parser = parse_stage, default_value = "To Apply")]
    stage: Stage,

    /// Mark dates as confirmed (`CON`) instead of estimated.
    #[arg(long, default_value_t = false)]
    confirmed: bool,

    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Parser, Debug)]
struct UpdateStageArgs {
    id: ApplicationId,

    #[arg(value_parser = parse_stage)]
    stage: Stage,
}

#[derive(Parser, Debug)]
struct DeleteArgs {
    id: ApplicationId,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    /// Keep only these stages (repeatable).
    #[arg(long, value_parser = parse_stage)]
    stage: Vec<Stage>,

    /// Keep only these countries (repeatable).
    #[arg(long)]
    country: Vec<String>,

    /// Keep only these kinds (repeatable).
    #[arg(long, value_enum)]
    kind: Vec<KindArg>,

    #[arg(long, value_enum, default_value_t = SortArg::Deadline)]
    sort: SortArg,

    /// Sort descending.
    #[arg(long, default_value_t = false)]
    desc: bool,
}

impl FilterArgs {
    fn query(&self) -> ApplicationListQuery {
        ApplicationListQuery {
            stages: self.stage.clone(),
            countries: self.country.clone(),
            kinds: self.kind.iter().copied().map(ApplicationKind::from).collect(),
            sort: SortOptions {
                field: self.sort.into(),
                direction: if self.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            },
            ..ApplicationListQuery::default()
        }
    }
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[command(flatten)]
    filter: FilterArgs,

    #[arg(long)]
    limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Reference date for deadline status (defaults to the local date).
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Print records as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// CSV file to import.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// Output CSV path; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    filter: FilterArgs,

    /// coarse|medium|fine (or month|week|day).
    #[arg(long, default_value = "coarse")]
    zoom: ZoomLevel,

    /// Date treated as today (defaults to the local date).
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,

    /// Viewport width in pixels for scroll targets.
    #[arg(long)]
    viewport: Option<f64>,

    /// Record to compute a scroll target for.
    #[arg(long)]
    focus: Option<ApplicationId>,

    /// Include axis decorations in the output.
    #[arg(long, default_value_t = false)]
    decorations: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    init_logging_from_config(&config)
        .map_err(anyhow::Error::msg)
        .context("initialize logging")?;

    let conn = open_db(&config.db_path)
        .with_context(|| format!("open database '{}'", config.db_path.display()))?;
    let service = ApplicationService::new(SqliteApplicationRepository::new(&conn));

    match cli.cmd {
        Command::Add(args) => cmd_add(&service, args),
        Command::UpdateStage(args) => cmd_update_stage(&service, args),
        Command::Delete(args) => cmd_delete(&service, args),
        Command::List(args) => cmd_list(&service, args),
        Command::Import(args) => cmd_import(&service, args),
        Command::Export(args) => cmd_export(&service, args),
        Command::Timeline(args) => cmd_timeline(&service, args),
    }
}

type Service<'conn> = ApplicationService<SqliteApplicationRepository<'conn>>;

fn resolve_config(cli: &Cli) -> CoreConfig {
    let mut config = CoreConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = log_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config
}

fn cmd_add(service: &Service<'_>, args: AddArgs) -> anyhow::Result<()> {
    let details = match args.kind {
        KindArg::Scholarship => ApplicationDetails::Scholarship {
            scholarship_name: args.name,
            granted_by: GrantedBy::from_label(&args.organization).with_context(|| {
                format!(
                    "invalid granting body '{}'; expected University|Government|Both",
                    args.organization
                )
            })?,
            link: args.link,
        },
        KindArg::Admission => ApplicationDetails::Admission {
            program_name: args.name,
            school: args.organization,
            program_link: args.link,
            requirement_link: args.requirement_link,
        },
    };

    let mut application =
        Application::new(details, args.country, args.region, args.open, args.deadline);
    application.stage = args.stage;
    application.notes = args.notes;
    if args.confirmed {
        application.timeline_status = TimelineStatus::Confirmed;
    }

    let id = service
        .add_application(&application)
        .context("add application")?;
    println!("{id}");
    Ok(())
}

fn cmd_update_stage(service: &Service<'_>, args: UpdateStageArgs) -> anyhow::Result<()> {
    service
        .set_stage(args.id, args.stage)
        .with_context(|| format!("update stage of {}", args.id))?;
    eprintln!("{} -> {}", args.id, args.stage.label());
    Ok(())
}

fn cmd_delete(service: &Service<'_>, args: DeleteArgs) -> anyhow::Result<()> {
    service
        .delete_application(args.id)
        .with_context(|| format!("delete {}", args.id))?;
    eprintln!("deleted {}", args.id);
    Ok(())
}

fn cmd_list(service: &Service<'_>, args: ListArgs) -> anyhow::Result<()> {
    let query = ApplicationListQuery {
        limit: args.limit,
        offset: args.offset,
        ..args.filter.query()
    };
    let applications = service
        .list_applications(&query)
        .context("list applications")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&applications).context("serialize applications")?
        );
        return Ok(());
    }

    let today = args.today.unwrap_or_else(local_today);
    for application in &applications {
        println!(
            "{}  {}  {:<11}  {:<11}  {} ({}, {})  [{}]",
            application.id,
            application.deadline.format("%Y-%m-%d"),
            application.stage.label(),
            application.kind().label(),
            application.name(),
            application.organization(),
            application.country,
            deadline_label(application.deadline_status(today)),
        );
    }
    eprintln!("{} application(s)", applications.len());
    Ok(())
}

fn cmd_import(service: &Service<'_>, args: ImportArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read csv '{}'", args.in_path.display()))?;
    let summary = service
        .import_csv(&text)
        .with_context(|| format!("import '{}'", args.in_path.display()))?;
    eprintln!("imported {} application(s)", summary.imported);
    Ok(())
}

fn cmd_export(service: &Service<'_>, args: ExportArgs) -> anyhow::Result<()> {
    let export = service
        .export_csv(&args.filter.query())
        .context("export applications")?;
    let csv = export.csv;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, format!("{csv}\n"))
                .with_context(|| format!("write csv '{}'", out.display()))?;
            eprintln!("wrote {} application(s) to {}", export.exported, out.display());
        }
        None => println!("{csv}"),
    }
    Ok(())
}

fn cmd_timeline(service: &Service<'_>, args: TimelineArgs) -> anyhow::Result<()> {
    let today = args.today.unwrap_or_else(local_today);
    let layout = service
        .timeline(&args.filter.query(), today, args.zoom)
        .context("lay out timeline")?;

    let view = timeline_view(&layout, &args).context("serialize timeline")?;
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

fn timeline_view(
    layout: &TimelineLayout<ApplicationId>,
    args: &TimelineArgs,
) -> serde_json::Result<serde_json::Value> {
    let mut view = serde_json::Map::new();
    view.insert("layout".to_string(), serde_json::to_value(layout)?);
    view.insert(
        "initial_scroll_px".to_string(),
        serde_json::to_value(layout.initial_scroll_px(args.viewport))?,
    );
    if let Some(focus) = &args.focus {
        view.insert(
            "focus_scroll_px".to_string(),
            serde_json::to_value(layout.scroll_to(focus, args.viewport))?,
        );
    }
    if args.decorations {
        let marks = layout.decorations().collect::<Vec<_>>();
        view.insert("decorations".to_string(), serde_json::to_value(marks)?);
    }
    Ok(serde_json::Value::Object(view))
}

fn deadline_label(status: DeadlineStatus) -> String {
    match status {
        DeadlineStatus::PastDue => "Past due".to_string(),
        DeadlineStatus::DueToday => "Due today".to_string(),
        DeadlineStatus::DueTomorrow => "Due tomorrow".to_string(),
        DeadlineStatus::DueSoon(days) => format!("{days} days left"),
        DeadlineStatus::Upcoming(days) => format!("{days} days"),
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(value: &str) -> Result<NaiveDate, InvalidDateInput> {
    parse_iso_date(value)
}

fn parse_stage(value: &str) -> Result<Stage, String> {
    Stage::from_label(value).ok_or_else(|| {
        format!("unknown stage '{value}'; expected To Apply|In Progress|Submitted|Done")
    })
}

fn parse_region(value: &str) -> Result<Region, String> {
    Region::from_label(value).ok_or_else(|| format!("unknown region '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::{deadline_label, Cli, Command};
    use clap::Parser;
    use scholarflow_core::{DeadlineStatus, Stage, ZoomLevel};

    #[test]
    fn parses_timeline_flags() {
        let cli = Cli::try_parse_from([
            "scholarflow",
            "--db",
            "/tmp/apps.db",
            "timeline",
            "--zoom",
            "week",
            "--today",
            "2024-06-15",
            "--stage",
            "in progress",
            "--viewport",
            "800",
        ])
        .unwrap();

        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/apps.db")));
        match cli.cmd {
            Command::Timeline(args) => {
                assert_eq!(args.zoom, ZoomLevel::Medium);
                assert_eq!(args.filter.stage, vec![Stage::InProgress]);
                assert_eq!(args.viewport, Some(800.0));
                assert!(args.today.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_dates_and_stages() {
        assert!(Cli::try_parse_from(["scholarflow", "list", "--today", "soon"]).is_err());
        assert!(Cli::try_parse_from(["scholarflow", "list", "--stage", "waiting"]).is_err());
    }

    #[test]
    fn deadline_labels_read_naturally() {
        assert_eq!(deadline_label(DeadlineStatus::PastDue), "Past due");
        assert_eq!(deadline_label(DeadlineStatus::DueSoon(3)), "3 days left");
    }
}
