//! Application record domain model.
//!
//! # Responsibility
//! - Define the canonical scholarship/admission application record.
//! - Provide label mappings shared by storage and CSV transfer.
//! - Validate required fields before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - Kind-specific fields live in [`ApplicationDetails`]; there is no
//!   half-scholarship/half-admission state.
//! - `deadline` may precede `application_open`; callers clamp visually.

use crate::timeline::calendar::days_between;
use crate::timeline::TimelineItem;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an application record.
pub type ApplicationId = Uuid;

/// Record family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    Scholarship,
    Admission,
}

impl ApplicationKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Scholarship => "scholarship",
            Self::Admission => "admission",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scholarship" => Some(Self::Scholarship),
            "admission" => Some(Self::Admission),
            _ => None,
        }
    }
}

/// Progress of one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ToApply,
    InProgress,
    Submitted,
    Done,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ToApply,
        Stage::InProgress,
        Stage::Submitted,
        Stage::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ToApply => "To Apply",
            Self::InProgress => "In Progress",
            Self::Submitted => "Submitted",
            Self::Done => "Done",
        }
    }

    /// Accepts display labels case-insensitively, plus snake_case names.
    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|stage| stage.label().to_ascii_lowercase() == normalized)
    }
}

/// Body funding a scholarship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantedBy {
    University,
    Government,
    Both,
}

impl GrantedBy {
    pub fn label(self) -> &'static str {
        match self {
            Self::University => "University",
            Self::Government => "Government",
            Self::Both => "Both",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "university" => Some(Self::University),
            "government" => Some(Self::Government),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Whether the dates are published (`CON`) or guessed from past cycles (`EST`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimelineStatus {
    #[serde(rename = "EST")]
    Estimated,
    #[serde(rename = "CON")]
    Confirmed,
}

impl TimelineStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Estimated => "EST",
            Self::Confirmed => "CON",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EST" => Some(Self::Estimated),
            "CON" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Europe,
    NorthAmerica,
    Asia,
    Oceania,
    MiddleEast,
    Africa,
    SouthAmerica,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::Europe,
        Region::NorthAmerica,
        Region::Asia,
        Region::Oceania,
        Region::MiddleEast,
        Region::Africa,
        Region::SouthAmerica,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Europe => "Europe",
            Self::NorthAmerica => "North America",
            Self::Asia => "Asia",
            Self::Oceania => "Oceania",
            Self::MiddleEast => "Middle East",
            Self::Africa => "Africa",
            Self::SouthAmerica => "South America",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|region| region.label().to_ascii_lowercase() == normalized)
    }
}

/// Kind-specific part of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApplicationDetails {
    Scholarship {
        scholarship_name: String,
        granted_by: GrantedBy,
        link: String,
    },
    Admission {
        program_name: String,
        school: String,
        program_link: String,
        requirement_link: String,
    },
}

/// Canonical application record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    #[serde(flatten)]
    pub details: ApplicationDetails,
    pub country: String,
    pub region: Region,
    pub application_open: NaiveDate,
    pub deadline: NaiveDate,
    pub stage: Stage,
    pub timeline_status: TimelineStatus,
    pub notes: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by the store on update.
    pub updated_at: i64,
}

/// Deadline proximity relative to a caller-provided `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "days", rename_all = "snake_case")]
pub enum DeadlineStatus {
    PastDue,
    DueToday,
    DueTomorrow,
    /// Two to seven days left.
    DueSoon(i64),
    Upcoming(i64),
}

/// Validation failure for application writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationValidationError {
    MissingName,
    MissingCountry,
    MissingSchool,
}

impl Display for ApplicationValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "application name is required"),
            Self::MissingCountry => write!(f, "country is required"),
            Self::MissingSchool => write!(f, "school is required for admission applications"),
        }
    }
}

impl Error for ApplicationValidationError {}

impl Application {
    /// Creates a record with a generated id and current timestamps.
    ///
    /// Defaults: stage `To Apply`, status `EST`, empty notes.
    pub fn new(
        details: ApplicationDetails,
        country: impl Into<String>,
        region: Region,
        application_open: NaiveDate,
        deadline: NaiveDate,
    ) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4(),
            details,
            country: country.into(),
            region,
            application_open,
            deadline,
            stage: Stage::ToApply,
            timeline_status: TimelineStatus::Estimated,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn kind(&self) -> ApplicationKind {
        match self.details {
            ApplicationDetails::Scholarship { .. } => ApplicationKind::Scholarship,
            ApplicationDetails::Admission { .. } => ApplicationKind::Admission,
        }
    }

    /// Scholarship name or program name.
    pub fn name(&self) -> &str {
        match &self.details {
            ApplicationDetails::Scholarship {
                scholarship_name, ..
            } => scholarship_name,
            ApplicationDetails::Admission { program_name, .. } => program_name,
        }
    }

    /// Granting body label or school name.
    pub fn organization(&self) -> &str {
        match &self.details {
            ApplicationDetails::Scholarship { granted_by, .. } => granted_by.label(),
            ApplicationDetails::Admission { school, .. } => school,
        }
    }

    /// Scholarship link or program link.
    pub fn primary_link(&self) -> &str {
        match &self.details {
            ApplicationDetails::Scholarship { link, .. } => link,
            ApplicationDetails::Admission { program_link, .. } => program_link,
        }
    }

    /// Checks required fields.
    ///
    /// Reversed date ranges are accepted on purpose; the timeline draws them
    /// with the minimum bar width.
    pub fn validate(&self) -> Result<(), ApplicationValidationError> {
        if self.name().trim().is_empty() {
            return Err(ApplicationValidationError::MissingName);
        }
        if self.country.trim().is_empty() {
            return Err(ApplicationValidationError::MissingCountry);
        }
        if let ApplicationDetails::Admission { school, .. } = &self.details {
            if school.trim().is_empty() {
                return Err(ApplicationValidationError::MissingSchool);
            }
        }
        Ok(())
    }

    pub fn deadline_status(&self, today: NaiveDate) -> DeadlineStatus {
        match days_between(today, self.deadline) {
            days if days < 0 => DeadlineStatus::PastDue,
            0 => DeadlineStatus::DueToday,
            1 => DeadlineStatus::DueTomorrow,
            days if days <= 7 => DeadlineStatus::DueSoon(days),
            days => DeadlineStatus::Upcoming(days),
        }
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.deadline < today
    }

    /// Projection read by the timeline layout engine.
    pub fn timeline_item(&self) -> TimelineItem<ApplicationId> {
        TimelineItem::new(self.id, self.application_open, self.deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Application, ApplicationDetails, ApplicationKind, ApplicationValidationError,
        DeadlineStatus, GrantedBy, Region, Stage, TimelineStatus,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn admission(school: &str) -> Application {
        Application::new(
            ApplicationDetails::Admission {
                program_name: "MSc Data Science".to_string(),
                school: school.to_string(),
                program_link: "https://example.edu/msc".to_string(),
                requirement_link: String::new(),
            },
            "Netherlands",
            Region::Europe,
            date(2024, 10, 1),
            date(2025, 1, 15),
        )
    }

    #[test]
    fn labels_round_trip_case_insensitively() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_label(&stage.label().to_uppercase()), Some(stage));
        }
        assert_eq!(Stage::from_label("in_progress"), Some(Stage::InProgress));
        for region in Region::ALL {
            assert_eq!(Region::from_label(region.label()), Some(region));
        }
        assert_eq!(GrantedBy::from_label("both"), Some(GrantedBy::Both));
        assert_eq!(TimelineStatus::from_label("con"), Some(TimelineStatus::Confirmed));
        assert_eq!(ApplicationKind::from_label("Scholarship"), Some(ApplicationKind::Scholarship));
        assert_eq!(ApplicationKind::from_label("grant"), None);
    }

    #[test]
    fn new_application_has_defaults() {
        let app = admission("TU Delft");
        assert_eq!(app.kind(), ApplicationKind::Admission);
        assert_eq!(app.stage, Stage::ToApply);
        assert_eq!(app.timeline_status, TimelineStatus::Estimated);
        assert_eq!(app.created_at, app.updated_at);
        assert_eq!(app.organization(), "TU Delft");
        assert!(app.validate().is_ok());
    }

    #[test]
    fn validate_requires_school_for_admissions() {
        let app = admission("  ");
        assert_eq!(app.validate(), Err(ApplicationValidationError::MissingSchool));
    }

    #[test]
    fn validate_accepts_reversed_dates() {
        let mut app = admission("TU Delft");
        app.deadline = date(2024, 1, 1);
        assert!(app.validate().is_ok());
    }

    #[test]
    fn deadline_status_buckets() {
        let app = admission("TU Delft");
        assert_eq!(app.deadline_status(date(2025, 1, 16)), DeadlineStatus::PastDue);
        assert_eq!(app.deadline_status(date(2025, 1, 15)), DeadlineStatus::DueToday);
        assert_eq!(app.deadline_status(date(2025, 1, 14)), DeadlineStatus::DueTomorrow);
        assert_eq!(app.deadline_status(date(2025, 1, 8)), DeadlineStatus::DueSoon(7));
        assert_eq!(app.deadline_status(date(2025, 1, 1)), DeadlineStatus::Upcoming(14));
        assert!(app.is_expired(date(2025, 1, 16)));
        assert!(!app.is_expired(date(2025, 1, 15)));
    }

    #[test]
    fn serializes_with_flattened_kind_tag() {
        let app = Application::new(
            ApplicationDetails::Scholarship {
                scholarship_name: "Erasmus Mundus".to_string(),
                granted_by: GrantedBy::Government,
                link: String::new(),
            },
            "Many",
            Region::Europe,
            date(2024, 10, 1),
            date(2025, 1, 15),
        );
        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["type"], "scholarship");
        assert_eq!(json["scholarship_name"], "Erasmus Mundus");
        assert_eq!(json["timeline_status"], "EST");
        assert_eq!(json["application_open"], "2024-10-01");
    }
}
