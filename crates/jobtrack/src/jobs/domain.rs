use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Identifier assigned by the job store when an application is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where an application currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Applied,
    #[serde(rename = "Interview Scheduled")]
    InterviewScheduled,
    Rejected,
    #[serde(rename = "Offer Received")]
    OfferReceived,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Applied => "Applied",
            JobStatus::InterviewScheduled => "Interview Scheduled",
            JobStatus::Rejected => "Rejected",
            JobStatus::OfferReceived => "Offer Received",
        }
    }

    /// Display order used by dashboards and status pickers.
    pub const fn ordered() -> [JobStatus; 4] {
        [
            JobStatus::Applied,
            JobStatus::InterviewScheduled,
            JobStatus::Rejected,
            JobStatus::OfferReceived,
        ]
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status '{0}' (expected Applied, Interview Scheduled, Rejected, or Offer Received)")]
pub struct UnknownStatus(pub String);

impl FromStr for JobStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "applied" => Ok(JobStatus::Applied),
            "interviewscheduled" | "interview" => Ok(JobStatus::InterviewScheduled),
            "rejected" => Ok(JobStatus::Rejected),
            "offerreceived" | "offer" => Ok(JobStatus::OfferReceived),
            _ => Err(UnknownStatus(raw.to_string())),
        }
    }
}

/// Interview slot attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    #[serde(alias = "_id")]
    pub id: String,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: InterviewKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewKind {
    Phone,
    Video,
    #[serde(rename = "In-Person")]
    InPerson,
}

/// One tracked job application as returned by the job store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(alias = "_id")]
    pub id: JobId,
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub application_date: Option<String>,
    pub status: JobStatus,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub interviews: Vec<Interview>,
}

impl JobRecord {
    /// Instant the application was sent, if the stored date parses.
    pub fn applied_at(&self) -> Option<NaiveDateTime> {
        self.application_date.as_deref().and_then(parse_instant)
    }

    /// `YYYY-MM` bucket of the application date, taken from the stored text so timestamps
    /// with an offset stay in the month they were written in.
    pub fn application_month(&self) -> Option<String> {
        let raw = self.application_date.as_deref()?.trim();
        parse_instant(raw)?;
        raw.get(..7).map(str::to_string)
    }

    pub fn to_draft(&self) -> JobDraft {
        JobDraft {
            job_title: self.job_title.clone(),
            company: self.company.clone(),
            application_date: self.application_date.clone().unwrap_or_default(),
            status: self.status,
            job_link: self.job_link.clone(),
            notes: self.notes.clone(),
            interviews: self.interviews.clone(),
        }
    }
}

/// Application fields as entered by the user, before the store assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub job_title: String,
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub application_date: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub job_link: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub interviews: Vec<Interview>,
}

impl JobDraft {
    pub fn new(
        job_title: impl Into<String>,
        company: impl Into<String>,
        application_date: NaiveDate,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            company: company.into(),
            application_date: application_date.format("%Y-%m-%d").to_string(),
            status: JobStatus::Applied,
            job_link: None,
            notes: String::new(),
            interviews: Vec::new(),
        }
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if self.job_title.trim().is_empty() {
            errors.push(FieldError::MissingJobTitle);
        }
        if self.company.trim().is_empty() {
            errors.push(FieldError::MissingCompany);
        }

        if self.application_date.trim().is_empty() {
            errors.push(FieldError::MissingApplicationDate);
        } else if parse_instant(&self.application_date).is_none() {
            errors.push(FieldError::InvalidApplicationDate);
        }

        if let Some(link) = self.job_link.as_deref() {
            if !link.trim().is_empty() && Url::parse(link.trim()).is_err() {
                errors.push(FieldError::InvalidJobLink);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    pub fn into_record(self, id: JobId, last_updated: DateTime<Utc>) -> JobRecord {
        JobRecord {
            id,
            job_title: self.job_title,
            company: self.company,
            application_date: Some(self.application_date),
            status: self.status,
            job_link: self.job_link.filter(|link| !link.trim().is_empty()),
            notes: self.notes,
            last_updated: Some(last_updated),
            interviews: self.interviews,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Job title is required")]
    MissingJobTitle,
    #[error("Company name is required")]
    MissingCompany,
    #[error("Application date is required")]
    MissingApplicationDate,
    #[error("Application date must be a valid date")]
    InvalidApplicationDate,
    #[error("Please enter a valid URL")]
    InvalidJobLink,
}

impl FieldError {
    /// Wire name of the offending field.
    pub const fn field(self) -> &'static str {
        match self {
            FieldError::MissingJobTitle => "jobTitle",
            FieldError::MissingCompany => "company",
            FieldError::MissingApplicationDate | FieldError::InvalidApplicationDate => {
                "applicationDate"
            }
            FieldError::InvalidJobLink => "jobLink",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid job application: {}", describe(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn contains(&self, error: FieldError) -> bool {
        self.0.contains(&error)
    }

    pub fn field_map(&self) -> BTreeMap<&'static str, String> {
        self.0
            .iter()
            .map(|error| (error.field(), error.to_string()))
            .collect()
    }
}

fn describe(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parses a stored application date into the instant it denotes.
///
/// Date-only values (`YYYY-MM-DD`) resolve to midnight; RFC 3339 timestamps are normalized to
/// UTC. Anything else yields `None`.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|link| !link.trim().is_empty()))
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|raw| {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }))
}
