use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::domain::{parse_instant, JobRecord, JobStatus, UnknownStatus};

/// Status constraint of a [`FilterSpec`]; `All` disables status filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(JobStatus),
}

impl StatusFilter {
    pub fn admits(self, status: JobStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => f.write_str(status.label()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        raw.parse().map(StatusFilter::Only)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    ApplicationDate,
    Company,
    JobTitle,
    Status,
}

impl SortKey {
    pub const fn label(self) -> &'static str {
        match self {
            SortKey::ApplicationDate => "Date",
            SortKey::Company => "Company",
            SortKey::JobTitle => "Title",
            SortKey::Status => "Status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key '{0}' (expected applicationDate, company, jobTitle, or status)")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "applicationdate" | "date" => Ok(SortKey::ApplicationDate),
            "company" => Ok(SortKey::Company),
            "jobtitle" | "title" => Ok(SortKey::JobTitle),
            "status" => Ok(SortKey::Status),
            _ => Err(UnknownSortKey(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort direction '{0}' (expected asc or desc)")]
pub struct UnknownSortDirection(pub String);

impl FromStr for SortDirection {
    type Err = UnknownSortDirection;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(UnknownSortDirection(raw.to_string())),
        }
    }
}

/// Inclusive calendar window; only takes effect when both bounds are filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.start.trim().is_empty() && !self.end.trim().is_empty()
    }

    fn window(&self) -> Option<DateWindow> {
        if !self.is_complete() {
            return None;
        }

        let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
        Some(DateWindow {
            start: parse_instant(&self.start),
            end: parse_instant(&self.end).map(|end| end.date().and_time(end_of_day)),
        })
    }
}

/// Parsed bounds. A bound that failed to parse never excludes anything, and neither does a
/// record without a parseable date.
struct DateWindow {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl DateWindow {
    fn admits(&self, instant: Option<NaiveDateTime>) -> bool {
        let Some(at) = instant else {
            return true;
        };
        let before_start = self.start.is_some_and(|start| at < start);
        let after_end = self.end.is_some_and(|end| at > end);
        !before_start && !after_end
    }
}

/// Status, search, date-range, and ordering criteria chosen for the dashboard list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

impl FilterSpec {
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = StatusFilter::Only(status);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_date_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_by = key;
        self.sort_direction = direction;
        self
    }

    /// Picking the active key while it sorts descending flips it to ascending; any other pick
    /// sorts by that key, descending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort_direction =
            if self.sort_by == key && self.sort_direction == SortDirection::Desc {
                SortDirection::Asc
            } else {
                SortDirection::Desc
            };
        self.sort_by = key;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when any narrowing criterion is set. Ordering alone does not count.
    pub fn is_active(&self) -> bool {
        self.status != StatusFilter::All
            || !self.search_term.is_empty()
            || self.date_range.is_some()
    }

    pub fn matches(&self, job: &JobRecord) -> bool {
        let window = self.date_range.as_ref().and_then(DateRange::window);
        self.matches_with(job, &self.search_term.to_lowercase(), window.as_ref())
    }

    fn matches_with(&self, job: &JobRecord, needle: &str, window: Option<&DateWindow>) -> bool {
        if !self.status.admits(job.status) {
            return false;
        }

        if !needle.is_empty() {
            let found = job.job_title.to_lowercase().contains(needle)
                || job.company.to_lowercase().contains(needle)
                || job.notes.to_lowercase().contains(needle);
            if !found {
                return false;
            }
        }

        window.map_or(true, |window| window.admits(job.applied_at()))
    }

    /// Ordering of two records under this spec's key and direction.
    pub fn compare(&self, a: &JobRecord, b: &JobRecord) -> Ordering {
        let ordering = match self.sort_by {
            SortKey::ApplicationDate => a.applied_at().cmp(&b.applied_at()),
            SortKey::Company => collate(&a.company, &b.company),
            SortKey::JobTitle => collate(&a.job_title, &b.job_title),
            SortKey::Status => a.status.label().cmp(b.status.label()),
        };

        match self.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Applies `spec` to `jobs`, returning the matching records in display order.
///
/// The sort is stable, so records with equal keys keep their input order in both directions.
/// Records whose application date is missing or unparsable are never removed by the date
/// range and sort ahead of every dated record when ascending.
pub fn filter_jobs(jobs: &[JobRecord], spec: &FilterSpec) -> Vec<JobRecord> {
    let needle = spec.search_term.to_lowercase();
    let window = spec.date_range.as_ref().and_then(DateRange::window);

    let mut matched: Vec<JobRecord> = jobs
        .iter()
        .filter(|job| spec.matches_with(job, &needle, window.as_ref()))
        .cloned()
        .collect();

    matched.sort_by(|a, b| spec.compare(a, b));
    matched
}

/// Locale-style string ordering.
///
/// Base letters compare case-insensitively with accents stripped, so `ábc` sits between
/// `Abb` and `abd`. Ties break on accents (unaccented first), then on case (lowercase first).
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| {
            a.nfd()
                .zip(b.nfd())
                .map(|(left, right)| case_rank(left).cmp(&case_rank(right)))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

fn case_rank(c: char) -> u8 {
    u8::from(c.is_uppercase())
}
