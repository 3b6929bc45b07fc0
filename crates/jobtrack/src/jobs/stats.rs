use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{JobRecord, JobStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: usize,
}

/// Aggregate counts over the full (unfiltered) job collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsSummary {
    pub total: usize,
    /// Statuses without any record are absent; read through [`StatisticsSummary::count`].
    pub status_counts: BTreeMap<JobStatus, usize>,
    /// Sorted ascending by `YYYY-MM`.
    pub monthly_applications: Vec<MonthlyCount>,
}

/// Share of the collection holding one status, for progress bars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: JobStatus,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

impl StatisticsSummary {
    pub fn count(&self, status: JobStatus) -> usize {
        self.status_counts.get(&status).copied().unwrap_or(0)
    }

    /// `100 * count / total`, or zero for an empty collection.
    pub fn progress_percentage(&self, status: JobStatus) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(status) as f64 / self.total as f64 * 100.0
    }

    pub fn status_breakdown(&self) -> Vec<StatusShare> {
        JobStatus::ordered()
            .into_iter()
            .map(|status| StatusShare {
                status,
                label: status.label(),
                count: self.count(status),
                percentage: self.progress_percentage(status),
            })
            .collect()
    }
}

/// Counts records per status and per application month.
///
/// A record whose application date is missing or unparsable still counts toward the total and
/// its status, but contributes to no month.
pub fn summarize(jobs: &[JobRecord]) -> StatisticsSummary {
    let mut status_counts = BTreeMap::new();
    let mut months: BTreeMap<String, usize> = BTreeMap::new();

    for job in jobs {
        *status_counts.entry(job.status).or_insert(0) += 1;
        if let Some(month) = job.application_month() {
            *months.entry(month).or_insert(0) += 1;
        }
    }

    StatisticsSummary {
        total: jobs.len(),
        status_counts,
        monthly_applications: months
            .into_iter()
            .map(|(month, count)| MonthlyCount { month, count })
            .collect(),
    }
}
