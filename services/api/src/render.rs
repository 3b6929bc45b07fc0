use jobtrack::jobs::{JobRecord, JobStatus, StatisticsSummary};
use std::fmt::Write;

pub(crate) const NO_APPLICATIONS: &str = "You haven't added any job applications yet.";
pub(crate) const NO_MATCHES: &str = "No applications match your filter criteria.";

const BAR_WIDTH: usize = 20;

/// Text shown for the dashboard list: an empty-state message or a table.
pub(crate) fn job_list(view: &[JobRecord], total: usize) -> String {
    if total == 0 {
        return NO_APPLICATIONS.to_string();
    }
    if view.is_empty() {
        return NO_MATCHES.to_string();
    }

    let widths = [
        column_width("ID", view.iter().map(|job| job.id.0.as_str())),
        column_width("TITLE", view.iter().map(|job| job.job_title.as_str())),
        column_width("COMPANY", view.iter().map(|job| job.company.as_str())),
        12,
    ];

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  STATUS",
        "ID",
        "TITLE",
        "COMPANY",
        "APPLIED",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    );
    for job in view {
        let _ = writeln!(
            out,
            "{:<w0$}  {:<w1$}  {:<w2$}  {:<w3$}  {}",
            job.id.0,
            job.job_title,
            job.company,
            display_date(job),
            job.status,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        );
    }
    let _ = write!(out, "Showing {} of {} applications", view.len(), total);
    out
}

pub(crate) fn job_detail(job: &JobRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} at {}", job.job_title, job.company);
    let _ = writeln!(out, "  id:           {}", job.id);
    let _ = writeln!(out, "  status:       {}", job.status);
    let _ = writeln!(out, "  applied:      {}", display_date(job));
    if let Some(link) = &job.job_link {
        let _ = writeln!(out, "  link:         {link}");
    }
    if let Some(updated) = job.last_updated {
        let _ = writeln!(
            out,
            "  last updated: {}",
            updated.format("%b %-d, %Y %H:%M UTC")
        );
    }
    if !job.notes.is_empty() {
        let _ = writeln!(out, "  notes:        {}", job.notes);
    }
    if !job.interviews.is_empty() {
        let _ = writeln!(out, "  interviews:");
        for interview in &job.interviews {
            let _ = writeln!(
                out,
                "    - {} {} ({:?}){}",
                interview.date,
                interview.time,
                interview.kind,
                if interview.notes.is_empty() {
                    String::new()
                } else {
                    format!(": {}", interview.notes)
                }
            );
        }
    }
    out.trim_end().to_string()
}

pub(crate) fn statistics(summary: &StatisticsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total applications: {}", summary.total);
    let label_width = JobStatus::ordered()
        .iter()
        .map(|status| status.label().len())
        .max()
        .unwrap_or(0);

    for share in summary.status_breakdown() {
        let filled = ((share.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "  {:<label_width$}  {:>3}  [{}{}] {:>5.1}%",
            share.label,
            share.count,
            "#".repeat(filled),
            " ".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            share.percentage,
        );
    }

    if !summary.monthly_applications.is_empty() {
        let _ = writeln!(out, "Applications per month:");
        for bucket in &summary.monthly_applications {
            let _ = writeln!(out, "  {}  {}", bucket.month, bucket.count);
        }
    }
    out.trim_end().to_string()
}

fn display_date(job: &JobRecord) -> String {
    match (job.applied_at(), job.application_date.as_deref()) {
        (Some(instant), _) => instant.format("%b %-d, %Y").to_string(),
        (None, Some(raw)) if !raw.trim().is_empty() => raw.trim().to_string(),
        _ => "-".to_string(),
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|value| value.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack::jobs::{summarize, JobId};

    fn job(id: &str, company: &str, date: Option<&str>, status: JobStatus) -> JobRecord {
        JobRecord {
            id: JobId::from(id),
            job_title: "Engineer".to_string(),
            company: company.to_string(),
            application_date: date.map(str::to_string),
            status,
            job_link: None,
            notes: String::new(),
            last_updated: None,
            interviews: Vec::new(),
        }
    }

    #[test]
    fn empty_states_distinguish_no_data_from_no_matches() {
        assert_eq!(job_list(&[], 0), NO_APPLICATIONS);
        assert_eq!(job_list(&[], 3), NO_MATCHES);
    }

    #[test]
    fn table_lists_rows_and_footer() {
        let rows = vec![
            job("a1", "Acme", Some("2024-01-10"), JobStatus::Applied),
            job("b2", "Beta", Some("someday"), JobStatus::Rejected),
        ];

        let text = job_list(&rows, 5);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("Jan 10, 2024"));
        assert!(lines[2].contains("someday"));
        assert!(lines[2].ends_with("Rejected"));
        assert_eq!(lines[3], "Showing 2 of 5 applications");
    }

    #[test]
    fn statistics_show_every_status_and_month() {
        let summary = summarize(&[
            job("a1", "Acme", Some("2024-01-10"), JobStatus::Applied),
            job("b2", "Beta", Some("2024-02-05"), JobStatus::Rejected),
        ]);

        let text = statistics(&summary);

        assert!(text.starts_with("Total applications: 2"));
        assert!(text.contains("Offer Received"));
        assert!(text.contains(" 50.0%"));
        assert!(text.contains("2024-02  1"));
    }
}
