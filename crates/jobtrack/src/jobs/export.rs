use std::io::Write;

use serde::Serialize;

use super::domain::JobRecord;

const HEADER: [&str; 8] = [
    "id",
    "job_title",
    "company",
    "application_date",
    "status",
    "job_link",
    "notes",
    "last_updated",
];

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    job_title: &'a str,
    company: &'a str,
    application_date: &'a str,
    status: &'static str,
    job_link: &'a str,
    notes: &'a str,
    last_updated: String,
}

impl<'a> From<&'a JobRecord> for CsvRow<'a> {
    fn from(job: &'a JobRecord) -> Self {
        Self {
            id: &job.id.0,
            job_title: &job.job_title,
            company: &job.company,
            application_date: job.application_date.as_deref().unwrap_or(""),
            status: job.status.label(),
            job_link: job.job_link.as_deref().unwrap_or(""),
            notes: &job.notes,
            last_updated: job
                .last_updated
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Writes `jobs` in the given order as CSV, header first.
pub fn write_csv<W: Write>(writer: W, jobs: &[JobRecord]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for job in jobs {
        csv_writer.serialize(CsvRow::from(job))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::domain::{JobId, JobStatus};

    #[test]
    fn empty_collection_still_writes_header() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[]).expect("export succeeds");
        let output = String::from_utf8(buffer).expect("utf8");
        assert_eq!(
            output.trim_end(),
            "id,job_title,company,application_date,status,job_link,notes,last_updated"
        );
    }

    #[test]
    fn rows_quote_embedded_commas_and_keep_order() {
        let jobs = vec![
            JobRecord {
                id: JobId::from("b"),
                job_title: "Analyst".to_string(),
                company: "Beta, Inc.".to_string(),
                application_date: Some("2024-02-05".to_string()),
                status: JobStatus::InterviewScheduled,
                job_link: None,
                notes: String::new(),
                last_updated: None,
                interviews: Vec::new(),
            },
            JobRecord {
                id: JobId::from("a"),
                job_title: "Engineer".to_string(),
                company: "Acme".to_string(),
                application_date: None,
                status: JobStatus::Applied,
                job_link: Some("https://acme.example".to_string()),
                notes: "called back".to_string(),
                last_updated: None,
                interviews: Vec::new(),
            },
        ];

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &jobs).expect("export succeeds");
        let output = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "b,Analyst,\"Beta, Inc.\",2024-02-05,Interview Scheduled,,,"
        );
        assert_eq!(
            lines[2],
            "a,Engineer,Acme,,Applied,https://acme.example,called back,"
        );
    }
}
