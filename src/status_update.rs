//! Proposed job-tracker transitions: preview output and CSV export.
//!
//! Nothing here mutates a remote tracker. Live mode is accepted but still
//! only previews.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::classifier::JobStatus;
use crate::date_utils::format_date;

pub const CSV_HEADER: [&str; 8] = [
    "Company", "Job Title", "Old Status", "New Status", "Reason", "Confidence", "Email ID", "Date",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub old_status: JobStatus,
    pub new_status: JobStatus,
    pub reason: String,
    pub confidence: f64,
    pub email_id: String,
}

impl StatusUpdate {
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// Current tracked status of an application
pub trait PriorStatusSource: Send + Sync {
    fn prior_status(&self, company_name: &str, job_title: Option<&str>) -> JobStatus;
}

/// Every application is assumed to be at APPLIED
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeApplied;

impl PriorStatusSource for AssumeApplied {
    fn prior_status(&self, _company_name: &str, _job_title: Option<&str>) -> JobStatus {
        JobStatus::Applied
    }
}

pub struct StatusUpdater {
    dry_run: bool,
}

impl StatusUpdater {
    pub fn new(dry_run: bool) -> Self {
        StatusUpdater { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Preview every update in order. Returns the number previewed.
    pub fn apply_all(&self, updates: &[StatusUpdate]) -> usize {
        info!("Processing {} status updates", updates.len());

        if !self.dry_run {
            warn!("⚠️  Live tracker updates are not supported - showing preview only");
        }

        for (index, update) in updates.iter().enumerate() {
            println!("📝 Update {}/{}", index + 1, updates.len());
            println!("   🏢 Company: {}", update.company_name);
            println!("   💼 Job title: {}", update.job_title.as_deref().unwrap_or("N/A"));
            println!("   🔄 Status: {} → {}", update.old_status, update.new_status);
            println!("   📋 Reason: {}", update.reason);
            println!("   🎯 Confidence: {}%", update.confidence_percent());
            println!("   📧 Email ID: {}", update.email_id);
            println!("{}", "-".repeat(60));

            info!(
                "Would update {}: {} → {} ({}%)",
                update.company_name, update.old_status, update.new_status, update.confidence_percent()
            );
        }

        updates.len()
    }

    pub fn summary(updates: &[StatusUpdate]) -> String {
        let mut by_status: BTreeMap<JobStatus, usize> = BTreeMap::new();
        let mut companies = BTreeSet::new();
        let mut total_confidence = 0.0;

        for update in updates {
            *by_status.entry(update.new_status).or_insert(0) += 1;
            companies.insert(update.company_name.as_str());
            total_confidence += update.confidence;
        }

        let avg_confidence = if updates.is_empty() {
            0.0
        } else {
            total_confidence / updates.len() as f64
        };

        let distribution = by_status
            .iter()
            .map(|(status, count)| format!("{}={}", status, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Status Update Summary:\n\
             - Total Updates: {}\n\
             - Average Confidence: {}%\n\
             - Status Distribution: {}\n\
             - Companies Updated: {}",
            updates.len(),
            (avg_confidence * 100.0).round() as u32,
            if distribution.is_empty() { "none".to_string() } else { distribution },
            companies.len(),
        )
    }
}

/// `job_updates_YYYY-MM-DD.csv`
pub fn default_export_filename(date: NaiveDate) -> String {
    format!("job_updates_{}.csv", format_date(date))
}

/// Write updates as CSV rows stamped with `export_date`
pub fn write_csv<W: Write>(updates: &[StatusUpdate], writer: W, export_date: NaiveDate) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let date = format_date(export_date);

    csv_writer.write_record(CSV_HEADER)
        .context("Unable to write CSV header")?;

    for update in updates {
        let confidence = format!("{}%", update.confidence_percent());
        csv_writer.write_record([
            update.company_name.as_str(),
            update.job_title.as_deref().unwrap_or("N/A"),
            update.old_status.as_str(),
            update.new_status.as_str(),
            update.reason.as_str(),
            confidence.as_str(),
            update.email_id.as_str(),
            date.as_str(),
        ]).with_context(|| format!("Unable to write CSV row for email {}", update.email_id))?;
    }

    csv_writer.flush().context("Unable to flush CSV output")?;
    Ok(())
}

/// Export updates to a CSV file dated today
pub fn export_csv(updates: &[StatusUpdate], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Unable to create CSV file {}", path.display()))?;

    write_csv(updates, file, Utc::now().date_naive())?;

    info!("💾 Exported {} updates to {}", updates.len(), path.display());
    Ok(())
}
