//! The dashboard surface: KPI cards, ranked tables and file exports
//!
//! Rendering is plain stdout — cards and tables are the CLI's equivalent of
//! the metric row and dataframe widgets of a dashboard page. Exports cover
//! the working event table (CSV and a Parquet snapshot), the per-activity
//! aggregates and the flattened stay table.

pub mod charts;

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::error::Result;
use crate::kpi::{ActivityShare, KpiOverview, StayOverview};
use crate::models::StayRecord;

/// Print the four headline KPI cards
pub fn print_kpi_cards(overview: &KpiOverview) {
    println!();
    println!("  min/visit (mean)        {:>8.2}", overview.avg_minutes_per_visit);
    println!(
        "  after-hours min/visit   {:>8.2}",
        overview.avg_after_hours_minutes_per_visit
    );
    println!(
        "  visits with AI note     {:>7.2}%",
        overview.ai_note_share_percent
    );
    println!(
        "  AI correction min (mean){:>8.2}",
        overview.ai_correction_avg_minutes
    );
    println!();
}

/// Print the time-share-by-activity table
pub fn print_activity_table(shares: &[ActivityShare]) {
    println!("  {:<16} {:>12} {:>9}", "activity", "minutes", "percent");
    for share in shares {
        println!(
            "  {:<16} {:>12.1} {:>8.1}%",
            share.activity, share.minutes, share.percent
        );
    }
    println!();
}

/// Print the per-clinician workload table, busiest first
pub fn print_workload_table(workload: &[(String, f64)]) {
    println!("  {:<16} {:>14}", "clinician", "total minutes");
    for (clinician, minutes) in workload {
        println!("  {clinician:<16} {minutes:>14.1}");
    }
    println!();
}

/// Print the outlier-visit table
pub fn print_outlier_table(outliers: &[(String, f64)]) {
    if outliers.is_empty() {
        println!("  no outlier visits");
        println!();
        return;
    }
    println!("  {:<16} {:>14}", "visit", "total minutes");
    for (visit, minutes) in outliers {
        println!("  {visit:<16} {minutes:>14.1}");
    }
    println!();
}

/// Print the admissions headline figures
pub fn print_stay_overview(overview: &StayOverview) {
    println!();
    println!("  unique patients   {:>8}", overview.unique_patients);
    println!("  total stays       {:>8}", overview.total_stays);
    println!("  mean stay (days)  {:>8.1}", overview.mean_length_days);
    println!();
}

/// Write the working event table as CSV
///
/// Timestamps are written in a format the CSV loader parses back, so an
/// exported table re-ingests without loss.
pub fn write_events_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path)?;
    let mut writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .with_timestamp_format("%Y-%m-%dT%H:%M:%S".to_string())
        .build(file);
    writer.write(batch)?;
    log::info!("Wrote {} rows to {}", batch.num_rows(), path.display());
    Ok(())
}

/// Write a Parquet snapshot of a record batch
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    log::info!("Wrote Parquet snapshot to {}", path.display());
    Ok(())
}

/// Write the per-activity aggregates as CSV
pub fn write_activity_shares_csv(shares: &[ActivityShare], path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    writeln!(file, "activity,minutes,percent")?;
    for share in shares {
        writeln!(
            file,
            "{},{},{}",
            csv_field(&share.activity),
            share.minutes,
            share.percent
        )?;
    }
    log::info!("Wrote activity aggregates to {}", path.display());
    Ok(())
}

/// Write the flattened stay table as CSV
pub fn write_stays_csv(stays: &[StayRecord], path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path)?;
    writeln!(
        file,
        "patient_name,diagnosis,department,admission_date,discharge_date,length_days"
    )?;
    for stay in stays {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            csv_field(&stay.patient_name),
            csv_field(stay.diagnosis.as_deref().unwrap_or("")),
            csv_field(&stay.department),
            stay
                .admission_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            stay
                .discharge_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            stay.length_days.map(|d| d.to_string()).unwrap_or_default()
        )?;
    }
    log::info!("Wrote {} stays to {}", stays.len(), path.display());
    Ok(())
}

/// Count stays per length of stay, for the distribution chart
#[must_use]
pub fn length_distribution(stays: &[StayRecord]) -> Vec<(String, f64)> {
    let mut counts: rustc_hash::FxHashMap<i64, usize> = rustc_hash::FxHashMap::default();
    for stay in stays {
        if let Some(days) = stay.length_days {
            *counts.entry(days).or_insert(0) += 1;
        }
    }
    let mut distribution: Vec<(i64, usize)> = counts.into_iter().collect();
    distribution.sort_by_key(|(days, _)| *days);
    distribution
        .into_iter()
        .map(|(days, count)| (format!("{days}d"), count as f64))
        .collect()
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
