//! CSV/JSON report sink
//!
//! Per scenario, writes:
//! - `<id>_cashflow_report.csv`: one dated row per projection month
//! - `<id>_summary.json`: metrics, health score and narrative
//!
//! Both files are rewritten on every store, so the last recompute wins.

use crate::error::Result;
use crate::metrics::Metrics;
use crate::pipeline::{RecalculationReport, ReportSink};
use crate::projection::{ProjectionSummary, ReportRow};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Scenario-level part of a stored report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSummary {
    pub scenario_id: String,
    pub scenario_name: String,
    pub base_date: NaiveDate,
    pub metrics: Metrics,
    pub summary: ProjectionSummary,
    pub health_score: u8,
    pub strategic_analysis: String,
    pub months_calculated: usize,
}

impl From<&RecalculationReport> for StoredSummary {
    fn from(report: &RecalculationReport) -> Self {
        Self {
            scenario_id: report.scenario_id.clone(),
            scenario_name: report.scenario_name.clone(),
            base_date: report.base_date,
            metrics: report.metrics,
            summary: report.summary,
            health_score: report.health_score,
            strategic_analysis: report.strategic_analysis.clone(),
            months_calculated: report.months_calculated,
        }
    }
}

/// Writes reports into a directory
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    out_dir: PathBuf,
}

impl CsvReportSink {
    /// Create the sink, creating `out_dir` if needed
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Result<Self> {
        let out_dir = out_dir.as_ref().to_path_buf();
        fs::create_dir_all(&out_dir)?;
        Ok(Self { out_dir })
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn rows_path(&self, scenario_id: &str) -> PathBuf {
        self.out_dir.join(format!("{}_cashflow_report.csv", scenario_id))
    }

    pub fn summary_path(&self, scenario_id: &str) -> PathBuf {
        self.out_dir.join(format!("{}_summary.json", scenario_id))
    }

    /// Read back the monthly rows stored for a scenario
    pub fn load_rows(&self, scenario_id: &str) -> Result<Vec<ReportRow>> {
        let mut reader = csv::Reader::from_path(self.rows_path(scenario_id))?;
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// Read back the summary stored for a scenario
    pub fn load_summary(&self, scenario_id: &str) -> Result<StoredSummary> {
        let file = File::open(self.summary_path(scenario_id))?;
        Ok(serde_json::from_reader(file)?)
    }
}

impl ReportSink for CsvReportSink {
    fn store(&self, report: &RecalculationReport) -> Result<()> {
        let rows_path = self.rows_path(&report.scenario_id);
        let mut writer = csv::Writer::from_path(&rows_path)?;
        for row in &report.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        let summary_path = self.summary_path(&report.scenario_id);
        let file = File::create(&summary_path)?;
        serde_json::to_writer_pretty(file, &StoredSummary::from(report))?;

        debug!(
            "stored {} rows to {} and summary to {}",
            report.rows.len(),
            rows_path.display(),
            summary_path.display()
        );
        Ok(())
    }
}
