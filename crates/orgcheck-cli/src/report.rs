//! Rendering of analysis results.
//!
//! Text reports list one finding per line, OE first, then KU, then FS,
//! followed by a summary line. JSON reports carry the same data as
//! `{ "summary": ..., "findings": [...] }`.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tracing::info;

use orgcheck_core::{AnalysisSummary, Finding, Stores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub summary: AnalysisSummary,
    pub findings: Vec<Finding<'a>>,
}

impl<'a> Report<'a> {
    pub fn new(stores: &'a Stores, summary: AnalysisSummary) -> Self {
        Self {
            summary,
            findings: stores.findings().collect(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Text => render_text(self),
            ReportFormat::Json => serde_json::to_string_pretty(self)?,
        })
    }

    /// Emit every finding as an `info` event.
    pub fn log_findings(&self) {
        for finding in &self.findings {
            info!(
                id = finding.id,
                name = finding.name,
                kind = %finding.error.kind,
                message = finding.error.message.as_str(),
                "{} with errors",
                finding.entity
            );
        }
    }
}

pub fn finding_line(finding: &Finding<'_>) -> String {
    format!(
        "{} {} ({}): [{}] {}",
        finding.entity, finding.id, finding.name, finding.error.kind, finding.error.message
    )
}

pub fn summary_line(summary: &AnalysisSummary) -> String {
    let cyclic = summary.ku.cyclic + summary.fs.cyclic + summary.oe.cyclic;
    format!(
        "checked {} KU, {} FS, {} OE: {} record(s) with errors, {} on cycles",
        summary.ku.records,
        summary.fs.records,
        summary.oe.records,
        summary.records_with_errors(),
        cyclic
    )
}

fn render_text(report: &Report<'_>) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        out.push_str(&finding_line(finding));
        out.push('\n');
    }
    out.push_str(&summary_line(&report.summary));
    out
}
