//! Output formatting utilities
//!
//! Provides table and JSON output formatting for CLI commands.

use crate::cli::args::OutputFormat;
use crate::domain::{BreachReason, Dimension, HealthState};
use crate::notify::DispatchReport;
use crate::selfstate::{DimensionStatus, Evaluation, MonitorAction};
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn format_timestamp(ts: Option<i64>) -> String {
    match ts {
        Some(ts) => Utc
            .timestamp_opt(ts, 0)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| ts.to_string()),
        None => "never".to_string(),
    }
}

/// One-shot evaluation result
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub state: HealthState,
    pub health_flag: Option<HealthState>,
    pub reasons: Vec<BreachReason>,
    pub dimensions: Vec<DimensionStatus>,
    /// Present if an alert was dispatched
    pub notified: Option<DispatchReport>,
}

impl From<&Evaluation> for CheckReport {
    fn from(eval: &Evaluation) -> Self {
        let notified = match &eval.action {
            MonitorAction::AlertSent(report) | MonitorAction::RecoverySent(report) => {
                Some(report.clone())
            }
            _ => None,
        };
        Self {
            state: eval.state,
            health_flag: eval.observed_flag,
            reasons: eval.reasons.clone(),
            dimensions: eval.dimensions.clone(),
            notified,
        }
    }
}

impl TableDisplay for CheckReport {
    fn to_table(&self) -> String {
        let mut output = format!("Pipeline: {}\n", self.state);
        output.push_str(&format!(
            "Health flag: {}\n",
            self.health_flag
                .map(|f| f.as_str().to_string())
                .unwrap_or_else(|| "unavailable".to_string())
        ));

        output.push_str("\nDimensions:\n");
        for dim in &self.dimensions {
            let marker = if dim.elapsed_secs > dim.limit_secs {
                "✗"
            } else {
                "✓"
            };
            output.push_str(&format!(
                "  {} {:<13} {}s since activity (limit {}s), last: {}\n",
                marker,
                dim.dimension.to_string(),
                dim.elapsed_secs,
                dim.limit_secs,
                format_timestamp(dim.last_activity)
            ));
        }

        if !self.reasons.is_empty() {
            output.push_str("\nReasons:\n");
            for reason in &self.reasons {
                output.push_str(&format!("  - {}\n", reason));
            }
        }

        if let Some(report) = &self.notified {
            output.push_str(&format!(
                "\nNotified {} contact(s), {} failed\n",
                report.delivered, report.failed
            ));
        }

        output
    }

    fn to_compact(&self) -> String {
        if self.reasons.is_empty() {
            return self.state.to_string();
        }
        let labels: Vec<&str> = self.reasons.iter().map(|r| r.label()).collect();
        format!("{}: {}", self.state, labels.join(", "))
    }
}

/// Last activity for one dimension
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub dimension: Dimension,
    pub last_activity: Option<i64>,
}

/// Raw contents of the shared store
#[derive(Debug, Clone, Serialize)]
pub struct StoreStatus {
    pub health_state: HealthState,
    pub matched_count: i64,
    pub activity: Vec<ActivityEntry>,
}

impl TableDisplay for StoreStatus {
    fn to_table(&self) -> String {
        let mut output = format!("Health flag: {}\n", self.health_state.as_str());
        output.push_str(&format!("Matched metrics: {}\n", self.matched_count));
        for entry in &self.activity {
            output.push_str(&format!(
                "  {:<13} {}\n",
                entry.dimension.to_string(),
                format_timestamp(entry.last_activity)
            ));
        }
        output
    }

    fn to_compact(&self) -> String {
        format!(
            "{} matched={}",
            self.health_state.as_str(),
            self.matched_count
        )
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}
