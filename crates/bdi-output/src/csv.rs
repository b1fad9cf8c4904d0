//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `agent_metrics.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentMetricsRow, OutputResult, TickSummaryRow};

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    metrics: Writer<File>,
    summaries: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut metrics = Writer::from_path(dir.join("agent_metrics.csv"))?;
        metrics.write_record([
            "agent_id",
            "tick",
            "active_intentions",
            "desire_count",
            "social_battery",
            "happiness",
            "loneliness",
            "in_conversation",
        ])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "unix_time_secs",
            "agents_run",
            "actions_dispatched",
            "force_quits",
        ])?;

        Ok(Self {
            metrics,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_metrics(&mut self, rows: &[AgentMetricsRow]) -> OutputResult<()> {
        for row in rows {
            self.metrics.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.active_intentions.to_string(),
                row.desire_count.to_string(),
                row.social_battery.to_string(),
                row.happiness.to_string(),
                row.loneliness.to_string(),
                (row.in_conversation as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.agents_run.to_string(),
            row.actions_dispatched.to_string(),
            row.force_quits.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.metrics.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
