//! Parquet output backend (feature `parquet`).
//!
//! Creates two files in the configured output directory:
//! - `agent_metrics.parquet`
//! - `tick_summaries.parquet`

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{BooleanBuilder, Float32Builder, Int64Builder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{AgentMetricsRow, OutputResult, TickSummaryRow};

fn metrics_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("agent_id", DataType::UInt32, false),
        Field::new("tick", DataType::UInt64, false),
        Field::new("active_intentions", DataType::UInt32, false),
        Field::new("desire_count", DataType::UInt32, false),
        Field::new("social_battery", DataType::Float32, false),
        Field::new("happiness", DataType::Float32, false),
        Field::new("loneliness", DataType::Float32, false),
        Field::new("in_conversation", DataType::Boolean, false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tick", DataType::UInt64, false),
        Field::new("unix_time_secs", DataType::Int64, false),
        Field::new("agents_run", DataType::UInt64, false),
        Field::new("actions_dispatched", DataType::UInt64, false),
        Field::new("force_quits", DataType::UInt64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes simulation output to two Parquet files.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetWriter {
    metrics: Option<ArrowWriter<File>>,
    summaries: Option<ArrowWriter<File>>,
    metrics_schema: Arc<Schema>,
    summ_schema: Arc<Schema>,
}

impl ParquetWriter {
    /// Create both Parquet files in `dir`.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let metrics_schema = metrics_schema();
        let summ_schema = summary_schema();

        let metrics_file = File::create(dir.join("agent_metrics.parquet"))?;
        let metrics = ArrowWriter::try_new(metrics_file, Arc::clone(&metrics_schema), Some(snappy_props()))?;

        let summ_file = File::create(dir.join("tick_summaries.parquet"))?;
        let summaries = ArrowWriter::try_new(summ_file, Arc::clone(&summ_schema), Some(snappy_props()))?;

        Ok(Self {
            metrics: Some(metrics),
            summaries: Some(summaries),
            metrics_schema,
            summ_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_metrics(&mut self, rows: &[AgentMetricsRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.metrics.as_mut() else {
            return Ok(());
        };

        let mut agent_ids = UInt32Builder::new();
        let mut ticks = UInt64Builder::new();
        let mut active_intentions = UInt32Builder::new();
        let mut desire_counts = UInt32Builder::new();
        let mut social_batteries = Float32Builder::new();
        let mut happinesses = Float32Builder::new();
        let mut lonelinesses = Float32Builder::new();
        let mut in_conversations = BooleanBuilder::new();

        for row in rows {
            agent_ids.append_value(row.agent_id);
            ticks.append_value(row.tick);
            active_intentions.append_value(row.active_intentions);
            desire_counts.append_value(row.desire_count);
            social_batteries.append_value(row.social_battery);
            happinesses.append_value(row.happiness);
            lonelinesses.append_value(row.loneliness);
            in_conversations.append_value(row.in_conversation);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&self.metrics_schema),
            vec![
                Arc::new(agent_ids.finish()),
                Arc::new(ticks.finish()),
                Arc::new(active_intentions.finish()),
                Arc::new(desire_counts.finish()),
                Arc::new(social_batteries.finish()),
                Arc::new(happinesses.finish()),
                Arc::new(lonelinesses.finish()),
                Arc::new(in_conversations.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks = UInt64Builder::new();
        let mut unix_times = Int64Builder::new();
        let mut agents_run = UInt64Builder::new();
        let mut actions_dispatched = UInt64Builder::new();
        let mut force_quits = UInt64Builder::new();

        ticks.append_value(row.tick);
        unix_times.append_value(row.unix_time_secs);
        agents_run.append_value(row.agents_run);
        actions_dispatched.append_value(row.actions_dispatched);
        force_quits.append_value(row.force_quits);

        let batch = RecordBatch::try_new(
            Arc::clone(&self.summ_schema),
            vec![
                Arc::new(ticks.finish()),
                Arc::new(unix_times.finish()),
                Arc::new(agents_run.finish()),
                Arc::new(actions_dispatched.finish()),
                Arc::new(force_quits.finish()),
            ],
        )?;
        writer.write(&batch)?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if let Some(w) = self.metrics.take() {
            w.close()?;
        }
        if let Some(w) = self.summaries.take() {
            w.close()?;
        }
        Ok(())
    }
}
