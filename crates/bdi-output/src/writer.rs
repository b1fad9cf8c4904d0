//! The `OutputWriter` trait implemented by all backend writers.

use crate::{AgentMetricsRow, OutputResult, TickSummaryRow};

/// Trait implemented by CSV, SQLite, and Parquet writers.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with [`crate::observer::WorldOutputObserver::take_error`].
pub trait OutputWriter {
    /// Write a batch of per-agent metric rows.
    fn write_metrics(&mut self, rows: &[AgentMetricsRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
