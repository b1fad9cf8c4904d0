//! `WorldOutputObserver<W>` — bridges `bdi_world::WorldObserver` to an
//! `OutputWriter`.

use bdi_agent::agent::Agent;
use bdi_agent::intention::IntentionStatus;
use bdi_core::{AgentId, Tick, WorldConfig};
use bdi_world::{TickDiagnostics, WorldObserver};

use crate::row::{AgentMetricsRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`WorldObserver`] that writes per-agent metrics and tick summaries to
/// any [`OutputWriter`] backend (CSV, SQLite, Parquet, …).
///
/// Errors from the writer are stored internally because `WorldObserver`
/// methods have no return value. After the run loop returns, check for
/// errors with [`take_error`][Self::take_error].
pub struct WorldOutputObserver<W: OutputWriter> {
    writer: W,
    start_unix_secs: i64,
    base_tick_seconds: f64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> WorldOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &WorldConfig) -> Self {
        Self {
            writer,
            start_unix_secs: config.start_unix_secs,
            base_tick_seconds: config.base_tick_seconds,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run loop returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, tick: Tick) -> i64 {
        self.start_unix_secs + (tick.0 as f64 * self.base_tick_seconds) as i64
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> WorldObserver for WorldOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, diagnostics: &TickDiagnostics) {
        let row = TickSummaryRow {
            tick: tick.0,
            unix_time_secs: self.unix_time(tick),
            agents_run: diagnostics.agents_run as u64,
            actions_dispatched: diagnostics.actions_dispatched as u64,
            force_quits: diagnostics.force_quits as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &[Agent]) {
        let rows: Vec<AgentMetricsRow> = agents
            .iter()
            .map(|agent| AgentMetricsRow {
                agent_id: agent.id.0,
                tick: tick.0,
                active_intentions: agent
                    .intentions
                    .iter()
                    .filter(|i| i.status == IntentionStatus::Active)
                    .count() as u32,
                desire_count: agent.desires.len() as u32,
                social_battery: agent.social_battery,
                happiness: agent.emotion.happiness,
                loneliness: agent.emotion.loneliness,
                in_conversation: agent.has_active_intention(),
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_metrics(&rows);
            self.store_err(result);
        }
    }

    fn on_force_quit(&mut self, _agent: AgentId, _partner: AgentId) {}

    fn on_run_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
