//! World observer trait for progress reporting and data collection.

use bdi_agent::agent::Agent;
use bdi_core::{AgentId, Tick};

use crate::world::TickDiagnostics;

/// Callbacks invoked around [`crate::World::process_game_tick`].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl WorldObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, diagnostics: &TickDiagnostics) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {} actions dispatched", diagnostics.actions_dispatched);
///         }
///     }
/// }
/// ```
pub trait WorldObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with that tick's aggregated tallies.
    fn on_tick_end(&mut self, _tick: Tick, _diagnostics: &TickDiagnostics) {}

    /// Called once per forced conversation termination (§4.7 force-quit).
    fn on_force_quit(&mut self, _agent: AgentId, _partner: AgentId) {}

    /// Called at caller-chosen snapshot intervals with read-only access to
    /// every agent's current state, for output writers that record
    /// per-agent metrics without the `World` needing to know about any
    /// specific output format.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &[Agent]) {}

    /// Called once after the run loop stops, whether by `total_ticks`
    /// exhaustion or external cancellation.
    fn on_run_end(&mut self, _final_tick: Tick) {}
}

/// A [`WorldObserver`] that does nothing. Use when you need a caller site
/// but don't want progress callbacks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl WorldObserver for NoopObserver {}
