//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter. Ticks
//! are the canonical unit for every timeout in this engine (wait-for-response
//! limits, idle-guard thresholds, cooldown tick counts) — wall-clock seconds
//! only matter for the Hub's status labeling and for pacing the runner loop.
//! Using an integer tick means all schedule arithmetic is exact and
//! comparisons are O(1).

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds, and paces the
/// runner loop between ticks.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// Real seconds one tick represents at `time_speed = 1.0`. Default: 5.0.
    pub base_tick_seconds: f64,
    /// Pacing multiplier in `[0.1, 10.0]`. Higher runs faster wall-clock.
    pub time_speed: f64,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock starting at `start_unix_secs` with the given pacing.
    pub fn new(start_unix_secs: i64, base_tick_seconds: f64, time_speed: f64) -> Self {
        Self {
            start_unix_secs,
            base_tick_seconds,
            time_speed: time_speed.clamp(0.1, 10.0),
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Effective wall-clock period between ticks: `base_tick_seconds /
    /// time_speed`, floored at 0.1 s so an overrun never causes a catch-up
    /// burst (see `SPEC_FULL.md` §5).
    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64((self.base_tick_seconds / self.time_speed).max(0.1))
    }

    /// Elapsed simulated seconds since tick 0, at `time_speed = 1.0`.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        (self.current_tick.0 as f64 * self.base_tick_seconds) as i64
    }

    /// Current Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// Break elapsed time into (day, hour, minute) components from sim start.
    pub fn elapsed_dhm(&self) -> (u64, u32, u32) {
        let total_secs = self.elapsed_secs().max(0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        (days, hours, minutes)
    }

    /// How many ticks span `secs` seconds at the base rate? Rounds up.
    #[inline]
    pub fn ticks_for_secs(&self, secs: f64) -> u64 {
        (secs / self.base_tick_seconds).ceil() as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m) = self.elapsed_dhm();
        write!(f, "{} (day {} {:02}:{:02})", self.current_tick, d, h, m)
    }
}

// ── WorldConfig ───────────────────────────────────────────────────────────────

/// Top-level simulation configuration: pacing is `base_tick_seconds /
/// time_speed` rather than a fixed tick duration, so a run can be sped up
/// or slowed down without re-deriving every other timeout in tick units.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,
    /// Real seconds per tick at `time_speed = 1.0`. Default: 5.0.
    pub base_tick_seconds: f64,
    /// Pacing multiplier, clamped to `[0.1, 10.0]` on construction.
    pub time_speed: f64,
    /// Total ticks to run. `None` means run until the caller stops the loop.
    pub total_ticks: Option<u64>,
    /// Master RNG seed. The same seed always produces identical agent RNG
    /// streams (see [`crate::rng::AgentRng`]).
    pub seed: u64,
    /// Bound on the event log's ring buffer (§3: "bounded ring of at most
    /// 500 operator-injected events").
    pub event_log_capacity: usize,
    /// Event-log perception freshness window in seconds (§4.7: "younger
    /// than 10 s").
    pub event_perception_window_secs: f64,
    /// Bound on `processed_event_ids` per agent (§3).
    pub processed_event_ids_capacity: usize,
    /// Consecutive communication perceptions from one partner before the
    /// Hard Limit force-quit fires (§4.2/§4.5, default 10).
    pub hard_limit_turns: u32,
    /// Consecutive idle ticks before the Idle Guard kills zombie intentions
    /// (§4.5 step 2, default 2).
    pub idle_guard_threshold: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            start_unix_secs: 0,
            base_tick_seconds: 5.0,
            time_speed: 1.0,
            total_ticks: None,
            seed: 0,
            event_log_capacity: 500,
            event_perception_window_secs: 10.0,
            processed_event_ids_capacity: 200,
            hard_limit_turns: 10,
            idle_guard_threshold: 2,
        }
    }
}

impl WorldConfig {
    /// The tick at which the simulation ends (exclusive upper bound), if
    /// bounded.
    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        self.total_ticks.map(Tick)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.base_tick_seconds, self.time_speed)
    }
}
