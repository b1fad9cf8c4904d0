//! `bdi-world` — the tick loop orchestrator for the social simulation (§4.7).
//!
//! # Per-tick sequence
//!
//! ```text
//! process_game_tick:
//!   ① Drain      — pull every agent's Hub queue once into this tick's
//!                  message cache (sent-this-tick messages are visible
//!                  starting next tick, never this one).
//!   ② Deliberate — for each agent: assemble perceptions, run the
//!                  Deliberation Cycle, harvest PendingActions.
//!   ②b Force-quit — consume any flags raised during deliberation and end
//!                  those conversations atomically before dispatch.
//!   ③ Dispatch   — execute every harvested PendingAction against the Hub,
//!                  belief stores, relationships, and emotions.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use bdi_agent::agent::AgentStoreBuilder;
//! use bdi_core::WorldConfig;
//! use bdi_world::{NoopObserver, WorldBuilder, WorldObserver};
//!
//! let agents = AgentStoreBuilder::new(42).agent("Ada").agent("Grace").build();
//! let mut world = WorldBuilder::new(WorldConfig::default(), agents).build();
//! let mut observer = NoopObserver;
//! for _ in 0..100 {
//!     observer.on_tick_start(world.current_tick());
//!     let diagnostics = world.process_game_tick();
//!     observer.on_tick_end(world.current_tick(), &diagnostics);
//! }
//! ```

pub mod builder;
pub mod deliberation;
pub mod dispatch;
pub mod emotion_engine;
pub mod error;
pub mod event;
pub mod observer;
pub mod perception;
pub mod world;


pub use builder::WorldBuilder;
pub use deliberation::{CycleDiagnostics, CycleOutput, PendingAction};
pub use error::{WorldError, WorldResult};
pub use event::{EventKind, EventLog, WorldEvent};
pub use observer::{NoopObserver, WorldObserver};
pub use world::{TickDiagnostics, World};
