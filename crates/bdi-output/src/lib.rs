//! `bdi-output` — simulation output writers for the social simulation engine.
//!
//! Three backends are provided behind Cargo features:
//!
//! | Feature   | Backend | Files created                                       |
//! |-----------|---------|------------------------------------------------------|
//! | *(none)*  | CSV     | `agent_metrics.csv`, `tick_summaries.csv`            |
//! | `sqlite`  | SQLite  | `output.db`                                          |
//! | `parquet` | Parquet | `agent_metrics.parquet`, `tick_summaries.parquet`    |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`WorldOutputObserver`], which implements `bdi_world::WorldObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bdi_output::{CsvWriter, WorldOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output")).unwrap();
//! let mut obs = WorldOutputObserver::new(writer, &config);
//! for _ in 0..total_ticks {
//!     obs.on_tick_start(world.current_tick());
//!     let diagnostics = world.process_game_tick();
//!     obs.on_tick_end(world.current_tick(), &diagnostics);
//!     obs.on_snapshot(world.current_tick(), &world.agents);
//! }
//! obs.on_run_end(world.current_tick());
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::WorldOutputObserver;
pub use row::{AgentMetricsRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use parquet::ParquetWriter;
