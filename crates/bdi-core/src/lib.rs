//! `bdi-core` — foundational types shared by every other `bdi-*` crate.
//!
//! This crate is a dependency of every other `bdi-*` crate. It intentionally
//! has no `bdi-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|------------------------------------------------------------|
//! | [`ids`]   | `AgentId`, `BeliefId`, `DesireId`, `IntentionId`, `MessageId`, `ConversationId` |
//! | [`time`]  | `Tick`, `SimClock`, `WorldConfig`                         |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global)                 |
//! | [`error`] | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|-------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.   |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, BeliefId, ConversationId, DesireId, IntentionId, MessageId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick, WorldConfig};
