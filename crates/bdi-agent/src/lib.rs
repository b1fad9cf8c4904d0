//! Per-agent BDI state: beliefs, desires, intentions, plans, and the
//! personality/emotion vectors that condition them.
//!
//! | Module | Responsibility |
//! |---|---|
//! | `personality` | Immutable Big Five trait vector |
//! | `emotion` | Mutable 8-axis emotion vector |
//! | `belief` | Confidence-weighted knowledge base (§4.1) |
//! | `desire` | Desire Generator — prioritized goal production (§4.2) |
//! | `plan` | Planner — plan templates, dialogue plans, extension (§4.3) |
//! | `intention` | Intention Selector — binding, interrupt, resume (§4.4) |
//! | `advisor` | The LLM capability boundary consumed by `desire`/`plan` |
//! | `agent` | The `Agent` aggregate and its builder |
//! | `error` | `AgentError`/`AgentResult` |

pub mod advisor;
pub mod agent;
pub mod belief;
pub mod desire;
pub mod emotion;
pub mod error;
pub mod intention;
pub mod personality;
pub mod plan;

#[cfg(test)]
mod tests;

pub use advisor::{ConversationVerdict, DesireSeed, HistoryTurn, LlmAdvisor, PlanStepKind};
pub use agent::{Agent, AgentStoreBuilder};
pub use belief::{Belief, BeliefStore, BeliefType, BeliefValue, Perception, PerceptionField};
pub use desire::{
    Desire, DesireGenerator, DesireStatus, MotivationType, ReactiveMessageKind, ReactivePerception,
};
pub use emotion::{Emotion, EmotionAxis};
pub use error::{AgentError, AgentResult};
pub use intention::{Intention, IntentionSelector, IntentionStatus, SelectionResult};
pub use personality::Personality;
pub use plan::{ActionType, MessageKind, OnTimeout, Plan, PlanStep, Planner};

/// A `Vec<Agent>` with sequential ids assigned by [`AgentStoreBuilder`].
pub type AgentStore = Vec<Agent>;
