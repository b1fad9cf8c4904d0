//! Fluent builder for constructing a [`World`].

use bdi_agent::advisor::LlmAdvisor;
use bdi_agent::agent::Agent;
use bdi_core::WorldConfig;

use crate::World;

/// Fluent builder for [`World`].
///
/// # Required inputs
///
/// - [`WorldConfig`] — pacing, seed, and the per-world thresholds (§5/§6)
/// - `agents: Vec<Agent>` — from [`bdi_agent::agent::AgentStoreBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                                   |
/// |---------------|--------------------------------------------|
/// | `.advisor(a)` | `None` — every deliberation falls back deterministically |
///
/// # Example
///
/// ```rust,ignore
/// use bdi_agent::agent::AgentStoreBuilder;
/// use bdi_core::WorldConfig;
/// use bdi_world::WorldBuilder;
///
/// let agents = AgentStoreBuilder::new(42).agent("Ada").agent("Grace").build();
/// let mut world = WorldBuilder::new(WorldConfig::default(), agents).build();
/// ```
pub struct WorldBuilder {
    config: WorldConfig,
    agents: Vec<Agent>,
    advisor: Option<Box<dyn LlmAdvisor>>,
}

impl WorldBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: WorldConfig, agents: Vec<Agent>) -> Self {
        Self {
            config,
            agents,
            advisor: None,
        }
    }

    /// Supply the capability advisor consulted by desire generation, the
    /// planner, and conversation-turn analysis. If not called, every
    /// LLM-backed call site falls back to its deterministic rule (§6).
    pub fn advisor(mut self, advisor: Box<dyn LlmAdvisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    /// Register every agent with a fresh [`bdi_comm::CommunicationHub`] and
    /// return the ready-to-run [`World`].
    pub fn build(self) -> World {
        World::new(self.config, self.agents, self.advisor)
    }
}
