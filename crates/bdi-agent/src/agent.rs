//! The `Agent` aggregate and its store.
//!
//! Chosen deliberately as array-of-structs: each `Agent` owns its beliefs,
//! desires, intentions, and counters directly (§3 "The agent exclusively
//! owns its beliefs, desires, intentions, and counters") rather than the
//! struct-of-arrays/type-erased component map style used for the much
//! larger, mostly-sleeping populations this engine's ancestor simulated —
//! every agent here runs its full deliberation cycle every tick, so there
//! is no sparse-access pattern to optimize for.

use std::collections::{HashMap, HashSet};

use bdi_core::{AgentId, AgentRng, IntentionId, Tick};

use crate::belief::BeliefStore;
use crate::desire::{Desire, DesireGenerator, DesireStatus};
use crate::emotion::Emotion;
use crate::intention::{Intention, IntentionStatus};
use crate::personality::Personality;

pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub avatar: Option<String>,
    pub personality: Personality,
    pub emotion: Emotion,
    pub social_battery: f32,
    pub beliefs: BeliefStore,
    pub desires: Vec<Desire>,
    pub intentions: Vec<Intention>,
    pub desire_generator: DesireGenerator,
    pub rng: AgentRng,

    /// §4.5 step 4: turns taken with each partner this conversation.
    pub conversation_turn_counts: HashMap<AgentId, u32>,
    /// §4.5 step 4 / §4.7 atomic_force_quit handoff.
    force_quit_partners: HashSet<AgentId>,
    /// §4.5 step 8: partners who have already been sent a wrap-up farewell.
    pub wrap_up_issued: HashSet<AgentId>,
    /// §4.5 step 2 (Idle Guard): consecutive ticks with no ACTIVE intention.
    pub idle_ticks: u32,
    /// Allocator for intention ids minted outside the normal Intention
    /// Selection step (§4.5 step 8's wrap-up farewell intention).
    next_intention_seq: u64,
}

impl Agent {
    pub fn new(id: AgentId, name: impl Into<String>, personality: Personality, rng_seed: u64) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: None,
            personality,
            emotion: Emotion::default(),
            social_battery: 1.0,
            beliefs: BeliefStore::new(),
            desires: Vec::new(),
            intentions: Vec::new(),
            desire_generator: DesireGenerator::new(),
            rng: AgentRng::new(rng_seed, id),
            conversation_turn_counts: HashMap::new(),
            force_quit_partners: HashSet::new(),
            wrap_up_issued: HashSet::new(),
            idle_ticks: 0,
            next_intention_seq: 0,
        }
    }

    /// Mint a fresh intention id. Used both by the normal Intention
    /// Selection step and by synthetic intentions created mid-cycle (the
    /// wrap-up farewell plan, §4.5 step 8).
    pub fn next_intention_id(&mut self) -> IntentionId {
        self.next_intention_seq += 1;
        IntentionId(self.next_intention_seq)
    }

    pub fn active_intention_index(&self) -> Option<usize> {
        self.intentions
            .iter()
            .position(|i| i.status == IntentionStatus::Active)
    }

    pub fn has_active_intention(&self) -> bool {
        self.active_intention_index().is_some()
    }

    pub fn bound_desire_ids(&self) -> Vec<bdi_core::DesireId> {
        self.intentions
            .iter()
            .filter(|i| !i.status.is_terminal())
            .map(|i| i.desire_id)
            .collect()
    }

    pub fn desire_mut(&mut self, id: bdi_core::DesireId) -> Option<&mut Desire> {
        self.desires.iter_mut().find(|d| d.id == id)
    }

    pub fn intention_mut(&mut self, id: IntentionId) -> Option<&mut Intention> {
        self.intentions.iter_mut().find(|i| i.id == id)
    }

    /// Flag `partner` for force-quit. Idempotent.
    pub fn flag_force_quit(&mut self, partner: AgentId) {
        self.force_quit_partners.insert(partner);
    }

    pub fn is_force_quit_flagged(&self, partner: AgentId) -> bool {
        self.force_quit_partners.contains(&partner)
    }

    /// `consume_force_quit_partners()` (§4.5): returns and clears the set
    /// in one atomic operation.
    pub fn consume_force_quit_partners(&mut self) -> Vec<AgentId> {
        self.force_quit_partners.drain().collect()
    }

    pub fn drain_battery(&mut self, amount: f32) {
        self.social_battery = (self.social_battery - amount).clamp(0.0, 1.0);
    }

    pub fn restore_battery(&mut self, amount: f32) {
        self.social_battery = (self.social_battery + amount).clamp(0.0, 1.0);
    }

    /// §4.5 cleanup pre-phase, run once per tick before anything else.
    /// `terminal_desire_max_age_ticks` is the 30 s threshold converted to
    /// ticks by the caller, which knows `base_tick_seconds`/`time_speed`.
    pub fn cleanup(&mut self, now: Tick, terminal_desire_max_age_ticks: u64) {
        self.desires.retain(|d| !d.is_expired(now));

        let active_intention_desire_ids: HashSet<_> = self
            .intentions
            .iter()
            .filter(|i| !i.status.is_terminal())
            .map(|i| i.desire_id)
            .collect();
        for desire in self.desires.iter_mut() {
            if desire.status == DesireStatus::Pursued
                && !active_intention_desire_ids.contains(&desire.id)
            {
                desire.status = DesireStatus::Achieved;
            }
        }

        self.desires.retain(|d| {
            if !d.status.is_terminal() {
                return true;
            }
            now.since(d.created_at) < terminal_desire_max_age_ticks
        });

        let mut seen_descriptions = HashSet::new();
        self.desires.retain(|d| seen_descriptions.insert(d.description.clone()));

        if self.desires.len() > DesireGenerator::MAX_DESIRES {
            let (mut incoming, mut others): (Vec<Desire>, Vec<Desire>) = std::mem::take(&mut self.desires)
                .into_iter()
                .partition(|d| d.source == "incoming_message" && d.status == DesireStatus::Active);
            others.sort_by(|a, b| b.utility().partial_cmp(&a.utility()).unwrap_or(std::cmp::Ordering::Equal));
            others.truncate(6);
            incoming.append(&mut others);
            self.desires = incoming;
        }

        self.intentions.retain(|i| !i.status.is_terminal());
    }

    /// §4.5 step 2 (Idle Guard). Returns the ids of intentions killed as
    /// zombies this call. `threshold` is `WorldConfig::idle_guard_threshold`
    /// (default 2), passed in rather than hard-coded so tests can shrink it.
    pub fn idle_guard(&mut self, threshold: u32) -> Vec<IntentionId> {
        if self.has_active_intention() {
            self.idle_ticks = 0;
            return Vec::new();
        }
        self.idle_ticks += 1;
        if self.idle_ticks < threshold {
            return Vec::new();
        }
        let mut killed = Vec::new();
        for intention in self.intentions.iter_mut() {
            if matches!(intention.status, IntentionStatus::Active | IntentionStatus::Suspended)
                && intention.all_steps_executed()
            {
                intention.abandon("idle guard: zombie intention");
                killed.push(intention.id);
            }
        }
        killed
    }
}

/// Fluent builder for populating an [`AgentStore`] (a plain `Vec<Agent>`)
/// without hand-managing sequential ids.
pub struct AgentStoreBuilder {
    rng_seed: u64,
    next_id: u32,
    agents: Vec<Agent>,
}

impl AgentStoreBuilder {
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            next_id: 0,
            agents: Vec::new(),
        }
    }

    pub fn agent(mut self, name: impl Into<String>) -> Self {
        self.push(name, Personality::default())
    }

    pub fn agent_with_personality(mut self, name: impl Into<String>, personality: Personality) -> Self {
        self.push(name, personality)
    }

    fn push(mut self, name: impl Into<String>, personality: Personality) -> Self {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        self.agents.push(Agent::new(id, name, personality, self.rng_seed));
        self
    }

    pub fn build(self) -> Vec<Agent> {
        self.agents
    }
}
