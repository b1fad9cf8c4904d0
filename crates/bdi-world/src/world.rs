//! The `World` struct and its tick loop (§4.7, §5).
//!
//! Single-threaded, cooperative: agents are visited in insertion order with
//! no preemption. The only suspension point is an LLM call, made (and
//! recovered from, via deterministic fallback) entirely inside
//! [`crate::deliberation::run_cycle`] and [`crate::dispatch::execute_action`].

use std::collections::{HashMap, VecDeque};

use bdi_agent::advisor::{HistoryTurn, LlmAdvisor};
use bdi_agent::agent::Agent;
use bdi_agent::belief::BeliefType;
use bdi_comm::CommunicationHub;
use bdi_core::{AgentId, IntentionId, Tick, WorldConfig};

use crate::dispatch::{self, DispatchContext};
use crate::deliberation::{self, CycleDiagnostics};
use crate::event::EventLog;
use crate::perception::{self, AgentSnapshot};

/// Tallies surfaced to callers/observers once per tick (§7).
#[derive(Clone, Copy, Debug, Default)]
pub struct TickDiagnostics {
    pub agents_run: usize,
    pub actions_dispatched: usize,
    pub force_quits: usize,
    pub cycle: CycleDiagnostics,
}

pub struct World {
    pub agents: Vec<Agent>,
    pub hub: CommunicationHub,
    pub config: WorldConfig,
    pub clock: bdi_core::SimClock,
    relationships: HashMap<(AgentId, AgentId), f32>,
    event_log: EventLog,
    wait_tick_counters: HashMap<IntentionId, u32>,
    processed_event_ids: HashMap<AgentId, VecDeque<u64>>,
    history: HashMap<(AgentId, AgentId), VecDeque<HistoryTurn>>,
    advisor: Option<Box<dyn LlmAdvisor>>,
}

impl World {
    pub fn new(config: WorldConfig, agents: Vec<Agent>, advisor: Option<Box<dyn LlmAdvisor>>) -> Self {
        let mut hub = CommunicationHub::new();
        for agent in &agents {
            hub.register_agent(agent.id);
        }
        let clock = config.make_clock();
        let event_log = EventLog::new(config.event_log_capacity);
        Self {
            agents,
            hub,
            clock,
            event_log,
            relationships: HashMap::new(),
            wait_tick_counters: HashMap::new(),
            processed_event_ids: HashMap::new(),
            history: HashMap::new(),
            advisor,
            config,
        }
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    // ── External interfaces (§6) ───────────────────────────────────────────

    /// `enqueue_external_message` (§6): hands an operator- or UI-supplied
    /// message to the Hub as if the reserved `user` agent had sent it.
    pub fn enqueue_external_message(
        &mut self,
        target: AgentId,
        content: impl Into<String>,
        message_type: bdi_comm::MessageType,
        topic: Option<String>,
    ) {
        let now_unix = self.clock.current_unix_secs() as f64;
        let conversation_id = self.hub.start_conversation(AgentId::USER, target, topic.clone().unwrap_or_default(), now_unix);
        let id = self.hub.next_message_id();
        let message = bdi_comm::Message::new(
            id,
            AgentId::USER,
            target,
            content,
            message_type,
            Some(conversation_id),
            None,
            topic,
            None,
            true,
            30.0,
            now_unix,
        );
        self.hub.send_message(message, now_unix);
    }

    /// `inject_event` (§6): appends a world/user event to the bounded log.
    /// Empty `audience` broadcasts to every registered agent.
    pub fn inject_event(&mut self, description: impl Into<String>, audience: Vec<AgentId>) -> u64 {
        self.event_log.push(description, audience, self.clock.current_tick)
    }

    /// `set_time_speed` (§6): re-paces the clock; clamped to `[0.1, 10.0]`.
    pub fn set_time_speed(&mut self, time_speed: f64) {
        self.clock.time_speed = time_speed.clamp(0.1, 10.0);
    }

    fn index_of(&self, id: AgentId) -> Option<usize> {
        self.agents.iter().position(|a| a.id == id)
    }

    /// `process_game_tick` (§4.7): the three-step sequence run once per
    /// tick. Does not sleep — pacing between calls is the runner's job via
    /// [`bdi_core::SimClock::tick_period`].
    pub fn process_game_tick(&mut self) -> TickDiagnostics {
        let now = self.clock.current_tick;
        let now_unix = self.clock.current_unix_secs() as f64;
        let mut diagnostics = TickDiagnostics::default();

        // ── 1. Drain every agent's Hub queue once, building this tick's
        //       message cache (§4.7, §5: visible only from tick T+1 on). ──
        let mut per_agent_messages: HashMap<AgentId, Vec<bdi_comm::Message>> = HashMap::new();
        for agent in &self.agents {
            let drained = self.hub.receive_messages(agent.id, now_unix);
            per_agent_messages.insert(agent.id, drained);
        }
        let tick_cache: Vec<bdi_comm::Message> = per_agent_messages.values().flatten().cloned().collect();

        let window_ticks = self.clock.ticks_for_secs(self.config.event_perception_window_secs);
        let terminal_desire_max_age_ticks = self.clock.ticks_for_secs(30.0);

        let all_ids: Vec<AgentId> = self.agents.iter().map(|a| a.id).collect();

        let snapshots: Vec<AgentSnapshot> = self
            .agents
            .iter()
            .map(|a| AgentSnapshot {
                id: a.id,
                name: a.name.clone(),
                location: a
                    .beliefs
                    .get(BeliefType::SelfBelief, "self", "location")
                    .and_then(|b| b.value.as_text().map(|s| s.to_string())),
                in_conversation: self.hub.is_agent_in_conversation(a.id),
            })
            .collect();

        // ── 2. Per-agent deliberation + dispatch ───────────────────────────
        // History is only mutated by dispatch (below), so one snapshot for
        // the whole deliberation pass is safe and avoids a per-agent clone.
        let history_snapshot = self.history.clone();
        let mut all_pending: Vec<(AgentId, Vec<deliberation::PendingAction>)> = Vec::with_capacity(all_ids.len());

        for &agent_id in &all_ids {
            let idx = self.index_of(agent_id).expect("agent present");
            let active_partners: Vec<AgentId> = all_ids.iter().copied().filter(|&id| id != agent_id).collect();
            let messages = per_agent_messages.remove(&agent_id).unwrap_or_default();

            let mut processed = self.processed_event_ids.remove(&agent_id).unwrap_or_default();
            let mut relationships = std::mem::take(&mut self.relationships);
            let neuroticism = self.agents[idx].personality.neuroticism;
            let processed_cap = self.config.processed_event_ids_capacity;

            let batch = perception::assemble_for_agent(
                agent_id,
                messages,
                &snapshots,
                &self.event_log,
                &mut processed,
                processed_cap,
                &mut self.agents[idx].emotion,
                neuroticism,
                &mut relationships,
                now,
                window_ticks,
            );
            self.processed_event_ids.insert(agent_id, processed);
            self.relationships = relationships;

            let history_for = |partner: AgentId| -> Vec<HistoryTurn> {
                history_snapshot
                    .get(&dispatch::conv_key(agent_id, partner))
                    .map(|d| d.iter().cloned().collect())
                    .unwrap_or_default()
            };

            let output = deliberation::run_cycle(
                &mut self.agents[idx],
                batch,
                &active_partners,
                now,
                now_unix,
                terminal_desire_max_age_ticks,
                self.config.idle_guard_threshold,
                self.config.hard_limit_turns,
                self.advisor.as_deref(),
                &history_for,
            );
            diagnostics.cycle.interrupted += output.diagnostics.interrupted;
            diagnostics.cycle.event_interrupted += output.diagnostics.event_interrupted;
            diagnostics.cycle.user_interrupted += output.diagnostics.user_interrupted;
            diagnostics.cycle.wrap_up_triggered += output.diagnostics.wrap_up_triggered;
            diagnostics.cycle.force_quit_count += output.diagnostics.force_quit_count;

            all_pending.push((agent_id, output.actions));
            diagnostics.agents_run += 1;
        }

        // ── 2b. Consume force-quit flags, then dispatch pending actions ────
        for &agent_id in &all_ids {
            let idx = self.index_of(agent_id).expect("agent present");
            let flagged = self.agents[idx].consume_force_quit_partners();
            for partner in flagged {
                if let Some(partner_idx) = self.index_of(partner) {
                    let (a, b) = agent_pair_mut(&mut self.agents, idx, partner_idx);
                    dispatch::atomic_force_quit(a, b, &mut self.hub, &mut self.wait_tick_counters, now_unix);
                    diagnostics.force_quits += 1;
                }
            }
        }

        for (agent_id, actions) in all_pending {
            let idx = self.index_of(agent_id).expect("agent present");
            for pending in actions {
                let target = pending.action.target();
                let other_idx = target.filter(|t| !t.is_user()).and_then(|t| self.index_of(t));

                diagnostics.actions_dispatched += 1;
                let mut ctx = DispatchContext {
                    hub: &mut self.hub,
                    relationships: &mut self.relationships,
                    wait_tick_counters: &mut self.wait_tick_counters,
                    history: &mut self.history,
                    advisor: self.advisor.as_deref(),
                    now,
                    now_unix,
                    tick_cache: &tick_cache,
                };

                match other_idx {
                    Some(other_idx) if other_idx != idx => {
                        let (a, b) = agent_pair_mut(&mut self.agents, idx, other_idx);
                        dispatch::execute_action(a, Some(b), pending.intention_id, pending.step_index, &pending.action, &mut ctx);
                    }
                    _ => {
                        dispatch::execute_action(&mut self.agents[idx], None, pending.intention_id, pending.step_index, &pending.action, &mut ctx);
                    }
                }
            }
        }

        diagnostics
    }
}

/// Two disjoint mutable borrows into the same slice, by index. `a != b`.
fn agent_pair_mut(agents: &mut [Agent], a: usize, b: usize) -> (&mut Agent, &mut Agent) {
    assert_ne!(a, b, "agent cannot be its own conversation partner");
    if a < b {
        let (left, right) = agents.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = agents.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
