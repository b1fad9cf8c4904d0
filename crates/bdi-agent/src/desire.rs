//! Desire Generator — produces the agent's prioritized goals (§4.2).
//!
//! The most intricate component in the engine: five generation stages run
//! in a fixed order every tick, each gated by cooldown/satiety/deep-work
//! state this struct owns on the agent's behalf.

use std::collections::{HashMap, VecDeque};

use bdi_core::{AgentId, DesireId, Tick};

use crate::belief::{BeliefStore, BeliefType, BeliefValue};
use crate::emotion::Emotion;
use crate::personality::Personality;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DesireStatus {
    Active,
    Pursued,
    Achieved,
    Abandoned,
    Impossible,
}

impl DesireStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DesireStatus::Achieved | DesireStatus::Abandoned | DesireStatus::Impossible
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotivationType {
    Survival,
    Safety,
    Social,
    Esteem,
    Achievement,
    Curiosity,
    WorldEvent,
}

/// A single respond-class message, as relayed into the reactive stage of
/// desire generation. Kept minimal and local to this crate rather than
/// reusing `bdi_comm::MessageType`, since `bdi-comm` sits above `bdi-agent`
/// in the dependency order; `bdi-world` maps between the two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReactiveMessageKind {
    Greeting,
    Question,
    Answer,
    Statement,
    Farewell,
    Ack,
}

/// One perception relevant to reactive desire generation (§4.2 step 1).
/// Perceptions that carry no reactive consequence (pure observation/world
/// updates) are not represented here — they only touch the belief store.
pub enum ReactivePerception {
    WorldEvent {
        event_id: u64,
    },
    /// A message from the reserved `user` identifier.
    UserMessage,
    AgentMessage {
        sender: AgentId,
        kind: ReactiveMessageKind,
    },
}

/// Candidate goal. See §3 for the full field contract.
#[derive(Clone, Debug)]
pub struct Desire {
    pub id: DesireId,
    pub description: String,
    pub priority: f32,
    pub urgency: f32,
    pub status: DesireStatus,
    pub motivation_type: MotivationType,
    pub source: String,
    pub personality_alignment: f32,
    pub created_at: Tick,
    pub deadline: Option<Tick>,
    pub context: HashMap<String, BeliefValue>,
}

impl Desire {
    /// `priority × urgency × personality_alignment` — tie-breaker inside a
    /// tier only, never across tiers (§3).
    pub fn utility(&self) -> f32 {
        self.priority * self.urgency * self.personality_alignment
    }

    /// The strict priority class assigned by source (§4.2, §8 "Priority
    /// dominance"). Higher sorts first.
    pub fn tier(&self) -> u8 {
        match self.source.as_str() {
            "world_event" | "user_message" => 5,
            "incoming_message" | "deep_work_reject" => 4,
            "llm_dynamic" if self.motivation_type == MotivationType::Social => 3,
            "llm_dynamic" | "llm_fallback" => 2,
            "idle_drive" => 1,
            _ => 2,
        }
    }

    pub fn context_bool(&self, key: &str) -> bool {
        matches!(self.context.get(key), Some(BeliefValue::Bool(true)))
    }

    pub fn context_agent(&self, key: &str) -> Option<AgentId> {
        match self.context.get(key) {
            Some(BeliefValue::Number(n)) => Some(AgentId(*n as u32)),
            _ => None,
        }
    }

    pub fn is_expired(&self, now: Tick) -> bool {
        matches!(self.deadline, Some(d) if now > d)
    }
}

fn ctx(pairs: impl IntoIterator<Item = (&'static str, BeliefValue)>) -> HashMap<String, BeliefValue> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Per-agent cooldown/satiety/deep-work state, owned by the Desire
/// Generator (§4.2 "Per-agent state owned here").
pub struct DesireGenerator {
    conversation_ended_at: HashMap<AgentId, f64>,
    last_conversation_ended_at: f64,
    recent_conv_timestamps: VecDeque<f64>,
    ticks_since_conversation_ended: u64,
    solo_actions_after_conversation: u32,
    llm_last_called_at: f64,
    deep_work_active: bool,
    deep_work_reason: String,
    next_desire_seq: u64,
}

impl DesireGenerator {
    pub const BASE_PARTNER_COOLDOWN_SECS: f64 = 120.0;
    pub const BASE_GLOBAL_COOLDOWN_SECS: f64 = 90.0;
    pub const RECENT_CONVERSATION_WINDOW_SECS: f64 = 300.0;
    pub const MIN_REST_TICKS: u64 = 8;
    pub const MIN_SOLO_ACTIONS: u32 = 4;
    pub const LLM_ADVISORY_COOLDOWN_SECS: f64 = 60.0;
    pub const MAX_DESIRES: usize = 12;
    pub const INTROVERT_MULTIPLIER: f64 = 2.0;

    pub fn new() -> Self {
        Self {
            conversation_ended_at: HashMap::new(),
            last_conversation_ended_at: f64::NEG_INFINITY,
            recent_conv_timestamps: VecDeque::new(),
            ticks_since_conversation_ended: Self::MIN_REST_TICKS + 1,
            solo_actions_after_conversation: Self::MIN_SOLO_ACTIONS + 1,
            llm_last_called_at: f64::NEG_INFINITY,
            deep_work_active: false,
            deep_work_reason: String::new(),
            next_desire_seq: 0,
        }
    }

    pub fn is_deep_work_active(&self) -> bool {
        self.deep_work_active
    }

    pub fn deep_work_reason(&self) -> &str {
        &self.deep_work_reason
    }

    fn next_id(&mut self) -> DesireId {
        self.next_desire_seq += 1;
        DesireId(self.next_desire_seq)
    }

    /// Public id allocator for synthetic desires minted outside the
    /// generation pipeline (e.g. the wrap-up farewell desire built by the
    /// Deliberation Cycle's conversation-turn analysis step, §4.5 step 8).
    pub fn next_desire_id(&mut self) -> DesireId {
        self.next_id()
    }

    fn prune_recent_window(&mut self, now_unix: f64) {
        while let Some(&front) = self.recent_conv_timestamps.front() {
            if now_unix - front > Self::RECENT_CONVERSATION_WINDOW_SECS {
                self.recent_conv_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn recent_conversations_count(&mut self, now_unix: f64) -> usize {
        self.prune_recent_window(now_unix);
        self.recent_conv_timestamps.len()
    }

    fn introvert_multiplier(personality: &Personality) -> f64 {
        if personality.is_introvert() {
            Self::INTROVERT_MULTIPLIER
        } else {
            1.0
        }
    }

    pub fn per_partner_cooldown(&mut self, now_unix: f64, personality: &Personality) -> f64 {
        let recent = self.recent_conversations_count(now_unix) as f64;
        Self::BASE_PARTNER_COOLDOWN_SECS * Self::introvert_multiplier(personality) * (1.0 + recent)
    }

    pub fn global_cooldown(&mut self, now_unix: f64, personality: &Personality) -> f64 {
        let recent = self.recent_conversations_count(now_unix) as f64;
        Self::BASE_GLOBAL_COOLDOWN_SECS * Self::introvert_multiplier(personality) * (1.0 + recent)
    }

    pub fn is_partner_on_cooldown(
        &mut self,
        partner: AgentId,
        now_unix: f64,
        personality: &Personality,
    ) -> bool {
        let cooldown = self.per_partner_cooldown(now_unix, personality);
        match self.conversation_ended_at.get(&partner) {
            Some(&ended_at) => now_unix - ended_at < cooldown,
            None => false,
        }
    }

    /// All three must pass for the block to lift: wall-clock, tick count,
    /// solo-action count (§4.2).
    pub fn is_globally_blocked(&mut self, now_unix: f64, personality: &Personality) -> bool {
        let cooldown = self.global_cooldown(now_unix, personality);
        let wall_ok = now_unix - self.last_conversation_ended_at > cooldown;
        let ticks_ok = self.ticks_since_conversation_ended > Self::MIN_REST_TICKS;
        let solo_ok = self.solo_actions_after_conversation > Self::MIN_SOLO_ACTIONS;
        !(wall_ok && ticks_ok && solo_ok)
    }

    /// §4.2 entry point: called by the Deliberation Cycle / Tick Loop after
    /// `END_CONVERSATION` resolves.
    pub fn mark_conversation_ended(&mut self, partner: AgentId, now_unix: f64, _personality: &Personality) {
        self.conversation_ended_at.insert(partner, now_unix);
        self.last_conversation_ended_at = now_unix;
        self.ticks_since_conversation_ended = 0;
        self.solo_actions_after_conversation = 0;
        self.recent_conv_timestamps.push_back(now_unix);
        self.prune_recent_window(now_unix);
    }

    /// §4.2 entry point: called after every solo action dispatch.
    pub fn mark_solo_action(&mut self, action_type: &str) {
        const SOCIAL_ACTIONS: &[&str] = &[
            "initiate_conversation",
            "send_message",
            "respond_to_message",
            "wait_for_response",
            "end_conversation",
        ];
        if !SOCIAL_ACTIONS.contains(&action_type) {
            self.solo_actions_after_conversation = self.solo_actions_after_conversation.saturating_add(1);
        }
    }

    fn evaluate_deep_work(&mut self, social_battery: f32, personality: &Personality) {
        let triggers = social_battery < 0.25 || (personality.conscientiousness > 0.75 && social_battery < 0.5);
        if triggers {
            self.deep_work_reason = if social_battery < 0.25 {
                "social battery critical".to_string()
            } else {
                "conscientious focus".to_string()
            };
            self.deep_work_active = true;
        } else if self.deep_work_active && social_battery >= 0.5 {
            self.deep_work_active = false;
            self.deep_work_reason.clear();
        }
    }

    /// `find_available_agent` (§4.2): any known agent (excluding self) not
    /// believed to be in conversation; else the first known candidate.
    /// Deterministic: candidates are ordered by subject string.
    pub fn find_available_agent(&self, beliefs: &BeliefStore, self_id: AgentId) -> Option<AgentId> {
        let mut known: Vec<AgentId> = beliefs
            .get_by_type(BeliefType::Agent)
            .into_iter()
            .filter_map(|b| {
                b.subject
                    .strip_prefix("agent_")
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(AgentId)
            })
            .filter(|&id| id != self_id)
            .collect();
        known.sort_unstable();
        known.dedup();

        let free = known.iter().find(|&&id| {
            !beliefs
                .get(BeliefType::Agent, &crate::belief::agent_subject(id), "in_conversation")
                .and_then(|b| b.value.as_bool())
                .unwrap_or(false)
        });
        free.copied().or_else(|| known.first().copied())
    }

    /// Is this a good moment to invoke the advisor for personality desires
    /// (§4.2 step 3 gate)?
    pub fn advisor_cooldown_elapsed(&self, now_unix: f64) -> bool {
        now_unix - self.llm_last_called_at >= Self::LLM_ADVISORY_COOLDOWN_SECS
    }

    fn mark_advisor_called(&mut self, now_unix: f64) {
        self.llm_last_called_at = now_unix;
    }

    /// Run the full five-stage generation pipeline for one tick and return
    /// the new desires to append to the agent's list. `existing` is the
    /// agent's current desire list (read-only; callers append the result).
    #[allow(clippy::too_many_arguments)]
    pub fn generate(
        &mut self,
        self_id: AgentId,
        personality: &Personality,
        _emotions: &Emotion,
        social_battery: f32,
        beliefs: &BeliefStore,
        existing: &[Desire],
        active_partners: &[AgentId],
        reactive: &[ReactivePerception],
        now_tick: Tick,
        now_unix: f64,
        in_conversation_with_user: bool,
        name: &str,
        advisor: Option<&dyn crate::advisor::LlmAdvisor>,
        recent_perception_summaries: &[String],
    ) -> Vec<Desire> {
        let mut out: Vec<Desire> = Vec::new();

        // Deep-work evaluation runs before reactive perceptions so a
        // deep_work_reject desire this tick reflects this tick's battery,
        // not the flag left over from the previous generation call.
        self.evaluate_deep_work(social_battery, personality);

        // 1. Reactive desires from perceptions.
        for perception in reactive {
            match *perception {
                ReactivePerception::WorldEvent { event_id } => {
                    let already_seen = existing.iter().chain(out.iter()).any(|d| {
                        matches!(d.context.get("event_id"), Some(BeliefValue::Number(n)) if *n as u64 == event_id)
                            && matches!(d.status, DesireStatus::Active | DesireStatus::Pursued | DesireStatus::Achieved)
                    });
                    if !already_seen {
                        out.push(Desire {
                            id: self.next_id(),
                            description: format!("react to world event {event_id}"),
                            priority: 1.0,
                            urgency: 1.0,
                            status: DesireStatus::Active,
                            motivation_type: MotivationType::WorldEvent,
                            source: "world_event".to_string(),
                            personality_alignment: 1.0,
                            created_at: now_tick,
                            deadline: None,
                            context: ctx([
                                ("event_id", BeliefValue::Number(event_id as f64)),
                                ("interrupt_social", BeliefValue::Bool(true)),
                            ]),
                        });
                    }
                }
                ReactivePerception::UserMessage => {
                    out.push(Desire {
                        id: self.next_id(),
                        description: "respond to user".to_string(),
                        priority: 1.0,
                        urgency: 1.0,
                        status: DesireStatus::Active,
                        motivation_type: MotivationType::Social,
                        source: "user_message".to_string(),
                        personality_alignment: 1.0,
                        created_at: now_tick,
                        deadline: None,
                        context: ctx([
                            ("bypass_battery", BeliefValue::Bool(true)),
                            ("is_user_message", BeliefValue::Bool(true)),
                            ("target", BeliefValue::Number(AgentId::USER.0 as f64)),
                        ]),
                    });
                }
                ReactivePerception::AgentMessage { sender, kind } => {
                    if matches!(kind, ReactiveMessageKind::Farewell | ReactiveMessageKind::Ack) {
                        continue;
                    }
                    if self.is_partner_on_cooldown(sender, now_unix, personality) {
                        continue;
                    }
                    if !active_partners.contains(&sender) {
                        continue;
                    }
                    let initiator_pursued = existing.iter().any(|d| {
                        d.source != "incoming_message"
                            && d.status == DesireStatus::Pursued
                            && d.context_agent("target") == Some(sender)
                    });
                    if initiator_pursued {
                        continue;
                    }
                    let duplicate_respond = existing.iter().chain(out.iter()).any(|d| {
                        d.source == "incoming_message"
                            && matches!(d.status, DesireStatus::Active | DesireStatus::Pursued)
                            && d.context_agent("target") == Some(sender)
                    });
                    if duplicate_respond {
                        continue;
                    }
                    if self.deep_work_active {
                        out.push(Desire {
                            id: self.next_id(),
                            description: format!("send busy signal to agent_{}", sender.0),
                            priority: 0.6,
                            urgency: 0.5,
                            status: DesireStatus::Active,
                            motivation_type: MotivationType::Social,
                            source: "deep_work_reject".to_string(),
                            personality_alignment: 0.5,
                            created_at: now_tick,
                            deadline: None,
                            context: ctx([("target", BeliefValue::Number(sender.0 as f64))]),
                        });
                        continue;
                    }
                    if in_conversation_with_user {
                        continue;
                    }
                    out.push(Desire {
                        id: self.next_id(),
                        description: format!("respond to agent_{}", sender.0),
                        priority: 0.90,
                        urgency: 0.80,
                        status: DesireStatus::Active,
                        motivation_type: MotivationType::Social,
                        source: "incoming_message".to_string(),
                        personality_alignment: 0.8,
                        created_at: now_tick,
                        deadline: None,
                        context: ctx([("target", BeliefValue::Number(sender.0 as f64))]),
                    });
                }
            }
        }

        // 2. Tick counter.
        self.ticks_since_conversation_ended += 1;

        // 3. LLM-advised personality desires (rate-limited). The advisor call
        // itself happens at the call site (needs async/blocking I/O); this
        // generator only decides whether the gate is open and filters the
        // result handed back to it.
        let has_blocking_desire = existing.iter().any(|d| {
            matches!(d.status, DesireStatus::Active | DesireStatus::Pursued)
                && d.motivation_type != MotivationType::Social
                && d.motivation_type != MotivationType::WorldEvent
        });
        let gate_open = self.advisor_cooldown_elapsed(now_unix)
            && !has_blocking_desire
            && !in_conversation_with_user
            && !self.deep_work_active;

        if gate_open {
            if let Some(advisor) = advisor {
                self.mark_advisor_called(now_unix);
                let seeds = advisor
                    .generate_dynamic_desires(
                        name,
                        self_id,
                        personality,
                        _emotions,
                        social_battery,
                        recent_perception_summaries,
                    )
                    .ok();
                match seeds {
                    Some(seeds) => {
                        for seed in seeds.into_iter().take(3) {
                            let is_social = seed.motivation_type == MotivationType::Social;
                            if is_social && self.is_globally_blocked(now_unix, personality) {
                                continue;
                            }
                            let mut motivation_type = seed.motivation_type;
                            if is_social && social_battery < 0.2 {
                                motivation_type = MotivationType::Safety;
                            }
                            let mut context = seed.context;
                            if is_social {
                                let partner = context
                                    .get("target")
                                    .and_then(|v| match v {
                                        BeliefValue::Number(n) => Some(AgentId(*n as u32)),
                                        _ => None,
                                    })
                                    .or_else(|| self.find_available_agent(beliefs, self_id));
                                let Some(partner) = partner else { continue };
                                if self.is_partner_on_cooldown(partner, now_unix, personality) {
                                    continue;
                                }
                                context.insert("target".to_string(), BeliefValue::Number(partner.0 as f64));
                            }
                            let duplicate = existing.iter().chain(out.iter()).any(|d| {
                                d.description.to_lowercase() == seed.description.to_lowercase()
                            });
                            if duplicate {
                                continue;
                            }
                            let tier_priority = if is_social { 0.65 } else { 0.40 };
                            out.push(Desire {
                                id: self.next_id(),
                                description: seed.description,
                                priority: tier_priority,
                                urgency: seed.urgency.clamp(0.0, 1.0),
                                status: DesireStatus::Active,
                                motivation_type,
                                source: "llm_dynamic".to_string(),
                                personality_alignment: 0.9,
                                created_at: now_tick,
                                deadline: None,
                                context,
                            });
                        }
                    }
                    None => {
                        let fallback = self.fallback_think(now_tick);
                        out.push(fallback);
                    }
                }
            }
        }

        // 5. Idle drive (Tier 1).
        let has_active_non_social = existing
            .iter()
            .chain(out.iter())
            .any(|d| {
                matches!(d.status, DesireStatus::Active | DesireStatus::Pursued)
                    && d.motivation_type != MotivationType::Social
                    && d.motivation_type != MotivationType::WorldEvent
            });
        if !has_active_non_social {
            let description = if personality.openness > 0.7 {
                "pursue a curiosity about the surroundings"
            } else if personality.conscientiousness > 0.7 {
                "tidy and organize"
            } else {
                "wander nearby"
            };
            let duplicate = existing
                .iter()
                .chain(out.iter())
                .any(|d| d.description == description);
            if !duplicate {
                out.push(Desire {
                    id: self.next_id(),
                    description: description.to_string(),
                    priority: 0.10,
                    urgency: 0.10,
                    status: DesireStatus::Active,
                    motivation_type: MotivationType::Curiosity,
                    source: "idle_drive".to_string(),
                    personality_alignment: 0.5,
                    created_at: now_tick,
                    deadline: None,
                    context: ctx([("is_idle", BeliefValue::Bool(true))]),
                });
            }
        }

        out
    }

    fn fallback_think(&mut self, now_tick: Tick) -> Desire {
        Desire {
            id: self.next_id(),
            description: "think things over".to_string(),
            priority: 0.40,
            urgency: 0.30,
            status: DesireStatus::Active,
            motivation_type: MotivationType::Curiosity,
            source: "llm_fallback".to_string(),
            personality_alignment: 0.5,
            created_at: now_tick,
            deadline: None,
            context: HashMap::new(),
        }
    }
}

impl Default for DesireGenerator {
    fn default() -> Self {
        Self::new()
    }
}
