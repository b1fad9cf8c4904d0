//! The Deliberation Cycle (§4.5): the fixed eleven-step sequence run once per
//! agent per tick, between perception assembly and action dispatch.
//!
//! Steps 1–2 (cleanup, idle guard) and the belief/desire-generation plumbing
//! they wrap already live on [`Agent`]/[`DesireGenerator`] — this module is
//! the orchestrator that calls them in order and owns the steps that don't
//! belong to any single component (reactive interrupts, conversation-turn
//! analysis, intention selection, harvest).

use bdi_agent::agent::Agent;
use bdi_agent::belief::{BeliefType, BeliefValue};
use bdi_agent::desire::{Desire, DesireStatus, MotivationType};
use bdi_agent::advisor::{ConversationVerdict, HistoryTurn, LlmAdvisor};
use bdi_agent::intention::{Intention, IntentionSelector, IntentionStatus};
use bdi_agent::plan::{ActionType, Plan, PlanStep, Planner};
use bdi_core::{AgentId, IntentionId, Tick};
use tracing::{debug, warn};

use crate::perception::PerceptionBatch;

/// Counters surfaced by the World's diagnostics (§7): no user-visible
/// failure behavior beyond logs and these tallies.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleDiagnostics {
    pub interrupted: u32,
    pub event_interrupted: u32,
    pub user_interrupted: u32,
    pub wrap_up_triggered: u32,
    pub force_quit_count: u32,
}

/// One plan step ready for dispatch, harvested at the end of the cycle.
pub struct PendingAction {
    pub intention_id: IntentionId,
    pub step_index: usize,
    pub action: ActionType,
}

pub struct CycleOutput {
    pub actions: Vec<PendingAction>,
    pub newly_suspended: Vec<IntentionId>,
    pub diagnostics: CycleDiagnostics,
}

fn ctx_target(target: AgentId) -> std::collections::HashMap<String, BeliefValue> {
    let mut m = std::collections::HashMap::new();
    m.insert("target".to_string(), BeliefValue::Number(target.0 as f64));
    m
}

/// Mirror the agent's current emotion vector into `SELF.emotion_*` beliefs
/// (§4.5 step 3), so belief-driven logic elsewhere never has to reach past
/// the belief store into the raw emotion vector.
fn update_self_beliefs(agent: &mut Agent, now: Tick) {
    let axes = agent.emotion.named_axes();
    for (axis_name, value) in axes {
        agent.beliefs.add(
            BeliefType::SelfBelief,
            "self",
            &format!("emotion_{axis_name}"),
            BeliefValue::Number(value as f64),
            1.0,
            "self_mirror",
            now,
        );
    }
}

/// Run the full cycle for one agent. `active_partners` are the ids of other
/// agents currently available for conversation (§4.2 reactive gating).
/// `hard_limit_turns`/`idle_guard_threshold` come from `WorldConfig`.
/// `history_for` resolves a partner id to that conversation's last-5 history
/// — the World owns the rolling per-conversation buffer, not this module,
/// so the Deliberation Cycle stays free of any `bdi-comm` dependency.
#[allow(clippy::too_many_arguments)]
pub fn run_cycle(
    agent: &mut Agent,
    perceptions: PerceptionBatch,
    active_partners: &[AgentId],
    now: Tick,
    now_unix: f64,
    terminal_desire_max_age_ticks: u64,
    idle_guard_threshold: u32,
    hard_limit_turns: u32,
    advisor: Option<&dyn LlmAdvisor>,
    history_for: &dyn Fn(AgentId) -> Vec<HistoryTurn>,
) -> CycleOutput {
    let mut diagnostics = CycleDiagnostics::default();

    // Step 1: cleanup pre-phase.
    agent.cleanup(now, terminal_desire_max_age_ticks);

    // Step 2: idle guard.
    agent.idle_guard(idle_guard_threshold);

    // Step 3: perception -> belief, plus the self-emotion mirror.
    for perception in &perceptions.beliefs {
        agent.beliefs.update_from_perception(perception, now);
    }
    update_self_beliefs(agent, now);

    // Step 4: hard-turn-limit counters. Every communication-class reactive
    // perception bumps its partner's counter; the user counts too (§8
    // "hard turn limit... from the same partner", and the user is still a
    // conversational partner for this purpose).
    for reactive in &perceptions.reactive {
        let partner = match reactive {
            bdi_agent::desire::ReactivePerception::AgentMessage { sender, .. } => Some(*sender),
            bdi_agent::desire::ReactivePerception::UserMessage => Some(AgentId::USER),
            bdi_agent::desire::ReactivePerception::WorldEvent { .. } => None,
        };
        if let Some(partner) = partner {
            let count = agent.conversation_turn_counts.entry(partner).or_insert(0);
            *count += 1;
            if *count >= hard_limit_turns && !agent.is_force_quit_flagged(partner) {
                agent.flag_force_quit(partner);
                diagnostics.force_quit_count += 1;
            }
        }
    }

    // Step 5: Desire Generation. `agent.desire_generator`, `agent.desires`,
    // `agent.beliefs`, etc. are disjoint fields of the same struct, so this
    // borrows each independently rather than needing a full `&mut Agent`.
    let in_conversation_with_user = agent
        .intentions
        .iter()
        .any(|i| i.status == IntentionStatus::Active && i.target() == Some(AgentId::USER));
    let new_desires = agent.desire_generator.generate(
        agent.id,
        &agent.personality,
        &agent.emotion,
        agent.social_battery,
        &agent.beliefs,
        &agent.desires,
        active_partners,
        &perceptions.reactive,
        now,
        now_unix,
        in_conversation_with_user,
        &agent.name,
        advisor,
        &perceptions.summaries,
    );
    agent.desires.extend(new_desires);

    // Step 6: backup idle drive gate. The generator's own idle-drive stage
    // (its step 5) only looks at desire state, not intention state, so an
    // idle-drive desire can come back even while a suspended social
    // intention is still in flight (its bound desire is `Pursued` with
    // motivation `Social`, which the generator's blocking check ignores).
    // Retract it here if an ACTIVE/SUSPENDED intention already exists.
    let has_live_intention = agent
        .intentions
        .iter()
        .any(|i| matches!(i.status, IntentionStatus::Active | IntentionStatus::Suspended));
    if has_live_intention {
        if let Some(pos) = agent
            .desires
            .iter()
            .rposition(|d| d.source == "idle_drive" && d.created_at == now)
        {
            agent.desires.remove(pos);
        }
    }

    // Step 7: reactive interrupts, strict precedence world_event >
    // user_message > incoming_message.
    let has_world_event = agent
        .desires
        .iter()
        .any(|d| d.source == "world_event" && d.status == DesireStatus::Active);
    if has_world_event {
        let suspended = IntentionSelector::interrupt(&mut agent.intentions, 5, "world event interrupt");
        if !suspended.is_empty() {
            debug!(agent = agent.id.0, count = suspended.len(), "world event interrupt");
        }
        diagnostics.event_interrupted += suspended.len() as u32;
        diagnostics.interrupted += suspended.len() as u32;
    }
    let has_user_message = !has_world_event
        && agent
            .desires
            .iter()
            .any(|d| d.source == "user_message" && d.status == DesireStatus::Active);
    if has_user_message {
        let suspended = IntentionSelector::interrupt(&mut agent.intentions, 5, "user message interrupt");
        diagnostics.user_interrupted += suspended.len() as u32;
        diagnostics.interrupted += suspended.len() as u32;
    }
    let has_incoming = agent
        .desires
        .iter()
        .any(|d| d.source == "incoming_message" && d.status == DesireStatus::Active);
    if has_incoming {
        let suspended = IntentionSelector::interrupt(&mut agent.intentions, 4, "incoming message interrupt");
        diagnostics.interrupted += suspended.len() as u32;
    }

    // Step 8: conversation-turn LLM analysis, for every ACTIVE
    // non-interruptible (socially locked) intention with a live partner.
    let locked_targets: Vec<(IntentionId, AgentId)> = agent
        .intentions
        .iter()
        .filter(|i| i.status == IntentionStatus::Active && !i.interruptible)
        .filter_map(|i| i.target().map(|t| (i.id, t)))
        .collect();

    for (intention_id, partner) in locked_targets {
        if agent.is_force_quit_flagged(partner) || agent.wrap_up_issued.contains(&partner) {
            continue;
        }
        let Some(advisor) = advisor else { continue };
        let history = history_for(partner);
        let verdict = advisor.analyze_conversation_turn(
            &agent.name,
            agent.id,
            &agent.personality,
            &history,
            agent.social_battery,
        );
        match verdict {
            Err(ref e) => {
                warn!(agent = agent.id.0, partner = partner.0, error = %e, "analyze_conversation_turn failed");
                // Deterministic contract failure: insert an inert THINK
                // step so the cycle has something concrete to dispatch
                // without altering the conversation's trajectory.
                if let Some(intention) = agent.intention_mut(intention_id) {
                    let step = PlanStep::new(ActionType::Think, "think", 0.5);
                    let at = intention.current_step.min(intention.plan.steps.len());
                    intention.plan.steps.insert(at, step);
                }
            }
            Ok(ConversationVerdict::Continue) => {}
            Ok(ConversationVerdict::WrapUp) => {
                if let Some(intention) = agent.intention_mut(intention_id) {
                    intention.abandon("wrap up");
                }
                if let Some(intention) = agent.intentions.iter().find(|i| i.id == intention_id) {
                    if let Some(desire) = agent.desire_mut(intention.desire_id) {
                        desire.status = DesireStatus::Abandoned;
                    }
                }

                let desire_id = agent.desire_generator.next_desire_id();
                let farewell_desire = Desire {
                    id: desire_id,
                    description: format!("wrap up conversation with agent_{}", partner.0),
                    priority: 0.99,
                    urgency: 0.9,
                    status: DesireStatus::Pursued,
                    motivation_type: MotivationType::Social,
                    source: "wrap_up".to_string(),
                    personality_alignment: 1.0,
                    created_at: now,
                    deadline: None,
                    context: ctx_target(partner),
                };
                let plan = Plan::new(vec![
                    PlanStep::new(
                        ActionType::SendMessage {
                            target: partner,
                            message_type: bdi_agent::plan::MessageKind::Farewell,
                            topic: None,
                            tone: None,
                            requires_response: false,
                            response_timeout: 0.0,
                            in_reply_to: None,
                            incoming_content: None,
                        },
                        "say goodbye",
                        0.5,
                    ),
                    PlanStep::new(ActionType::EndConversation, "end the conversation", 0.5),
                ]);
                let new_id = agent.next_intention_id();
                let new_intention = Intention::new(new_id, &farewell_desire, plan, false, now);
                agent.desires.push(farewell_desire);
                agent.intentions.push(new_intention);
                agent.wrap_up_issued.insert(partner);
                diagnostics.wrap_up_triggered += 1;
                debug!(agent = agent.id.0, partner = partner.0, "conversation wrap-up triggered");
            }
            Ok(ConversationVerdict::ForceQuit) => {
                agent.flag_force_quit(partner);
                diagnostics.force_quit_count += 1;
                debug!(agent = agent.id.0, partner = partner.0, "conversation force-quit flagged");
            }
        }
    }

    // Step 9: dynamic plan extension when the opposite party's message just
    // landed and the in-flight dialogue plan is down to its last step.
    let extend_targets: Vec<(IntentionId, AgentId)> = agent
        .intentions
        .iter()
        .filter(|i| i.status == IntentionStatus::Active && !i.interruptible)
        .filter(|i| i.plan.remaining_steps(i.current_step) <= 1)
        .filter_map(|i| i.target().map(|t| (i.id, t)))
        .collect();
    let has_incoming_urgent = agent
        .desires
        .iter()
        .any(|d| d.source == "incoming_message" && d.status == DesireStatus::Active);
    if has_incoming_urgent {
        for (intention_id, partner) in extend_targets {
            if agent.is_force_quit_flagged(partner) || agent.wrap_up_issued.contains(&partner) {
                continue;
            }
            let history = history_for(partner);
            if let Some(intention) = agent.intention_mut(intention_id) {
                Planner::extend_conversation_plan(
                    intention,
                    agent.id,
                    &agent.name,
                    &agent.personality,
                    false,
                    &history,
                    agent.social_battery,
                    advisor,
                );
            }
        }
    }

    // Step 10: intention selection, only when nothing is ACTIVE.
    if !agent.has_active_intention() {
        let bound = agent.bound_desire_ids();
        let selection = IntentionSelector::select(&agent.desires, &bound, &agent.beliefs, now);
        match selection {
            Some(selection) => {
                let desire = agent.desires[selection.desire_index].clone();
                let target_partner = desire.context_agent("target");
                let history = target_partner.map(history_for).unwrap_or_default();
                let plan = Planner::build_plan(
                    &desire,
                    agent.id,
                    &agent.name,
                    &agent.personality,
                    agent.social_battery,
                    &history,
                    advisor,
                );
                let plan = if plan.steps.is_empty() {
                    Plan::create_multi_step_plan(vec![
                        (ActionType::Observe { subject: None }, "take a look around", 1.0),
                        (ActionType::Think, "think it over", 1.0),
                    ])
                } else {
                    plan
                };
                let interruptible = !selection.tier_override && IntentionSelector::derive_interruptible(&desire);
                let intention_id = agent.next_intention_id();
                let mut intention = Intention::new(intention_id, &desire, plan, interruptible, now);
                if selection.tier_override {
                    intention.priority = 1.0;
                }
                agent.desires[selection.desire_index].status = if desire.source == "world_event" {
                    DesireStatus::Achieved
                } else {
                    DesireStatus::Pursued
                };
                agent.intentions.push(intention);
            }
            None => {
                IntentionSelector::resume_all(&mut agent.intentions);
            }
        }
    }

    // Step 11: execution harvest.
    let actions = agent
        .intentions
        .iter()
        .filter(|i| i.status == IntentionStatus::Active)
        .filter_map(|i| {
            i.get_current_action().map(|step| PendingAction {
                intention_id: i.id,
                step_index: i.current_step,
                action: step.action.clone(),
            })
        })
        .collect();

    let newly_suspended = agent
        .intentions
        .iter()
        .filter(|i| i.status == IntentionStatus::Suspended)
        .map(|i| i.id)
        .collect();

    CycleOutput {
        actions,
        newly_suspended,
        diagnostics,
    }
}
