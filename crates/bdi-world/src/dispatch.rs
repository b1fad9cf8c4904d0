//! Action dispatcher (§4.7): one handler per [`ActionType`], executed
//! immediately after an agent's deliberation cycle hands back its pending
//! actions. Every handler ends by mutating the owning step/intention
//! in-place — the "`confirm_action_execution` exactly once" contract is
//! satisfied either by [`confirm`] or, for the monologue/reject-rewind
//! paths, by [`rewind_to_end_conversation`], which performs the same
//! bookkeeping via [`bdi_agent::plan::Plan::skip_to_end_conversation`].

use std::collections::{HashMap, VecDeque};

use bdi_agent::advisor::{HistoryTurn, LlmAdvisor};
use bdi_agent::agent::Agent;
use bdi_agent::belief::{BeliefType, BeliefValue};
use bdi_agent::intention::{Intention, IntentionStatus};
use bdi_agent::plan::{ActionType, MessageKind, OnTimeout};
use bdi_comm::{CommunicationHub, Message, MessageType};
use bdi_core::{AgentId, IntentionId, Tick};
use tracing::{debug, warn};

use crate::emotion_engine;
use crate::perception::reactive_to_comm;

pub const HISTORY_CAPACITY: usize = 5;

/// Canonical (unordered) key for a two-party conversation transcript, shared
/// by both participants regardless of who is viewing it.
pub fn conv_key(a: AgentId, b: AgentId) -> (AgentId, AgentId) {
    if a.0 <= b.0 {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn push_history(
    history: &mut HashMap<(AgentId, AgentId), VecDeque<HistoryTurn>>,
    a: AgentId,
    b: AgentId,
    sender_name: String,
    content: String,
) {
    let buf = history.entry(conv_key(a, b)).or_default();
    buf.push_back(HistoryTurn { sender_name, content });
    while buf.len() > HISTORY_CAPACITY {
        buf.pop_front();
    }
}

fn history_vec(history: &HashMap<(AgentId, AgentId), VecDeque<HistoryTurn>>, a: AgentId, b: AgentId) -> Vec<HistoryTurn> {
    history.get(&conv_key(a, b)).map(|d| d.iter().cloned().collect()).unwrap_or_default()
}

/// `confirm_action_execution(intention_id, step, success, message)`. Marks
/// the step, updates the intention's counters, advances `current_step` if
/// this was in fact the current step, and completes the intention once
/// every step has executed (§3 invariant 5).
pub fn confirm(intention: &mut Intention, step_index: usize, success: bool, message: impl Into<String>, now: Tick) {
    if let Some(step) = intention.plan.steps.get_mut(step_index) {
        step.executed = true;
        step.success = success;
        step.result = Some(message.into());
    }
    if success {
        intention.steps_completed += 1;
    } else {
        intention.steps_failed += 1;
    }
    if intention.current_step == step_index {
        intention.current_step += 1;
    }
    if intention.all_steps_executed() {
        intention.status = IntentionStatus::Completed;
        intention.completed_at = Some(now);
    }
}

/// Record that `step_index` is still pending (the `WAIT_FOR_RESPONSE`
/// counter hasn't reached `max_ticks` yet) without advancing past it — the
/// step must run again next tick.
fn confirm_retry(intention: &mut Intention, step_index: usize) {
    if let Some(step) = intention.plan.steps.get_mut(step_index) {
        step.result = Some("still waiting".to_string());
    }
}

/// Rewind a plan to its next `END_CONVERSATION` step (or its end, if none
/// exists) instead of confirming `from` as an ordinary success/failure —
/// used by the monologue guard and by `INITIATE_CONVERSATION`/
/// `WAIT_FOR_RESPONSE`'s reject/timeout paths.
fn rewind_to_end_conversation(intention: &mut Intention, from: usize, now: Tick) {
    let end_idx = intention.plan.skip_to_end_conversation(from);
    intention.current_step = end_idx;
    intention.steps_failed += 1;
    if intention.all_steps_executed() {
        intention.status = IntentionStatus::Completed;
        intention.completed_at = Some(now);
    }
}

fn battery_drain_cost(extraversion: f32, neuroticism: f32) -> f32 {
    let mut cost = (1.1 - extraversion) * 0.15;
    if extraversion < 0.4 {
        cost *= 1.5;
    }
    if extraversion > 0.6 {
        cost *= 0.7;
    }
    if neuroticism > 0.6 {
        cost *= 1.2;
    }
    cost
}

fn battery_restore_amount(extraversion: f32) -> f32 {
    let mut amount = 0.05;
    if extraversion > 0.6 {
        amount *= 1.2;
    }
    amount
}

fn fallback_content(message_type: &str) -> String {
    match message_type {
        "greeting" => "Hello there.".to_string(),
        "question" => "What do you think about that?".to_string(),
        "answer" => "I see what you mean.".to_string(),
        "farewell" => "I should get going — talk soon.".to_string(),
        "ack" => "Got it.".to_string(),
        _ => "I wanted to share a thought.".to_string(),
    }
}

/// Lowercase label passed to `LlmAdvisor::generate_content`, matching the
/// keys `FallbackAdvisor`'s template bank matches on.
fn kind_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Greeting => "greeting",
        MessageKind::Question => "question",
        MessageKind::Answer => "answer",
        MessageKind::Statement => "statement",
        MessageKind::Farewell => "farewell",
        MessageKind::Ack => "ack",
    }
}

/// Context threaded through every handler call: the pieces of `World` state
/// that live outside the acting `Agent` but that dispatch needs to touch.
pub struct DispatchContext<'a> {
    pub hub: &'a mut CommunicationHub,
    pub relationships: &'a mut HashMap<(AgentId, AgentId), f32>,
    pub wait_tick_counters: &'a mut HashMap<IntentionId, u32>,
    pub history: &'a mut HashMap<(AgentId, AgentId), VecDeque<HistoryTurn>>,
    pub advisor: Option<&'a dyn LlmAdvisor>,
    pub now: Tick,
    pub now_unix: f64,
    pub tick_cache: &'a [Message],
}

fn find_mut<'a>(actor: &'a mut Agent, id: IntentionId) -> Option<&'a mut Intention> {
    actor.intentions.iter_mut().find(|i| i.id == id)
}

/// Execute one pending action for `actor`. `other` is the resolved
/// conversation partner's `Agent` when the action both needs one and the
/// target isn't the reserved `user` id.
pub fn execute_action(
    actor: &mut Agent,
    other: Option<&mut Agent>,
    intention_id: IntentionId,
    step_index: usize,
    action: &ActionType,
    ctx: &mut DispatchContext<'_>,
) {
    match action {
        ActionType::InitiateConversation { target, topic } => {
            let target = *target;
            if target.is_user() {
                let conv_id = ctx.hub.start_conversation(actor.id, target, topic.clone(), ctx.now_unix);
                actor.beliefs.add(
                    BeliefType::SelfBelief,
                    "self",
                    "current_conversation",
                    BeliefValue::Number(conv_id.0 as f64),
                    1.0,
                    "initiate_conversation",
                    ctx.now,
                );
                if let Some(intention) = find_mut(actor, intention_id) {
                    confirm(intention, step_index, true, "joined user conversation", ctx.now);
                }
                return;
            }

            let rejected = match &other {
                None => true,
                Some(other) => {
                    !ctx.hub.is_registered(target)
                        || actor.desire_generator.is_partner_on_cooldown(target, ctx.now_unix, &actor.personality)
                        || actor.desire_generator.is_globally_blocked(ctx.now_unix, &actor.personality)
                        || other.desire_generator.is_globally_blocked(ctx.now_unix, &other.personality)
                        || other.social_battery < 0.05
                }
            };
            if rejected {
                debug!(actor = actor.id.0, target = target.0, "initiate_conversation rejected");
                if let Some(intention) = find_mut(actor, intention_id) {
                    rewind_to_end_conversation(intention, step_index, ctx.now);
                }
                return;
            }
            let conv_id = ctx.hub.start_conversation(actor.id, target, topic.clone(), ctx.now_unix);
            actor.beliefs.add(
                BeliefType::SelfBelief,
                "self",
                "current_conversation",
                BeliefValue::Number(conv_id.0 as f64),
                1.0,
                "initiate_conversation",
                ctx.now,
            );
            if let Some(intention) = find_mut(actor, intention_id) {
                confirm(intention, step_index, true, "conversation started", ctx.now);
            }
        }

        ActionType::SendMessage {
            target,
            message_type,
            topic,
            tone,
            requires_response,
            response_timeout,
            in_reply_to,
            incoming_content,
        } => dispatch_outbound(
            actor,
            intention_id,
            step_index,
            *target,
            *message_type,
            topic.clone(),
            tone.clone(),
            *requires_response,
            *response_timeout,
            *in_reply_to,
            incoming_content.clone(),
            ctx,
        ),

        ActionType::RespondToMessage {
            target,
            in_reply_to,
            incoming_content,
            tone,
        } => dispatch_outbound(
            actor,
            intention_id,
            step_index,
            *target,
            MessageKind::Answer,
            None,
            tone.clone(),
            false,
            0.0,
            *in_reply_to,
            Some(incoming_content.clone()),
            ctx,
        ),

        ActionType::WaitForResponse { expected_from, on_timeout, max_ticks } => {
            let expected_from = *expected_from;
            let on_timeout = *on_timeout;
            let max_ticks = *max_ticks;
            let incoming = ctx.tick_cache.iter().find(|m| m.sender_id == expected_from);
            match incoming {
                Some(m) if matches!(m.message_type, MessageType::Farewell | MessageType::Ack) => {
                    ctx.wait_tick_counters.remove(&intention_id);
                    if let Some(intention) = find_mut(actor, intention_id) {
                        rewind_to_end_conversation(intention, step_index, ctx.now);
                    }
                }
                Some(m) => {
                    let key = format!("reply_{}_received", m.id.0);
                    actor.beliefs.add(BeliefType::Event, "self", &key, BeliefValue::Bool(true), 1.0, "wait_for_response", ctx.now);
                    ctx.wait_tick_counters.remove(&intention_id);
                    if let Some(intention) = find_mut(actor, intention_id) {
                        confirm(intention, step_index, true, "reply received", ctx.now);
                    }
                }
                None => {
                    let counter = ctx.wait_tick_counters.entry(intention_id).or_insert(0);
                    *counter += 1;
                    let reached = *counter >= max_ticks;
                    if reached {
                        ctx.wait_tick_counters.remove(&intention_id);
                        debug!(actor = actor.id.0, expected_from = expected_from.0, "wait_for_response timed out");
                        // Last-moment recheck: `ctx.tick_cache` is this same
                        // tick's drained messages, already consulted above,
                        // so no later arrival within the tick is possible.
                        if let Some(intention) = find_mut(actor, intention_id) {
                            match on_timeout {
                                OnTimeout::End => rewind_to_end_conversation(intention, step_index, ctx.now),
                                OnTimeout::Continue => confirm(intention, step_index, true, "wait timed out, continuing", ctx.now),
                            }
                        }
                    } else if let Some(intention) = find_mut(actor, intention_id) {
                        confirm_retry(intention, step_index);
                    }
                }
            }
        }

        ActionType::EndConversation => {
            let partner = find_mut(actor, intention_id).and_then(|i| i.target());
            if let Some(partner) = partner {
                if let Some(conv) = ctx.hub.get_active_conversation(actor.id, partner) {
                    let conv_id = conv.id;
                    let _ = ctx.hub.end_conversation(conv_id, ctx.now_unix);
                }
                actor.beliefs.remove(BeliefType::SelfBelief, "self", "current_conversation");
                actor.desire_generator.mark_conversation_ended(partner, ctx.now_unix, &actor.personality);
                if let Some(other) = other {
                    other.desire_generator.mark_conversation_ended(actor.id, ctx.now_unix, &other.personality);
                }
            }
            if let Some(intention) = find_mut(actor, intention_id) {
                confirm(intention, step_index, true, "conversation ended", ctx.now);
            }
        }

        ActionType::Move { destination } => {
            actor.beliefs.add(BeliefType::SelfBelief, "self", "location", BeliefValue::Text(destination.clone()), 1.0, "move", ctx.now);
            actor.desire_generator.mark_solo_action("move");
            if let Some(intention) = find_mut(actor, intention_id) {
                confirm(intention, step_index, true, "moved", ctx.now);
            }
        }

        ActionType::Observe { .. }
        | ActionType::Think
        | ActionType::Search { .. }
        | ActionType::Wait
        | ActionType::Express
        | ActionType::Acquire
        | ActionType::Use
        | ActionType::Help
        | ActionType::Request
        | ActionType::Give => {
            let label = action.label().to_lowercase();
            actor.desire_generator.mark_solo_action(&label);
            let restore = battery_restore_amount(actor.personality.extraversion);
            actor.restore_battery(restore);
            if let Some(intention) = find_mut(actor, intention_id) {
                confirm(intention, step_index, true, "done", ctx.now);
            }
        }
    }
}

/// Shared body for `SEND_MESSAGE`/`RESPOND_TO_MESSAGE` (§4.7): the two
/// differ only in how their fields are sourced (a `RespondToMessage` step
/// is classified as an `ANSWER` reply, never requiring a further response).
#[allow(clippy::too_many_arguments)]
fn dispatch_outbound(
    actor: &mut Agent,
    intention_id: IntentionId,
    step_index: usize,
    target: AgentId,
    kind: MessageKind,
    topic: Option<String>,
    tone: Option<String>,
    requires_response: bool,
    response_timeout: f64,
    in_reply_to: Option<bdi_core::MessageId>,
    incoming_content: Option<String>,
    ctx: &mut DispatchContext<'_>,
) {
    let (desire_description, bypass_battery) = actor
        .intentions
        .iter()
        .find(|i| i.id == intention_id)
        .map(|i| (i.desire_description.clone(), i.bypass_battery))
        .unwrap_or_default();

    let conversation_id = ctx
        .hub
        .get_active_conversation(actor.id, target)
        .map(|c| c.id)
        .or_else(|| target.is_user().then(|| ctx.hub.start_conversation(actor.id, target, "user".to_string(), ctx.now_unix)));

    let Some(conversation_id) = conversation_id else {
        if let Some(intention) = find_mut(actor, intention_id) {
            rewind_to_end_conversation(intention, step_index, ctx.now);
        }
        return;
    };

    let history = history_vec(ctx.history, actor.id, target);
    let label = kind_label(kind);
    let content = ctx
        .advisor
        .and_then(|a| {
            a.generate_content(&actor.personality, &desire_description, &history, label, incoming_content.as_deref())
                .map_err(|e| warn!(actor = actor.id.0, error = %e, "generate_content failed, using template"))
                .ok()
        })
        .unwrap_or_else(|| fallback_content(label));

    let message_id = ctx.hub.next_message_id();
    let message = Message::new(
        message_id,
        actor.id,
        target,
        content.clone(),
        reactive_to_comm(kind),
        Some(conversation_id),
        in_reply_to,
        topic,
        tone,
        requires_response,
        response_timeout,
        ctx.now_unix,
    );
    ctx.hub.send_message(message, ctx.now_unix);

    let affinity = {
        let entry = ctx.relationships.entry((actor.id, target)).or_insert(0.0);
        *entry = (*entry + 0.03).clamp(-1.0, 1.0);
        *entry
    };
    emotion_engine::apply_dialogue_affinity(&mut actor.emotion, affinity, actor.personality.neuroticism);

    if !bypass_battery {
        let cost = battery_drain_cost(actor.personality.extraversion, actor.personality.neuroticism);
        actor.drain_battery(cost);
    }

    push_history(ctx.history, actor.id, target, actor.name.clone(), content);

    if let Some(intention) = find_mut(actor, intention_id) {
        confirm(intention, step_index, true, "message sent", ctx.now);
    }
}

/// `atomic_force_quit(agent, partner_id)` (§4.7): the symmetric tear-down
/// run once per flagged partner, consumed from `Agent::consume_force_quit_partners`
/// by the Tick Loop. Must run without yielding to any other agent's
/// dispatch — the caller holds both `Agent`s and the Hub for its duration.
pub fn atomic_force_quit(
    agent: &mut Agent,
    partner: &mut Agent,
    hub: &mut CommunicationHub,
    wait_tick_counters: &mut HashMap<IntentionId, u32>,
    now_unix: f64,
) {
    tracing::info!(agent = agent.id.0, partner = partner.id.0, "conversation force-quit");
    if let Some(conv) = hub.get_active_conversation(agent.id, partner.id) {
        let conv_id = conv.id;
        let _ = hub.end_conversation(conv_id, now_unix);
    }
    emotion_engine::apply_trigger(&mut agent.emotion, "force_quit", agent.personality.neuroticism);
    emotion_engine::apply_trigger(&mut partner.emotion, "force_quit", partner.personality.neuroticism);

    let agent_id = agent.id;
    let partner_id = partner.id;
    force_quit_side(agent, partner_id, wait_tick_counters);
    force_quit_side(partner, agent_id, wait_tick_counters);

    agent.desire_generator.mark_conversation_ended(partner_id, now_unix, &agent.personality);
    partner.desire_generator.mark_conversation_ended(agent_id, now_unix, &partner.personality);
}

/// Abandon every intention (and its owning desire) targeting `counterpart`,
/// clearing any wait-tick counter — one side of `atomic_force_quit`'s
/// symmetric tear-down.
fn force_quit_side(side: &mut Agent, counterpart: AgentId, wait_tick_counters: &mut HashMap<IntentionId, u32>) {
    let mut abandoned_desire_ids = Vec::new();
    for intention in side.intentions.iter_mut() {
        if intention.target() == Some(counterpart) && !intention.status.is_terminal() {
            wait_tick_counters.remove(&intention.id);
            intention.abandon("force quit");
            abandoned_desire_ids.push(intention.desire_id);
        }
    }
    for desire in side.desires.iter_mut() {
        if abandoned_desire_ids.contains(&desire.id) {
            desire.status = bdi_agent::desire::DesireStatus::Abandoned;
        }
    }
}
