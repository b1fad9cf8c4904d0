//! Perception assembly (§4.7): the three perception classes built once per
//! agent per tick, in order, before the Deliberation Cycle ingests them.

use std::collections::{HashMap, VecDeque};

use bdi_agent::belief::{agent_subject, bool_field, text_field, Perception};
use bdi_agent::desire::{ReactiveMessageKind, ReactivePerception};
use bdi_agent::emotion::Emotion;
use bdi_core::{AgentId, Tick};
use bdi_comm::{Message, MessageType};

use crate::emotion_engine;
use crate::event::EventLog;

/// Map the Hub's closed message-role enum onto the Desire Generator's
/// independent one (both crates define their own per the dependency-order
/// note in `bdi-comm::message`).
pub fn comm_to_reactive(t: MessageType) -> ReactiveMessageKind {
    match t {
        MessageType::Greeting => ReactiveMessageKind::Greeting,
        MessageType::Question => ReactiveMessageKind::Question,
        MessageType::Answer => ReactiveMessageKind::Answer,
        MessageType::Statement => ReactiveMessageKind::Statement,
        MessageType::Farewell => ReactiveMessageKind::Farewell,
        MessageType::Ack => ReactiveMessageKind::Ack,
    }
}

/// The inverse mapping, used by the dispatcher when building outbound
/// `Message`s from a `PlanStep`'s `MessageKind`.
pub fn reactive_to_comm(k: ReactiveMessageKind) -> MessageType {
    match k {
        ReactiveMessageKind::Greeting => MessageType::Greeting,
        ReactiveMessageKind::Question => MessageType::Question,
        ReactiveMessageKind::Answer => MessageType::Answer,
        ReactiveMessageKind::Statement => MessageType::Statement,
        ReactiveMessageKind::Farewell => MessageType::Farewell,
        ReactiveMessageKind::Ack => MessageType::Ack,
    }
}

/// A read-only snapshot of one other agent, pre-collected before the
/// per-agent loop: every snapshot is built before any agent mutates its own
/// state, so nothing in the loop below observes a partially-updated peer.
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub location: Option<String>,
    pub in_conversation: bool,
}

/// Perceptions built for one agent this tick, split by consumer:
/// `beliefs` feeds `BeliefStore::update_from_perception` (Deliberation step
/// 3), `reactive` feeds `DesireGenerator::generate`'s reactive stage, and
/// `summaries` feeds the advisor's `recent_perceptions` parameter.
pub struct PerceptionBatch {
    pub beliefs: Vec<Perception>,
    pub reactive: Vec<ReactivePerception>,
    pub summaries: Vec<String>,
}

/// Per-agent bookkeeping for event-log deduplication (§3: "first time an
/// event id is seen by an agent"), capped at `processed_event_ids_capacity`.
pub fn remember_event(seen: &mut VecDeque<u64>, capacity: usize, id: u64) {
    seen.push_back(id);
    while seen.len() > capacity.max(1) {
        seen.pop_front();
    }
}

#[allow(clippy::too_many_arguments)]
pub fn assemble_for_agent(
    agent_id: AgentId,
    messages: Vec<Message>,
    others: &[AgentSnapshot],
    event_log: &EventLog,
    processed_event_ids: &mut VecDeque<u64>,
    processed_event_ids_capacity: usize,
    emotion: &mut Emotion,
    neuroticism: f32,
    relationships: &mut HashMap<(AgentId, AgentId), f32>,
    now: Tick,
    window_ticks: u64,
) -> PerceptionBatch {
    let mut beliefs = Vec::new();
    let mut reactive = Vec::new();
    let mut summaries = Vec::new();

    // ── 1. Event-log perceptions ───────────────────────────────────────
    let fresh: Vec<(u64, String)> = event_log
        .recent(now, window_ticks)
        .filter(|e| e.targets(agent_id))
        .map(|e| (e.id, e.description.clone()))
        .collect();

    for (id, description) in fresh {
        beliefs.push(Perception {
            perception_type: "world_event".to_string(),
            subject: "world".to_string(),
            data: vec![text_field("description", description.clone())],
            confidence: 0.9,
        });
        reactive.push(ReactivePerception::WorldEvent { event_id: id });
        summaries.push(format!("world event: {description}"));

        if !processed_event_ids.contains(&id) {
            emotion_engine::apply_trigger(emotion, "world_event", neuroticism);
            if let Some(trigger) = emotion_engine::classify_content(&description) {
                if trigger != "world_event" {
                    emotion_engine::apply_trigger(emotion, trigger, neuroticism);
                }
            }
            remember_event(processed_event_ids, processed_event_ids_capacity, id);
        }
    }

    // ── 2. Communication perceptions ───────────────────────────────────
    for message in messages {
        let sender = message.sender_id;
        beliefs.push(Perception {
            perception_type: "communication".to_string(),
            subject: agent_subject(sender),
            data: vec![
                text_field("content", message.content.clone()),
                text_field("message_type", format!("{:?}", message.message_type)),
                text_field("topic", message.topic.clone().unwrap_or_default()),
                text_field(
                    "conversation_id",
                    message
                        .conversation_id
                        .map(|c| c.0.to_string())
                        .unwrap_or_default(),
                ),
                bool_field("requires_response", message.requires_response),
                text_field("message_id", message.id.0.to_string()),
            ],
            confidence: 1.0,
        });

        if sender.is_user() {
            reactive.push(ReactivePerception::UserMessage);
        } else {
            reactive.push(ReactivePerception::AgentMessage {
                sender,
                kind: comm_to_reactive(message.message_type),
            });
        }

        relationships
            .entry((agent_id, sender))
            .and_modify(|a| *a = (*a + 0.04).clamp(-1.0, 1.0))
            .or_insert(0.04);

        match message.message_type {
            MessageType::Farewell => emotion_engine::apply_trigger(emotion, "farewell", neuroticism),
            MessageType::Ack => {}
            _ => {
                if let Some(trigger) = emotion_engine::classify_content(&message.content) {
                    emotion_engine::apply_trigger(emotion, trigger, neuroticism);
                }
            }
        }

        let preview: String = message.content.chars().take(60).collect();
        summaries.push(format!("message from agent_{}: {preview}", sender.0));
    }

    // ── 3. Observation perceptions ─────────────────────────────────────
    for other in others {
        if other.id == agent_id {
            continue;
        }
        beliefs.push(Perception {
            perception_type: "observation".to_string(),
            subject: agent_subject(other.id),
            data: vec![
                text_field("location", other.location.clone().unwrap_or_else(|| "unknown".to_string())),
                bool_field("in_conversation", other.in_conversation),
                text_field("name", other.name.clone()),
            ],
            confidence: 0.6,
        });
    }

    PerceptionBatch {
        beliefs,
        reactive,
        summaries,
    }
}
