//! Belief Store — a confidence-weighted knowledge base keyed by
//! `(type, subject, key)` (§4.1).

use std::collections::HashMap;

use bdi_core::{AgentId, BeliefId, Tick};

/// Category of a [`Belief`]. Assigned by [`BeliefStore::update_from_perception`]
/// from the shape of the incoming perception.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BeliefType {
    /// Beliefs about the owning agent itself (location, current conversation, emotions).
    SelfBelief,
    /// Beliefs about another agent.
    Agent,
    /// Beliefs about the world/environment at large.
    World,
    /// Beliefs about a discrete event.
    Event,
    /// Social norms / reputation beliefs.
    Social,
}

/// Composite key a [`BeliefStore`] indexes on. Subject is a `String` because
/// it can name either an [`AgentId`] (stringified) or a free-form world
/// entity ("weather", "park").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BeliefKey {
    pub belief_type: BeliefType,
    pub subject: String,
    pub key: String,
}

/// One belief: a typed, confidence-weighted fact.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Belief {
    pub id: BeliefId,
    pub belief_type: BeliefType,
    pub subject: String,
    pub key: String,
    pub value: BeliefValue,
    pub confidence: f32,
    pub source: String,
    pub timestamp: Tick,
}

/// Belief values are one of a small closed set — enough to cover every use
/// in this engine (locations, flags, numeric readings, free text) without
/// resorting to an open `Any`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BeliefValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl std::fmt::Display for BeliefValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeliefValue::Text(s) => write!(f, "{s}"),
            BeliefValue::Number(n) => write!(f, "{n}"),
            BeliefValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl BeliefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BeliefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            BeliefValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A single field from a perception's data map, used to build beliefs via
/// [`BeliefStore::update_from_perception`].
pub struct PerceptionField {
    pub key: String,
    pub value: BeliefValue,
}

/// A perception as consumed by the Belief Store (§4.1 ingestion rule).
pub struct Perception {
    pub perception_type: String,
    pub subject: String,
    pub data: Vec<PerceptionField>,
    pub confidence: f32,
}

/// Confidence-weighted knowledge base, one per agent.
#[derive(Default)]
pub struct BeliefStore {
    beliefs: HashMap<BeliefKey, Belief>,
    next_id: u64,
}

impl BeliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.beliefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beliefs.is_empty()
    }

    fn key_for(belief_type: BeliefType, subject: &str, key: &str) -> BeliefKey {
        BeliefKey {
            belief_type,
            subject: subject.to_string(),
            key: key.to_string(),
        }
    }

    /// Insert-or-merge per §3's update policy:
    /// - same value: confidence += 0.1 (capped at 1.0), timestamp refreshes.
    /// - differing value: whichever has greater confidence wins; ties (and
    ///   the case where the new belief isn't strictly greater) average the
    ///   two confidences.
    pub fn add(
        &mut self,
        belief_type: BeliefType,
        subject: &str,
        key: &str,
        value: BeliefValue,
        confidence: f32,
        source: &str,
        timestamp: Tick,
    ) -> Belief {
        let lookup = Self::key_for(belief_type, subject, key);
        if let Some(existing) = self.beliefs.get_mut(&lookup) {
            if existing.value == value {
                existing.confidence = (existing.confidence + 0.1).min(1.0);
                existing.timestamp = timestamp;
            } else if confidence >= existing.confidence {
                existing.value = value;
                existing.confidence = confidence;
                existing.timestamp = timestamp;
                existing.source = source.to_string();
            } else {
                existing.confidence = (existing.confidence + confidence) / 2.0;
            }
            return existing.clone();
        }

        self.next_id += 1;
        let belief = Belief {
            id: BeliefId(self.next_id),
            belief_type,
            subject: subject.to_string(),
            key: key.to_string(),
            value,
            confidence,
            source: source.to_string(),
            timestamp,
        };
        self.beliefs.insert(lookup, belief.clone());
        belief
    }

    pub fn remove(&mut self, belief_type: BeliefType, subject: &str, key: &str) -> bool {
        self.beliefs
            .remove(&Self::key_for(belief_type, subject, key))
            .is_some()
    }

    pub fn get(&self, belief_type: BeliefType, subject: &str, key: &str) -> Option<&Belief> {
        self.beliefs.get(&Self::key_for(belief_type, subject, key))
    }

    pub fn get_by_type(&self, belief_type: BeliefType) -> Vec<&Belief> {
        self.beliefs
            .values()
            .filter(|b| b.belief_type == belief_type)
            .collect()
    }

    pub fn get_by_subject(&self, subject: &str) -> Vec<&Belief> {
        self.beliefs
            .values()
            .filter(|b| b.subject == subject)
            .collect()
    }

    /// Case-insensitive substring match against subject, key, or stringified
    /// value, filtered by a minimum confidence.
    pub fn query(&self, substring: &str, min_confidence: f32) -> Vec<&Belief> {
        let needle = substring.to_lowercase();
        self.beliefs
            .values()
            .filter(|b| b.confidence >= min_confidence)
            .filter(|b| {
                b.subject.to_lowercase().contains(&needle)
                    || b.key.to_lowercase().contains(&needle)
                    || b.value.to_string().to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Ingest a perception, classifying it per §4.1's rule and emitting one
    /// belief per field in its data map.
    pub fn update_from_perception(&mut self, perception: &Perception, now: Tick) -> Vec<Belief> {
        let belief_type = if perception.subject.starts_with("agent_") || perception.subject == "self" {
            if perception.subject == "self" {
                BeliefType::SelfBelief
            } else {
                BeliefType::Agent
            }
        } else if perception.perception_type.contains("event") {
            BeliefType::Event
        } else if perception.perception_type.contains("social") {
            BeliefType::Social
        } else {
            BeliefType::World
        };

        perception
            .data
            .iter()
            .map(|field| {
                self.add(
                    belief_type,
                    &perception.subject,
                    &field.key,
                    field.value.clone(),
                    perception.confidence,
                    &perception.perception_type,
                    now,
                )
            })
            .collect()
    }

    /// Beliefs below `threshold` confidence — a companion to `query` for
    /// diagnostics/output (not itself read by dispatch logic).
    pub fn uncertain(&self, threshold: f32) -> Vec<&Belief> {
        self.beliefs
            .values()
            .filter(|b| b.confidence < threshold)
            .collect()
    }

    /// Overwrite a belief's value/confidence directly, bypassing the
    /// merge-on-add policy, for callers that already know the correction is
    /// authoritative.
    pub fn revise(
        &mut self,
        belief_type: BeliefType,
        subject: &str,
        key: &str,
        new_value: BeliefValue,
        new_confidence: f32,
        now: Tick,
    ) -> bool {
        if let Some(belief) = self
            .beliefs
            .get_mut(&Self::key_for(belief_type, subject, key))
        {
            belief.value = new_value;
            belief.confidence = new_confidence;
            belief.timestamp = now;
            true
        } else {
            false
        }
    }

    /// Remove beliefs older than `max_age_ticks` whose confidence is below
    /// 0.7 (§4.1). Returns the number removed.
    pub fn clear_old(&mut self, now: Tick, max_age_ticks: u64) -> usize {
        let to_remove: Vec<BeliefKey> = self
            .beliefs
            .iter()
            .filter(|(_, b)| now.since(b.timestamp) > max_age_ticks && b.confidence < 0.7)
            .map(|(k, _)| k.clone())
            .collect();
        let removed = to_remove.len();
        for key in to_remove {
            self.beliefs.remove(&key);
        }
        removed
    }
}

/// Helper for building a bool-valued [`Perception`] field, the common case
/// for conversation-lock / flag beliefs.
pub fn bool_field(key: &str, value: bool) -> PerceptionField {
    PerceptionField {
        key: key.to_string(),
        value: BeliefValue::Bool(value),
    }
}

/// Helper for building a text-valued [`Perception`] field.
pub fn text_field(key: &str, value: impl Into<String>) -> PerceptionField {
    PerceptionField {
        key: key.to_string(),
        value: BeliefValue::Text(value.into()),
    }
}

/// Stringify an [`AgentId`] the way belief subjects name agents
/// (`"agent_<n>"`), matching the `agent_` prefix rule in §4.1.
pub fn agent_subject(id: AgentId) -> String {
    format!("agent_{}", id.0)
}
