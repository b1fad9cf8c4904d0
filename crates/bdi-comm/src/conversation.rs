//! A two-party conversation and its lifecycle (§3, §4.6).

use bdi_core::{AgentId, ConversationId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConversationStatus {
    Active,
    Waiting,
    Ended,
    TimedOut,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Conversation {
    pub id: ConversationId,
    /// Exactly two participants (§3). Order is insertion order, not significant.
    pub participants: [AgentId; 2],
    pub topic: String,
    pub status: ConversationStatus,
    pub started_at: f64,
    pub last_activity: f64,
    pub ended_at: Option<f64>,
    pub waiting_for_response_from: Option<AgentId>,
    pub expected_response_by: Option<f64>,
}

impl Conversation {
    pub fn new(id: ConversationId, a: AgentId, b: AgentId, topic: impl Into<String>, now: f64) -> Self {
        Self {
            id,
            participants: [a, b],
            topic: topic.into(),
            status: ConversationStatus::Active,
            started_at: now,
            last_activity: now,
            ended_at: None,
            waiting_for_response_from: None,
            expected_response_by: None,
        }
    }

    pub fn has_participant(&self, id: AgentId) -> bool {
        self.participants.contains(&id)
    }

    pub fn other_participant(&self, id: AgentId) -> Option<AgentId> {
        self.participants.iter().copied().find(|&p| p != id)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ConversationStatus::Active | ConversationStatus::Waiting)
    }

    /// Record a message being sent within this conversation: bump
    /// `last_activity`, and either enter `WAITING` (if a response is
    /// required) or return to `ACTIVE` (§4.6 `send_message`).
    pub fn record_send(&mut self, requires_response: bool, receiver: AgentId, response_timeout: f64, now: f64) {
        self.last_activity = now;
        if requires_response {
            self.waiting_for_response_from = Some(receiver);
            self.expected_response_by = Some(now + response_timeout);
            self.status = ConversationStatus::Waiting;
        } else {
            self.waiting_for_response_from = None;
            self.expected_response_by = None;
            self.status = ConversationStatus::Active;
        }
    }

    pub fn end(&mut self, now: f64) {
        self.status = ConversationStatus::Ended;
        self.ended_at = Some(now);
        self.waiting_for_response_from = None;
        self.expected_response_by = None;
    }
}
