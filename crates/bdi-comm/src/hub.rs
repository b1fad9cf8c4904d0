//! The Communication Hub (§4.6): one durable FIFO queue per registered
//! agent, plus the conversation registry with per-pair lookup.

use std::collections::{BTreeSet, HashMap, VecDeque};

use bdi_core::{AgentId, ConversationId, MessageId};

use crate::conversation::{Conversation, ConversationStatus};
use crate::error::{CommError, CommResult};
use crate::message::{Message, MessageType};

pub struct CommunicationHub {
    /// Kept as a `BTreeSet` (not a `HashSet`) so `broadcast_message` visits
    /// recipients in a deterministic order.
    registered: BTreeSet<AgentId>,
    queues: HashMap<AgentId, VecDeque<Message>>,
    conversations: HashMap<ConversationId, Conversation>,
    next_conversation_id: u64,
    next_message_id: u64,
}

impl CommunicationHub {
    pub fn new() -> Self {
        Self {
            registered: BTreeSet::new(),
            queues: HashMap::new(),
            conversations: HashMap::new(),
            next_conversation_id: 0,
            next_message_id: 0,
        }
    }

    /// Idempotent: creates the inbound queue if absent.
    pub fn register_agent(&mut self, id: AgentId) {
        self.registered.insert(id);
        self.queues.entry(id).or_default();
    }

    pub fn is_registered(&self, id: AgentId) -> bool {
        self.registered.contains(&id)
    }

    /// Caller-facing id allocator: handlers building a [`Message`] need an id
    /// before they can construct one, so the Hub hands them out directly
    /// rather than generating them inside `send_message`.
    pub fn next_message_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        MessageId(self.next_message_id)
    }

    /// Returns any existing `ACTIVE`/`WAITING` conversation with both
    /// participants; else creates one with a Hub-assigned id.
    pub fn start_conversation(
        &mut self,
        initiator: AgentId,
        target: AgentId,
        topic: impl Into<String>,
        now: f64,
    ) -> ConversationId {
        if let Some(existing) = self.get_active_conversation(initiator, target) {
            return existing.id;
        }
        self.next_conversation_id += 1;
        let id = ConversationId(self.next_conversation_id);
        self.conversations
            .insert(id, Conversation::new(id, initiator, target, topic, now));
        id
    }

    pub fn get_active_conversation(&self, a: AgentId, b: AgentId) -> Option<&Conversation> {
        self.conversations
            .values()
            .find(|c| c.is_active() && c.has_participant(a) && c.has_participant(b))
    }

    pub fn get_conversation(&self, id: ConversationId) -> Option<&Conversation> {
        self.conversations.get(&id)
    }

    pub fn is_agent_in_conversation(&self, id: AgentId) -> bool {
        self.conversations
            .values()
            .any(|c| c.is_active() && c.has_participant(id))
    }

    pub fn get_agent_active_conversations(&self, id: AgentId) -> Vec<&Conversation> {
        self.conversations
            .values()
            .filter(|c| c.is_active() && c.has_participant(id))
            .collect()
    }

    pub fn end_conversation(&mut self, id: ConversationId, now: f64) -> CommResult<()> {
        let conv = self
            .conversations
            .get_mut(&id)
            .ok_or(CommError::ConversationNotFound(id))?;
        conv.end(now);
        Ok(())
    }

    /// Stamps `delivered_at`, updates the conversation's activity/wait state
    /// if `conversation_id` resolves to a live one, then pushes to the
    /// receiver's queue. A no-op on the delivery side if the receiver was
    /// never registered — the rest of the bookkeeping still happens (§4.6
    /// invariants).
    pub fn send_message(&mut self, mut message: Message, now: f64) -> Message {
        message.delivered_at = Some(now);

        if let Some(conv_id) = message.conversation_id {
            if let Some(conv) = self.conversations.get_mut(&conv_id) {
                if conv.is_active() {
                    conv.record_send(message.requires_response, message.receiver_id, message.response_timeout, now);
                }
            }
        }

        if let Some(queue) = self.queues.get_mut(&message.receiver_id) {
            queue.push_back(message.clone());
        }
        message
    }

    /// Drains the full queue non-blocking, stamping `read_at = now` on every
    /// drained message, in enqueue order.
    pub fn receive_messages(&mut self, id: AgentId, now: f64) -> Vec<Message> {
        let Some(queue) = self.queues.get_mut(&id) else {
            return Vec::new();
        };
        queue
            .drain(..)
            .map(|mut m| {
                m.read_at = Some(now);
                m
            })
            .collect()
    }

    /// Enqueues one `Statement`-typed message to every registered agent
    /// except `sender` (§4.6). `communication.py`'s "broadcast" tag has no
    /// counterpart in the closed `MessageType` set (§3), so broadcasts are
    /// classified `Statement`.
    pub fn broadcast_message(&mut self, sender: AgentId, content: impl Into<String>, topic: Option<String>, now: f64) -> Vec<Message> {
        let content = content.into();
        let recipients: Vec<AgentId> = self.registered.iter().copied().filter(|&id| id != sender).collect();
        let mut sent = Vec::with_capacity(recipients.len());
        for receiver in recipients {
            let id = self.next_message_id();
            let mut message = Message::new(
                id,
                sender,
                receiver,
                content.clone(),
                MessageType::Statement,
                None,
                None,
                topic.clone(),
                None,
                false,
                0.0,
                now,
            );
            message.delivered_at = Some(now);
            if let Some(queue) = self.queues.get_mut(&receiver) {
                queue.push_back(message.clone());
            }
            sent.push(message);
        }
        sent
    }

    /// Timed-out `WAITING` conversations whose `expected_response_by` has
    /// passed — a status-labeling sweep only (§5: "a wall-clock hint used by
    /// the Hub only for status labeling"; actual timeout enforcement is the
    /// Tick Loop's `wait_tick_counters`).
    pub fn sweep_timed_out(&mut self, now: f64) {
        for conv in self.conversations.values_mut() {
            if conv.status == ConversationStatus::Waiting {
                if let Some(deadline) = conv.expected_response_by {
                    if now > deadline {
                        conv.status = ConversationStatus::TimedOut;
                    }
                }
            }
        }
    }
}

impl Default for CommunicationHub {
    fn default() -> Self {
        Self::new()
    }
}
