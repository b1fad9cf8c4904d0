//! A structured message exchanged between two agents (§3).

use bdi_core::{AgentId, ConversationId, MessageId};

/// Closed set of message roles in the greeting/answer/farewell dialogue
/// protocol. Kept independent of `bdi_agent::ReactiveMessageKind` — `bdi-comm`
/// sits above `bdi-agent` in the dependency order, so `bdi-world` maps
/// between the two rather than either crate depending on the other's type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MessageType {
    Greeting,
    Question,
    Answer,
    Statement,
    Farewell,
    Ack,
}

/// One message, as stored by the Hub and drained into an agent's perception
/// stream. `delivered_at`/`read_at` are Unix seconds, stamped by the Hub at
/// send/drain time respectively.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub id: MessageId,
    pub sender_id: AgentId,
    pub receiver_id: AgentId,
    pub content: String,
    pub message_type: MessageType,
    pub conversation_id: Option<ConversationId>,
    pub in_reply_to: Option<MessageId>,
    pub topic: Option<String>,
    pub tone: Option<String>,
    pub requires_response: bool,
    pub response_timeout: f64,
    pub timestamp: f64,
    pub delivered_at: Option<f64>,
    pub read_at: Option<f64>,
}

#[allow(clippy::too_many_arguments)]
impl Message {
    pub fn new(
        id: MessageId,
        sender_id: AgentId,
        receiver_id: AgentId,
        content: impl Into<String>,
        message_type: MessageType,
        conversation_id: Option<ConversationId>,
        in_reply_to: Option<MessageId>,
        topic: Option<String>,
        tone: Option<String>,
        requires_response: bool,
        response_timeout: f64,
        timestamp: f64,
    ) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            content: content.into(),
            message_type,
            conversation_id,
            in_reply_to,
            topic,
            tone,
            requires_response,
            response_timeout,
            timestamp,
            delivered_at: None,
            read_at: None,
        }
    }
}
