use thiserror::Error;

use bdi_core::{AgentId, ConversationId};

#[derive(Debug, Error)]
pub enum CommError {
    #[error("agent not registered: {0}")]
    AgentNotRegistered(AgentId),
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),
    #[error("agent {0} is not a participant in conversation {1}")]
    NotAParticipant(AgentId, ConversationId),
}

pub type CommResult<T> = Result<T, CommError>;
