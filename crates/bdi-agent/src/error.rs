use thiserror::Error;

use bdi_core::{AgentId, DesireId, IntentionId};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),
    #[error("desire not found: {0}")]
    DesireNotFound(DesireId),
    #[error("intention not found: {0}")]
    IntentionNotFound(IntentionId),
    #[error("core error: {0}")]
    Core(#[from] bdi_core::CoreError),
}

pub type AgentResult<T> = Result<T, AgentError>;
