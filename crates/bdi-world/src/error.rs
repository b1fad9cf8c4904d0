use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("world configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("agent error: {0}")]
    Agent(#[from] bdi_agent::AgentError),

    #[error("communication error: {0}")]
    Comm(#[from] bdi_comm::CommError),
}

pub type WorldResult<T> = Result<T, WorldError>;
