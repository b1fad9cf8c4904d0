use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("advisor configuration error: {0}")]
    Config(String),
    #[error("advisor request failed: {0}")]
    Request(String),
}

pub type LlmResult<T> = Result<T, LlmError>;
