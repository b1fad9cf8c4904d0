//! `LlmAdvisor` implementations (§6): a deterministic fallback with no
//! network dependency, and an HTTP-backed advisor behind the `http` feature.
//!
//! | Module | Responsibility |
//! |---|---|
//! | `fallback` | `FallbackAdvisor` — deterministic, no I/O |
//! | `http` | `HttpAdvisor` — OpenRouter chat-completions client (feature `http`) |
//! | `error` | `LlmError`/`LlmResult` |
//!
//! Both implementations satisfy `bdi_agent::advisor::LlmAdvisor`, defined in
//! the consumer crate to avoid a dependency cycle: `bdi-llm` depends on
//! `bdi-agent`, never the reverse.

pub mod error;
pub mod fallback;

#[cfg(feature = "http")]
pub mod http;


pub use error::{LlmError, LlmResult};
pub use fallback::FallbackAdvisor;

#[cfg(feature = "http")]
pub use http::HttpAdvisor;
