//! dataplan LLM
//!
//! Model-call boundary for the planner:
//! - `LlmProvider` - prompt in, completion text out
//! - `OllamaProvider` - local inference through ollama-rs
//!
//! Also includes the HTTP client factory.

pub mod http_client;
pub mod ollama;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::build_http_client;
pub use ollama::OllamaProvider;
pub use provider::LlmProvider;
pub use types::*;
