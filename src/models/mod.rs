//! Completion backend abstraction.
//!
//! Defines the [`ChatMessage`] type, the [`CompletionBackend`] trait,
//! and token-usage parsing shared by concrete backends.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiBackend;

// ---------------------------------------------------------------------------
// ChatMessage – shared message representation
// ---------------------------------------------------------------------------

/// A single chat message with a role and content.
///
/// Serialises directly to the wire shape the completions API expects
/// (`{"role": …, "content": …}`), which is also the on-disk shape used
/// by the chat store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Token usage
// ---------------------------------------------------------------------------

/// Token usage statistics reported by the API.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Extract token usage statistics from a completions response JSON.
pub fn parse_token_usage(json: &serde_json::Value) -> Option<TokenUsage> {
    let usage = json.get("usage")?;
    Some(TokenUsage {
        prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0),
        completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0),
        total_tokens: usage["total_tokens"].as_u64().unwrap_or(0),
    })
}

// ---------------------------------------------------------------------------
// CompletionBackend trait
// ---------------------------------------------------------------------------

/// One completed exchange: the assistant's reply plus the usage the API
/// reported for it (absent when the backend did not return a `usage`
/// object).
#[derive(Debug, Clone)]
pub struct Completion {
    pub reply: String,
    pub usage: Option<TokenUsage>,
}

/// Trait implemented by every completions backend.
///
/// A backend turns a list of chat messages into a single assistant
/// reply. The call blocks (awaits) for the full round trip; there is no
/// streaming and no retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a sequence of chat messages and return the completed reply.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, anyhow::Error>;
}
