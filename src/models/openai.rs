//! OpenAI chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{parse_token_usage, ChatMessage, Completion, CompletionBackend};

/// Default endpoint for OpenAI chat completions.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Maximum tokens requested for the generated reply.
pub const MAX_RESPONSE_TOKENS: u32 = 150;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.5;

/// Backend that talks to the OpenAI chat completions API.
pub struct OpenAiBackend {
    api_key: String,
    endpoint: String,
    client: Client,
    /// Model name sent in the request body (e.g. "gpt-4").
    model: String,
}

impl OpenAiBackend {
    /// Create a backend from the environment.
    ///
    /// Reads `OPENAI_API_KEY`; errors when the variable is missing so
    /// startup fails fast rather than the first request.
    pub fn from_env(model: impl Into<String>) -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY must be set"))?;
        Ok(Self::with_config(api_key, DEFAULT_ENDPOINT.to_string(), model))
    }

    /// Create a backend with explicit configuration (useful for tests
    /// or non-default endpoints).
    pub fn with_config(api_key: String, endpoint: String, model: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint,
            client: Client::builder()
                .timeout(Duration::from_secs(90))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
            model: model.into(),
        }
    }

    /// Model name this backend sends upstream.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    /// Send chat messages to the completions endpoint and return the
    /// first choice's content plus reported usage.
    ///
    /// Generation parameters are fixed: `max_tokens`, single choice, no
    /// stop sequences, temperature 0.5.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Completion, anyhow::Error> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": MAX_RESPONSE_TOKENS,
            "n": 1,
            "stop": null,
            "temperature": TEMPERATURE,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("completions API returned {status}: {text}");
        }

        let json: serde_json::Value = resp.json().await?;
        let usage = parse_token_usage(&json);

        // Extract the assistant reply from the first choice.
        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();

        Ok(Completion { reply, usage })
    }
}
