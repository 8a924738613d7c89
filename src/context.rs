//! Token estimation and history truncation.
//!
//! Keeps the chat history sent upstream within the model's context
//! window: the newest messages are kept, oldest are dropped, computed
//! back-to-front against a token budget.

use crate::models::ChatMessage;
use tiktoken_rs::cl100k_base;
use tiktoken_rs::CoreBPE;
use tracing::debug;

// ---------------------------------------------------------------------------
// Token estimation
// ---------------------------------------------------------------------------

/// Tokens charged per message on top of its text (role framing etc.).
const MESSAGE_OVERHEAD: usize = 4;

/// Cached BPE tokenizer — created once, reused on every call.
fn bpe() -> &'static CoreBPE {
    use std::sync::OnceLock;
    static BPE: OnceLock<CoreBPE> = OnceLock::new();
    BPE.get_or_init(|| cl100k_base().expect("failed to load cl100k_base tokeniser"))
}

/// Token count for a single string using the cl100k_base BPE encoding
/// (GPT-4 / GPT-3.5 family).
pub fn estimate_tokens(text: &str) -> usize {
    bpe().encode_with_special_tokens(text).len()
}

/// Token cost of one message: content + role + per-message overhead.
pub fn message_tokens(msg: &ChatMessage) -> usize {
    let enc = bpe();
    enc.encode_with_special_tokens(&msg.content).len()
        + enc.encode_with_special_tokens(&msg.role).len()
        + MESSAGE_OVERHEAD
}

/// Total estimated tokens for a slice of messages.
pub fn estimate_total(messages: &[ChatMessage]) -> usize {
    messages.iter().map(message_tokens).sum()
}

// ---------------------------------------------------------------------------
// History budget
// ---------------------------------------------------------------------------

/// Token budget for the history portion of a request.
///
/// The history suffix must fit in the context window minus a fixed
/// reservation for the new user turn and the generated reply.
#[derive(Debug, Clone, Copy)]
pub struct HistoryBudget {
    /// The model's full context window in tokens.
    pub context_window: usize,
    /// Tokens held back for the new user message and the response.
    pub reserved_for_exchange: usize,
}

impl Default for HistoryBudget {
    fn default() -> Self {
        Self {
            context_window: 4096,
            reserved_for_exchange: 150,
        }
    }
}

impl HistoryBudget {
    /// Tokens available for prior history.
    pub fn history_tokens(&self) -> usize {
        self.context_window.saturating_sub(self.reserved_for_exchange)
    }
}

// ---------------------------------------------------------------------------
// Truncation
// ---------------------------------------------------------------------------

/// Return the longest suffix of `history` whose summed token count fits
/// within `budget` tokens.
///
/// Walks from the most recent message backward, accumulating costs, and
/// stops at the first message that would overflow. The result borrows
/// from the input, preserving the original (chronological) order.
/// Empty history yields an empty suffix.
pub fn truncate_history(history: &[ChatMessage], budget: usize) -> &[ChatMessage] {
    let mut total = 0usize;
    let mut start = history.len();

    for (idx, msg) in history.iter().enumerate().rev() {
        let cost = message_tokens(msg);
        if total + cost > budget {
            break;
        }
        total += cost;
        start = idx;
    }

    if start > 0 {
        debug!(
            dropped = start,
            kept = history.len() - start,
            tokens = total,
            "history truncated"
        );
    }

    &history[start..]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> ChatMessage {
        ChatMessage::new(role, content)
    }

    #[test]
    fn estimate_tokens_basic() {
        // Real BPE tokenisation — "hello" is a single token.
        let t = estimate_tokens("hello");
        assert!(t >= 1 && t <= 3, "expected 1–3 tokens for 'hello', got {t}");
        let t0 = estimate_tokens("");
        assert!(t0 <= 1, "expected 0–1 tokens for empty string, got {t0}");
    }

    #[test]
    fn message_tokens_includes_overhead() {
        let m = msg("user", "hi");
        assert!(message_tokens(&m) > estimate_tokens("hi"));
    }

    #[test]
    fn truncate_empty_history() {
        let out = truncate_history(&[], 1000);
        assert!(out.is_empty());
    }

    #[test]
    fn truncate_keeps_all_when_under_budget() {
        let history = vec![msg("user", "one"), msg("assistant", "two")];
        let out = truncate_history(&history, 10_000);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "one");
    }

    #[test]
    fn truncate_drops_oldest_first() {
        let history = vec![
            msg("user", &"old ".repeat(200)),
            msg("assistant", "middle"),
            msg("user", "newest"),
        ];
        let budget = message_tokens(&history[1]) + message_tokens(&history[2]);
        let out = truncate_history(&history, budget);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "middle");
        assert_eq!(out[1].content, "newest");
    }

    #[test]
    fn truncate_never_exceeds_budget() {
        let history: Vec<ChatMessage> = (0..20)
            .map(|i| msg("user", &format!("message number {i} with some padding text")))
            .collect();

        for budget in [0, 10, 50, 100, 500] {
            let out = truncate_history(&history, budget);
            assert!(
                estimate_total(out) <= budget,
                "suffix exceeds budget {budget}"
            );
        }
    }

    #[test]
    fn truncate_returns_contiguous_suffix() {
        let history: Vec<ChatMessage> =
            (0..10).map(|i| msg("user", &format!("msg-{i}"))).collect();
        let out = truncate_history(&history, 60);
        let start = history.len() - out.len();
        for (a, b) in out.iter().zip(&history[start..]) {
            assert_eq!(a.content, b.content);
        }
    }

    #[test]
    fn truncate_zero_budget_drops_everything() {
        let history = vec![msg("user", "hello")];
        assert!(truncate_history(&history, 0).is_empty());
    }

    #[test]
    fn default_budget_values() {
        let b = HistoryBudget::default();
        assert_eq!(b.history_tokens(), 4096 - 150);
        assert!(b.reserved_for_exchange < b.context_window);
    }
}
