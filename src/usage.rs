//! Cumulative token usage and cost tracking.
//!
//! One [`UsageTracker`] lives in the server state for the process
//! lifetime; nothing is persisted across restarts.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Dollar price of a single token (gpt-4 completion pricing).
pub const PRICE_PER_TOKEN: f64 = 0.000_06;

/// Process-lifetime counter of tokens consumed across all requests.
#[derive(Debug, Default)]
pub struct UsageTracker {
    total: AtomicU64,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response's reported token count; returns the new total.
    pub fn add(&self, tokens: u64) -> u64 {
        let total = self.total.fetch_add(tokens, Ordering::Relaxed) + tokens;
        debug!(tokens, total, "usage recorded");
        total
    }

    /// Total tokens consumed so far.
    pub fn total_tokens(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Dollar cost of `tokens` at the fixed per-token price.
    pub fn cost_of(tokens: u64) -> f64 {
        tokens as f64 * PRICE_PER_TOKEN
    }

    /// Dollar cost of everything consumed so far.
    pub fn total_cost(&self) -> f64 {
        Self::cost_of(self.total_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let t = UsageTracker::new();
        assert_eq!(t.total_tokens(), 0);
        assert_eq!(t.total_cost(), 0.0);
    }

    #[test]
    fn accumulates_across_adds() {
        let t = UsageTracker::new();
        t.add(100);
        t.add(50);
        t.add(0);
        assert_eq!(t.total_tokens(), 150);
    }

    #[test]
    fn add_returns_running_total() {
        let t = UsageTracker::new();
        assert_eq!(t.add(10), 10);
        assert_eq!(t.add(5), 15);
    }

    #[test]
    fn cost_is_price_times_tokens() {
        assert!((UsageTracker::cost_of(1000) - 0.06).abs() < 1e-12);
        let t = UsageTracker::new();
        t.add(2000);
        assert!((t.total_cost() - 0.12).abs() < 1e-12);
    }
}
