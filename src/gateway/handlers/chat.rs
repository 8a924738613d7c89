use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::context::truncate_history;
use crate::format::{clean_reply, format_reply, SYSTEM_PROMPT};
use crate::models::ChatMessage;
use crate::usage::UsageTracker;

use super::super::AppState;

/// Request body for `POST /get_response`.
#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    message: String,
    #[serde(default)]
    chat_history: Vec<ChatMessage>,
}

/// `POST /get_response` — forward one user message to the model.
///
/// The prior history is truncated to the token budget, the fixed system
/// prompt and the new user turn are added around it, and the reply is
/// cleaned and formatted for display. Any backend failure collapses to
/// a generic 500.
pub(crate) async fn get_response(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> impl IntoResponse {
    let suffix = truncate_history(&body.chat_history, state.budget.history_tokens());

    let mut messages = Vec::with_capacity(suffix.len() + 2);
    messages.push(ChatMessage::new("system", SYSTEM_PROMPT));
    messages.extend_from_slice(suffix);
    messages.push(ChatMessage::new("user", body.message));

    let completion = match state.backend.complete(&messages).await {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "completion request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "completion request failed" })),
            )
                .into_response();
        }
    };

    let raw_message = clean_reply(&completion.reply);
    let formatted = format_reply(&raw_message);

    let tokens_used = completion
        .usage
        .map(|u| u.total_tokens)
        .unwrap_or_default();
    let total = state.usage.add(tokens_used);
    let token_cost = UsageTracker::cost_of(tokens_used);

    info!(tokens_used, total, "chat exchange completed");

    Json(serde_json::json!({
        "message": formatted,
        "raw_message": raw_message,
        "tokens_used": tokens_used,
        "token_cost": token_cost,
    }))
    .into_response()
}
