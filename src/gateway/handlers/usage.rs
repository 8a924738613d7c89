use axum::{extract::State, response::IntoResponse, Json};

use super::super::AppState;

/// `GET /get_total_tokens_used` — cumulative tokens and derived cost.
pub(crate) async fn get_total_tokens_used(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "total_tokens_used": state.usage.total_tokens(),
        "total_cost": state.usage.total_cost(),
    }))
}
