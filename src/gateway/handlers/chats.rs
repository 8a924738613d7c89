use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use tracing::{error, info};

use crate::models::ChatMessage;
use crate::store::validate_chat_id;

use super::super::AppState;

/// Request body for `POST /save_chat`.
#[derive(Deserialize)]
pub(crate) struct SaveChatRequest {
    chat_data: Vec<ChatMessage>,
    /// Optional caller-supplied identifier; a timestamp-derived one is
    /// generated when absent.
    #[serde(default)]
    file_name: Option<String>,
}

/// Request body for `POST /load_chat`.
#[derive(Deserialize)]
pub(crate) struct LoadChatRequest {
    file_name: String,
}

/// `POST /save_chat` — persist a transcript, overwriting any previous
/// file with the same identifier.
pub(crate) async fn save_chat(
    State(state): State<AppState>,
    Json(body): Json<SaveChatRequest>,
) -> impl IntoResponse {
    let file_name = body
        .file_name
        .unwrap_or_else(|| format!("chat_{}", chrono::Utc::now().timestamp()));

    if let Err(e) = validate_chat_id(&file_name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("{e}") })),
        )
            .into_response();
    }

    match state.store.save(&file_name, &body.chat_data).await {
        Ok(()) => {
            info!(%file_name, messages = body.chat_data.len(), "chat saved");
            Json(serde_json::json!({ "status": "success", "file_name": file_name }))
                .into_response()
        }
        Err(e) => {
            error!(error = %e, %file_name, "chat save failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to save chat" })),
            )
                .into_response()
        }
    }
}

/// `GET /get_saved_chats` — all persisted transcripts keyed by id.
pub(crate) async fn get_saved_chats(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.list().await {
        Ok(chats) => Json(serde_json::json!({ "saved_chats": chats })).into_response(),
        Err(e) => {
            error!(error = %e, "chat listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to list chats" })),
            )
                .into_response()
        }
    }
}

/// `POST /load_chat` — fetch one transcript; missing ids are a
/// not-found indicator, never a fault.
pub(crate) async fn load_chat(
    State(state): State<AppState>,
    Json(body): Json<LoadChatRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_chat_id(&body.file_name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": format!("{e}") })),
        )
            .into_response();
    }

    match state.store.load(&body.file_name).await {
        Ok(Some(messages)) => Json(serde_json::json!({
            "file_name": body.file_name,
            "chat_data": messages,
        }))
        .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "status": "not_found",
                "file_name": body.file_name,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, file_name = %body.file_name, "chat load failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "failed to load chat" })),
            )
                .into_response()
        }
    }
}
