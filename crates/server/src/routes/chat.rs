use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use outfitter_agent::TurnOutcome;
use outfitter_core::{AgentResponse, SessionId, SuspensionRequest};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    pub session_id: String,
}

/// A turn's caller-facing result: always a well-formed final response or a
/// well-formed confirmation payload, stamped with the session id so fresh
/// sessions learn theirs.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Final {
        session_id: String,
        #[serde(flatten)]
        response: AgentResponse,
    },
    Suspended {
        session_id: String,
        #[serde(flatten)]
        suspension: SuspensionRequest,
    },
}

#[derive(Debug, Serialize)]
pub struct ClearReply {
    pub session_id: String,
    pub cleared: bool,
}

/// Primary chat endpoint. Accepts `{ "message": "...", "session_id": "uuid" }`;
/// a missing or empty session id starts a fresh session.
pub async fn chat_message(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .map(SessionId)
        .unwrap_or_else(SessionId::generate);

    let correlation_id = Uuid::new_v4().to_string();

    match state.runtime.submit(&session_id, &request.message).await {
        Ok(TurnOutcome::Final(response)) => {
            Ok(Json(ChatReply::Final { session_id: session_id.0, response }))
        }
        Ok(TurnOutcome::Suspended(suspension)) => {
            Ok(Json(ChatReply::Suspended { session_id: session_id.0, suspension }))
        }
        Err(error) => {
            tracing::error!(
                event_name = "server.chat.turn_failed",
                correlation_id = %correlation_id,
                session_id = %session_id.0,
                error = %error,
                "turn failed"
            );
            Err(ApiError::from(error.into_interface(correlation_id)))
        }
    }
}

pub async fn clear_session(
    State(state): State<AppState>,
    Json(request): Json<ClearRequest>,
) -> Result<Json<ClearReply>, ApiError> {
    let session_id = SessionId(request.session_id);
    let correlation_id = Uuid::new_v4().to_string();

    state
        .runtime
        .clear(&session_id)
        .await
        .map_err(|error| ApiError::from(error.into_interface(correlation_id)))?;

    Ok(Json(ClearReply { session_id: session_id.0, cleared: true }))
}
