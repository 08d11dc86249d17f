use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::chat::{Participant, ParticipantRegistry};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
}

/// POST /participants
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let id = ParticipantRegistry::register(state.storage.as_ref(), &req.name).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

/// GET /participants
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Participant>>, AppError> {
    let participants = ParticipantRegistry::list(state.storage.as_ref()).await?;
    Ok(Json(participants))
}

/// POST /status (requester in the User header)
pub async fn status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let requester = requester(&headers)?;
    ParticipantRegistry::touch(state.storage.as_ref(), &requester).await?;
    Ok(StatusCode::OK)
}

/// Caller identity travels in the User header; there are no sessions.
pub(crate) fn requester(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get("User")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
        .ok_or_else(|| AppError::Validation(vec!["User header is required".to_string()]))
}
