use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::api::participants::requester;
use crate::api::state::AppState;
use crate::chat::{Message, MessageKind, MessageStore};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct MessagePayload {
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// POST /messages
pub async fn send(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<MessagePayload>,
) -> Result<StatusCode, AppError> {
    let from = requester(&headers)?;
    MessageStore::send(state.storage.as_ref(), &from, &req.to, &req.text, req.kind).await?;
    Ok(StatusCode::CREATED)
}

/// GET /messages?limit=N
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let requester = requester(&headers)?;
    // A limit that does not parse as an integer means "no limit".
    let limit = query.limit.as_deref().and_then(|raw| raw.parse::<i64>().ok());
    let messages = MessageStore::list(state.storage.as_ref(), &requester, limit).await?;
    Ok(Json(messages))
}

/// DELETE /messages/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let requester = requester(&headers)?;
    MessageStore::remove(state.storage.as_ref(), &id, &requester).await?;
    Ok(StatusCode::OK)
}

/// PUT /messages/{id}
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<MessagePayload>,
) -> Result<StatusCode, AppError> {
    let requester = requester(&headers)?;
    MessageStore::edit(
        state.storage.as_ref(),
        &id,
        &requester,
        &req.to,
        &req.text,
        req.kind,
    )
    .await?;
    Ok(StatusCode::OK)
}
