//! Note endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use super::auth::AuthUser;
use super::error::ApiResult;
use super::{AppState, Message};
use crate::model::note::{Note, NoteId, NoteInput};
use crate::model::task::TaskId;
use crate::telemetry::metrics;

pub async fn list(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<Note>>> {
    let task = TaskId::parse(&task_id)?;
    Ok(Json(state.notes.list_notes(owner, task).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(task_id): Path<String>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Note>)> {
    let task = TaskId::parse(&task_id)?;
    let Json(input) = body?;
    let note = state.notes.insert_note(owner, task, input.validate()?).await?;
    metrics::notes_created().add(1, &[]);
    info!(note = %note.id, task = %task, "note created");
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    let id = NoteId::parse(&id)?;
    state.notes.delete_note(owner, id).await?;
    Ok(Json(Message::new("Successful")))
}
