//! Task endpoints. Every handler is scoped to the authenticated owner.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use opentelemetry::KeyValue;
use serde::Serialize;
use tracing::{Instrument, info};

use super::auth::AuthUser;
use super::error::{ApiError, ApiResult};
use super::{AppState, Message};
use crate::engine::completion::{Completion, complete_task};
use crate::error::Error;
use crate::model::task::{Task, TaskId, TaskInput};
use crate::telemetry::metrics;
use crate::telemetry::task::{record_transition, start_completion_span};

pub async fn list(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list_tasks(owner).await?))
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let Json(input) = body?;
    let task = state.tasks.insert_task(owner, input.validate()?).await?;
    metrics::tasks_created().add(1, &[]);
    info!(task = %task.id, owner = %owner, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let id = TaskId::parse(&id)?;
    Ok(Json(state.tasks.find_task(owner, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = TaskId::parse(&id)?;
    let Json(input) = body?;
    let task = state.tasks.update_task(owner, id, input.validate()?).await?;
    Ok(Json(task))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    let id = TaskId::parse(&id)?;
    state.tasks.delete_task(owner, id).await?;
    info!(task = %id, owner = %owner, "task deleted");
    Ok(Json(Message::new("Successful")))
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub message: &'static str,
    pub completion: Completion,
    pub task: Task,
}

pub async fn complete(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CompleteResponse>> {
    let id = TaskId::parse(&id)?;
    let span = start_completion_span(owner, id);

    let result = complete_task(
        state.schedule.as_ref(),
        state.tasks.as_ref(),
        owner,
        id,
        Utc::now(),
    )
    .instrument(span.clone())
    .await;

    let (task, completion) = match result {
        Ok(done) => done,
        Err(e) => {
            metrics::task_completions().add(1, &[KeyValue::new("outcome", "rejected")]);
            if matches!(e, Error::DataIntegrity(_)) {
                span.in_scope(|| {
                    tracing::error!(task = %id, error = %e, "task points at a missing stage")
                });
            }
            return Err(ApiError(e));
        }
    };

    metrics::task_completions().add(1, &[KeyValue::new("outcome", completion.label())]);
    let message = match completion {
        Completion::Advanced { .. } => {
            record_transition(&span, "open", "advanced");
            "Successful"
        }
        Completion::Finished { .. } => {
            record_transition(&span, "open", "completed");
            "Task is completed successfully."
        }
    };

    Ok(Json(CompleteResponse {
        message,
        completion,
        task,
    }))
}
