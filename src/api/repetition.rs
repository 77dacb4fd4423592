use axum::Json;
use axum::extract::State;

use super::AppState;
use super::auth::AuthUser;
use super::error::ApiResult;
use crate::model::repetition::RepetitionType;

/// The catalog, ascending by order. Read-only.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
) -> ApiResult<Json<Vec<RepetitionType>>> {
    Ok(Json(state.schedule.list_stages().await?))
}
