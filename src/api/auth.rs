//! Registration, login, and the authenticated-owner extractor.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{info, warn};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::auth::{self, BasicCredentials};
use crate::error::Error;
use crate::model::user::{Registration, User, UserId};
use crate::telemetry::metrics;

/// The authenticated owner of the request, resolved from Basic credentials.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let creds = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(BasicCredentials::parse)
            .ok_or(Error::Unauthorized)?;

        match auth::authenticate(state.users.as_ref(), &creds.username, &creds.password).await {
            Ok(id) => Ok(AuthUser(id)),
            Err(Error::Unauthorized) => {
                metrics::auth_failures().add(1, &[]);
                warn!(path = %parts.uri.path(), "rejected credentials");
                Err(Error::Unauthorized.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(registration) = body?;
    let user = auth::register(state.users.as_ref(), registration.validate()?).await?;
    info!(user = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<bool>> {
    let Json(req) = body?;
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(Error::Validation("missing fields: email, password".into()).into());
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::Validation("missing fields: email, password".into()).into());
    }
    match auth::authenticate(state.users.as_ref(), &email, &password).await {
        Ok(_) => Ok(Json(true)),
        Err(Error::Unauthorized) => {
            metrics::auth_failures().add(1, &[]);
            Err(Error::Unauthorized.into())
        }
        Err(e) => Err(e.into()),
    }
}
