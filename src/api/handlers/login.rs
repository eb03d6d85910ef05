/*
 * Responsibility
 * - POST /login: credentials in, signed bearer token out
 * - An unreadable body is a failed login (401), never a 4xx that hints at the payload shape
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use tracing::warn;

use crate::api::dto::login::{LoginRequest, LoginResponse};
use crate::error::AppError;
use crate::middleware::auth::access::BEARER_PREFIX;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(|rejection| {
        warn!(error = %rejection, "unreadable login request");
        AppError::AuthenticationFailed
    })?;

    let issued = state.login.authenticate(&req.username, &req.password).await?;

    let bearer = HeaderValue::from_str(&format!("{BEARER_PREFIX}{}", issued.token))
        .map_err(|_| AppError::Internal)?;
    let username = issued.principal.subject().to_string();

    let body = LoginResponse {
        message: format!("Hello {username}, you have logged in successfully"),
        token: issued.token,
        username,
    };

    Ok((StatusCode::OK, [(header::AUTHORIZATION, bearer)], Json(body)))
}
