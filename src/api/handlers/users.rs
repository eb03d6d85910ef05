/*
 * Responsibility
 * - /api/users handlers: list, admin create, self-registration
 * - Access rules live in the route policy table, not here
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::{
        dto::users::{CreateUserRequest, UserResponse},
        extractors::ApiJson,
    },
    error::AppError,
    services::accounts,
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = state.users.list().await?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    create(&state, req).await
}

/// Self-service sign-up: never grants `ROLE_ADMIN`, whatever the body says.
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(mut req): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.admin = false;
    create(&state, req).await
}

async fn create(
    state: &AppState,
    req: CreateUserRequest,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let mut errors = req.validate().err().unwrap_or_default();

    if !errors.contains_key("username") && state.users.exists_by_username(&req.username).await? {
        errors.insert(
            "username".into(),
            format!("field username: {} already exists", req.username),
        );
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let row = accounts::create_account(
        state.users.as_ref(),
        state.passwords.clone(),
        &req.username,
        &req.password,
        req.admin,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}
