/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse: HTTP status + flat JSON body `{error, message}`
 * - Conversions from token / repo / hashing errors
 */
use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::password::PasswordHashError;
use crate::services::auth::policy::AccessDenied;
use crate::services::auth::token_codec::TokenError;

/// Field name -> human-readable problem.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad credentials at login. Never says which half was wrong.
    #[error("authentication failed: invalid username or password")]
    AuthenticationFailed,
    #[error("the access token was rejected: {0}")]
    Token(#[from] TokenError),
    #[error("authentication is required to access this resource")]
    Unauthenticated,
    #[error("access to this resource is denied")]
    Forbidden,
    #[error("request validation failed")]
    Validation(FieldErrors),
    #[error("{resource} not found")]
    NotFound { resource: &'static str },
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("the request did not complete in time")]
    Timeout,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::AuthenticationFailed => "AuthenticationFailed",
            AppError::Token(e) => e.kind(),
            AppError::Unauthenticated => "Unauthenticated",
            AppError::Forbidden => "Forbidden",
            AppError::Validation(_) => "ValidationFailed",
            AppError::NotFound { .. } => "NotFound",
            AppError::Conflict(_) => "Conflict",
            AppError::Timeout => "Timeout",
            AppError::Internal => "Internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::AuthenticationFailed | AppError::Token(_) | AppError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// RFC 6750 challenge sent with every 401.
    fn challenge(&self) -> Option<HeaderValue> {
        match self {
            AppError::Token(_) => Some(HeaderValue::from_static(
                r#"Bearer error="invalid_token""#,
            )),
            AppError::AuthenticationFailed | AppError::Unauthenticated => {
                Some(HeaderValue::from_static("Bearer"))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = self.challenge();
        let error = self.kind();
        let message = self.to_string();

        let fields = match self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            error,
            message,
            fields,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(challenge) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, challenge);
        }
        response
    }
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => AppError::Unauthenticated,
            AccessDenied::Forbidden => AppError::Forbidden,
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(what) => AppError::Conflict(what),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(FieldErrors::from([(
            "body".to_string(),
            rejection.body_text(),
        )]))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(FieldErrors::from([(
            "path".to_string(),
            rejection.body_text(),
        )]))
    }
}

impl From<PasswordHashError> for AppError {
    fn from(e: PasswordHashError) -> Self {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Internal
    }
}
