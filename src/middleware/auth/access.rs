//! Request authenticator: bearer token → `AuthCtx` in request extensions.
//!
//! - No `Authorization` header, or one without the `Bearer ` prefix: the request
//!   continues anonymously and the gate decides whether that is acceptable.
//! - A bearer token that fails to decode stops the request here with 401 and
//!   `{error, message}`; neither the gate nor the handler runs.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Token part of `Authorization: Bearer <token>`, if the header has that shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let decoded = bearer_token(req.headers()).map(|token| state.tokens.decode(token, Utc::now()));

    match decoded {
        None => {}
        Some(Ok(principal)) => {
            tracing::debug!(subject = %principal.subject(), "access token accepted");
            req.extensions_mut().insert(AuthCtx::new(principal));
        }
        Some(Err(err)) => {
            tracing::warn!(
                kind = err.kind(),
                method = %req.method(),
                path = %req.uri().path(),
                "access token rejected"
            );
            return Err(err.into());
        }
    }

    Ok(next.run(req).await)
}
