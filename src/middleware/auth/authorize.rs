//! Authorization gate: route policy + identity context → allow / 401 / 403.
//!
//! Runs after `access::authenticate`. The 403 response never names the roles
//! the route requires.

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub async fn authorize(
    State(state): State<AppState>,
    OriginalUri(original_uri): OriginalUri,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Match on the full path even when mounted under a nested router
    let path = original_uri.path();
    let required = state.policy.policy_for(req.method(), path);
    let ctx = req.extensions().get::<AuthCtx>();

    if let Err(denied) = required.evaluate(ctx.map(|c| &c.principal)) {
        tracing::warn!(
            method = %req.method(),
            path = %path,
            subject = ctx.map(AuthCtx::subject).unwrap_or("-"),
            ?denied,
            "request denied"
        );
        return Err(denied.into());
    }

    Ok(next.run(req).await)
}
