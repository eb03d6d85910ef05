/*
 * Responsibility
 * - The request-scoped identity context seen by the gate and by handlers
 * - Inserted into request extensions by the request authenticator, at most once per request
 */
use crate::services::auth::Principal;

/// Identity attached to an authenticated request.
///
/// Lives in the request's extensions and is dropped with the request, so it is
/// never visible to any other in-flight request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub principal: Principal,
}

impl AuthCtx {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn subject(&self) -> &str {
        self.principal.subject()
    }
}
