/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Cheap to Clone: every member is behind an Arc
 * - Only immutable or internally synchronised values live here; per-request identity
 *   goes in request extensions, never in AppState
 */
use std::sync::Arc;

use crate::repos::{ProductStore, UserStore};
use crate::services::auth::{LoginService, PasswordHasher, RoutePolicy, TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenCodec>,
    pub login: Arc<LoginService>,
    pub policy: Arc<RoutePolicy>,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub passwords: Arc<dyn PasswordHasher>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
