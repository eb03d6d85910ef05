//! Two-stage auth pipeline applied to every route except `/login`.
//!
//! 1. `access::authenticate`: verifies a bearer token and fills `AuthCtx`
//! 2. `authorize::authorize`: checks `AuthCtx` against the route policy table
//!
//! ```ignore
//! let router = api::routes();
//! let router = middleware::auth::apply(router, state.clone());
//! let router = router.merge(api::login_routes());
//! ```

pub mod access;
pub mod authorize;

use axum::{Router, middleware};

use crate::state::AppState;

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // The last layer added runs first: authenticate, then authorize, then the handler.
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authorize::authorize,
        ))
        .layer(middleware::from_fn_with_state(state, access::authenticate))
}
