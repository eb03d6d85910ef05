/*
 * Responsibility
 * - URL layout of the service
 * - Who may call what is decided by services::auth::policy, not by the routes themselves
 * - /login sits outside the auth pipeline: a stale bearer header must not block a fresh login
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{
    health::health,
    login::login,
    products::{create_product, delete_product, get_product, list_products, update_product},
    users::{create_user, list_users, register_user},
};
use crate::state::AppState;

/// Routes behind the request authenticator and the authorization gate.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/register", post(register_user))
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// Credential exchange, mounted without the auth pipeline.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}
