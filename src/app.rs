/*
 * Responsibility
 * - Config → dependencies → Router assembly
 * - Middleware order: transport (request-id, trace, limits) → CORS → authenticate → authorize
 *   (/login skips authenticate and authorize)
 * - axum::serve() start-up
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result, anyhow};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{Config, SeedUser};
use crate::middleware;
use crate::repos::{InMemoryProductStore, InMemoryUserStore, UserStore};
use crate::services::accounts;
use crate::services::auth::{
    Argon2PasswordHasher, LoginService, PasswordHasher, SecretKey, StoreCredentialVerifier,
    TokenCodec, default_route_policy,
};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,crud_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds every process-level service once and wires them into `AppState`.
///
/// A fresh signing key is generated on each call, so tokens issued by a
/// previous process (or a previous state) are rejected as forged.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let key = SecretKey::generate().map_err(|e| anyhow!("generate token signing key: {e}"))?;
    let tokens = Arc::new(TokenCodec::new(&key));

    let passwords: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::new(config.password_hash)?);
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());

    if let Some(seed) = &config.admin_seed {
        seed_admin(users.as_ref(), passwords.clone(), seed).await?;
    }

    let verifier = Arc::new(StoreCredentialVerifier::new(users.clone(), passwords.clone())?);
    let login = Arc::new(LoginService::new(verifier, tokens.clone()));
    let policy = Arc::new(default_route_policy()?);

    Ok(AppState {
        tokens,
        login,
        policy,
        users,
        products: Arc::new(InMemoryProductStore::new()),
        passwords,
    })
}

async fn seed_admin(
    users: &dyn UserStore,
    passwords: Arc<dyn PasswordHasher>,
    seed: &SeedUser,
) -> Result<()> {
    accounts::create_account(users, passwords, &seed.username, &seed.password, true)
        .await
        .map_err(|e| anyhow!("seed admin account {}: {e}", seed.username))?;

    tracing::info!(username = %seed.username, "admin account seeded");
    Ok(())
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::apply(api::routes(), state.clone());
    // merged after the auth layers so they do not wrap /login
    let router = router.merge(api::login_routes()).with_state(state);
    let router = middleware::cors::apply(router, config);

    middleware::http::apply(router, config)
}
