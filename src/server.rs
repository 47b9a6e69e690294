//!
//! turfbook HTTP server
//! --------------------
//! This module defines the Axum-based HTTP API for turfbook.
//!
//! Responsibilities:
//! - Registration and login endpoints for the two actor types (users, owners),
//!   delegating to the `identity` module.
//! - Bearer-token authentication on the `/me` and turf endpoints.
//! - Owner-gated turf creation and listing with ownership filtering at read time.
//! - Store bootstrap: collection ensure-exists and a startup connectivity probe.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::{get, post}, Router, extract::{State, Path}, Form, Json};
use axum::http::{header, HeaderMap, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{self, Principal, RoleTag, TokenIssuer};
use crate::models::{LoginForm, PrincipalResponse, RegisterPayload, TokenResponse, Turf, TurfCreatePayload};
use crate::storage::SharedStore;
use crate::turfs;

/// Shared server state injected into all handlers: the store handle and the
/// token issuer, both constructed once at startup and passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub issuer: Arc<TokenIssuer>,
}

/// Start the turfbook HTTP server from environment configuration.
pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    run_with_config(config).await
}

/// Start the server with an explicit configuration: open the store, ensure
/// the collections exist, probe connectivity, and mount all routes.
pub async fn run_with_config(config: AppConfig) -> anyhow::Result<()> {
    let store = SharedStore::new(&config.db_root)?;
    for collection in ["users", "owners", turfs::COLLECTION] {
        store.create_collection(collection)?;
    }
    // Probe failure is logged, not fatal; the first request retries the store
    match store.ping() {
        Ok(()) => info!(target: "turfbook::startup", "store reachable at '{}'", config.db_root),
        Err(e) => warn!(target: "turfbook::startup", "store probe failed at '{}': {}", config.db_root, e),
    }

    let issuer = Arc::new(TokenIssuer::new(
        config.secret_key.clone(),
        config.algorithm,
        config.token_ttl_minutes,
    ));
    let app = router(AppState { store, issuer });

    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Mount all HTTP routes onto the shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/users/register", post(register_user))
        .route("/api/users/login", post(login_user))
        .route("/api/users/me", get(me_user))
        .route("/api/owners/register", post(register_owner))
        .route("/api/owners/login", post(login_owner))
        .route("/api/owners/me", get(me_owner))
        .route("/api/owners/turfs", post(create_turf).get(list_turfs))
        .route("/api/owners/turfs/{turf_id}", get(get_turf))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({"message": "Welcome to Turf Booking API"}))
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::auth("not_authenticated", "Not authenticated"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth("not_authenticated", "Not authenticated"))?;
    Ok(token.trim())
}

fn current_principal(state: &AppState, headers: &HeaderMap) -> AppResult<Principal> {
    let token = bearer_token(headers)?;
    identity::resolve(&state.store, &state.issuer, token)
}

/// Forbidden (403) on role mismatch, distinct from the 401 of resolution.
fn require_role(principal: &Principal, required: RoleTag, detail: &str) -> AppResult<()> {
    if identity::authorize(principal, required) {
        Ok(())
    } else {
        Err(AppError::forbidden("wrong_role", detail))
    }
}

async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<(StatusCode, Json<PrincipalResponse>)> {
    let principal = identity::register(&state.store, &payload, RoleTag::User)?;
    Ok((StatusCode::CREATED, Json(principal.into())))
}

async fn register_owner(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<(StatusCode, Json<PrincipalResponse>)> {
    let principal = identity::register(&state.store, &payload, RoleTag::Owner)?;
    Ok((StatusCode::CREATED, Json(principal.into())))
}

async fn login_user(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = identity::login(&state.store, &state.issuer, &form.username, &form.password, RoleTag::User)?;
    Ok(Json(TokenResponse::bearer(token)))
}

async fn login_owner(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = identity::login(&state.store, &state.issuer, &form.username, &form.password, RoleTag::Owner)?;
    Ok(Json(TokenResponse::bearer(token)))
}

async fn me_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<PrincipalResponse>> {
    let principal = current_principal(&state, &headers)?;
    require_role(&principal, RoleTag::User, "Not authorized to access this resource")?;
    Ok(Json(principal.into()))
}

async fn me_owner(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<PrincipalResponse>> {
    let principal = current_principal(&state, &headers)?;
    require_role(&principal, RoleTag::Owner, "Not authorized to access this resource")?;
    Ok(Json(principal.into()))
}

async fn create_turf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TurfCreatePayload>,
) -> AppResult<(StatusCode, Json<Turf>)> {
    let principal = current_principal(&state, &headers)?;
    require_role(&principal, RoleTag::Owner, "Only turf owners can create turfs")?;

    let turf = turfs::create(&state.store, &principal.id, payload)?;
    info!(target: "turfbook::turfs", "created turf id={} owner={}", turf.id, turf.owner_id);
    Ok((StatusCode::CREATED, Json(turf)))
}

async fn list_turfs(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<Turf>>> {
    let principal = current_principal(&state, &headers)?;
    require_role(&principal, RoleTag::Owner, "Not authorized to access this resource")?;

    let listings = turfs::list_for_owner(&state.store, &principal.id)?;
    Ok(Json(listings))
}

async fn get_turf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(turf_id): Path<String>,
) -> AppResult<Json<Turf>> {
    let principal = current_principal(&state, &headers)?;
    require_role(&principal, RoleTag::Owner, "Not authorized to access this resource")?;

    let turf = turfs::get_for_owner(&state.store, &principal.id, &turf_id)?;
    Ok(Json(turf))
}
