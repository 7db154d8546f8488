//! The read-only query surface.
//!
//! Pass-through JSON endpoints over the published views. The write side
//! never runs here; a failing query surfaces as a 500 and leaves the
//! snapshot untouched.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use gitpulse_core::{RepositoryTotal, RepositoryUserTotal, UserTotal};
use gitpulse_store::query;

use crate::error::ApiResult;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The pool shared with the materializer.
    pub pool: PgPool,
}

/// Builds the service router.
///
/// The surface is public and read-only, so CORS is wide open — the
/// original deployment fed a browser dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/repositories", get(list_repositories))
        .route("/users", get(list_users))
        .route("/rels", get(list_repository_users))
        .route("/healthz", get(healthz))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn list_repositories(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RepositoryTotal>>> {
    Ok(Json(query::repository_totals(&state.pool).await?))
}

async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserTotal>>> {
    Ok(Json(query::user_totals(&state.pool).await?))
}

async fn list_repository_users(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RepositoryUserTotal>>> {
    Ok(Json(query::repository_user_totals(&state.pool).await?))
}

async fn healthz(State(state): State<AppState>) -> ApiResult<StatusCode> {
    query::ping(&state.pool).await?;
    Ok(StatusCode::OK)
}
