pub mod accounts;
pub mod health;
pub mod owners;

use crate::db::RepositoryWrapper;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::{routing::get, Router};
use sqlx::SqlitePool;
use std::convert::Infallible;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Every handler that asks for a `RepositoryWrapper` gets a fresh unit of
/// work over the shared pool.
#[async_trait]
impl FromRequestParts<AppState> for RepositoryWrapper {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RepositoryWrapper::new(state.pool.clone()))
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/owners",
            get(owners::get_all_owners).post(owners::create_owner),
        )
        .route(
            "/owners/:id",
            get(owners::get_owner_by_id)
                .put(owners::update_owner)
                .delete(owners::delete_owner),
        )
        .route("/owners/:id/account", get(owners::get_owner_with_details))
        .route("/accounts", get(accounts::get_accounts))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
