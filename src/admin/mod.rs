//! Read-only admin API.
//!
//! # Endpoints
//! - `GET /admin/status`: version, name count, active failovers
//! - `GET /admin/names`: every stored EndpointState
//! - `GET /admin/names/{name}`: one EndpointState, or 404
//!
//! Every route requires `Authorization: Bearer <key>`.

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use crate::lifecycle::Shutdown;
use crate::pool::CandidatePool;
use crate::store::StateStore;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared state of the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn StateStore>,
    pub pool: Arc<CandidatePool>,
    api_key: Arc<str>,
}

impl AdminState {
    pub fn new(store: Arc<dyn StateStore>, pool: Arc<CandidatePool>, api_key: &str) -> Self {
        Self {
            store,
            pool,
            api_key: Arc::from(api_key),
        }
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/names", get(get_names))
        .route("/admin/names/{name}", get(get_name))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API on `listener` until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: broadcast::Receiver<()>,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(Shutdown::wait(shutdown))
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
