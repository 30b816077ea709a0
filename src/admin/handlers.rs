use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use crate::admin::AdminState;
use crate::failover::EndpointState;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub names: usize,
    pub active_failovers: usize,
    pub pool_size: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let states = state.store.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        names: states.len(),
        active_failovers: states.iter().filter(|s| s.active_endpoint.is_some()).count(),
        pool_size: state.pool.len(),
    })
}

pub async fn get_names(State(state): State<AdminState>) -> Json<Vec<EndpointState>> {
    Json(state.store.snapshot())
}

pub async fn get_name(
    State(state): State<AdminState>,
    Path(name): Path<String>,
) -> Result<Json<EndpointState>, StatusCode> {
    state.store.get(&name).map(Json).ok_or(StatusCode::NOT_FOUND)
}
