// Host uptime endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::common::{not_found, ApiResponse, ApiResult};
use crate::reachability::HostView;
use crate::web::AppState;

/// Every collected host, current-state fields degraded when unreachable
pub async fn get_all_uptime(State(state): State<AppState>) -> ApiResult<Vec<HostView>> {
    let hosts = state.inventory.get_all_hosts().await;
    Ok(Json(ApiResponse::success(hosts)))
}

pub async fn get_host_uptime(
    Path(host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<HostView> {
    match state.inventory.get_host(&host).await {
        Some(view) => Ok(Json(ApiResponse::success(view))),
        None => Err(not_found(format!("No host data for: {}", host))),
    }
}
