// Storage endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::common::{not_found, ApiResponse, ApiResult};
use crate::database::{MountRecord, ZfsPoolRecord};
use crate::web::AppState;

pub async fn get_host_zfs_pools(
    Path(host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<ZfsPoolRecord>> {
    let pools = state.inventory.get_zfs(&host).await;
    if pools.is_empty() {
        return Err(not_found(format!("No ZFS pool data for host: {}", host)));
    }
    Ok(Json(ApiResponse::success(pools)))
}

pub async fn get_host_mounts(
    Path(host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Vec<MountRecord>> {
    let mounts = state.inventory.get_mounts(&host).await;
    if mounts.is_empty() {
        return Err(not_found(format!("No mount data for host: {}", host)));
    }
    Ok(Json(ApiResponse::success(mounts)))
}
