// UPS endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::common::{not_found, ApiResponse, ApiResult};
use crate::services::UpsView;
use crate::web::AppState;

/// Every UPS with the clients it powers
pub async fn get_all_ups(State(state): State<AppState>) -> ApiResult<Vec<UpsView>> {
    Ok(Json(ApiResponse::success(state.inventory.get_all_ups().await)))
}

pub async fn get_ups_detail(
    Path((host, ups_name)): Path<(String, String)>,
    State(state): State<AppState>,
) -> ApiResult<UpsView> {
    match state.inventory.get_ups(&ups_name, &host).await {
        Some(view) => Ok(Json(ApiResponse::success(view))),
        None => Err(not_found(format!("UPS not found: {}@{}", ups_name, host))),
    }
}
