// Power controller endpoints

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::common::{not_found, ApiResponse, ApiResult};
use crate::database::PowerRecord;
use crate::web::AppState;

pub async fn get_all_power(State(state): State<AppState>) -> ApiResult<Vec<PowerRecord>> {
    Ok(Json(ApiResponse::success(state.inventory.get_all_power().await)))
}

pub async fn get_host_power(
    Path(host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<PowerRecord> {
    match state.inventory.get_power(&host).await {
        Some(record) => Ok(Json(ApiResponse::success(record))),
        None => Err(not_found(format!("No power data for: {}", host))),
    }
}
