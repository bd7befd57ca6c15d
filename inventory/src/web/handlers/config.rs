// Configuration and collection status endpoints

use axum::{extract::State, response::Json};
use serde_json::Value;

use super::common::{not_found, ApiResponse, ApiResult};
use crate::database::CollectionStatus;
use crate::web::AppState;

/// Machine configuration with collected VM lists filled in
pub async fn get_config(State(state): State<AppState>) -> ApiResult<Value> {
    match state.inventory.get_config().await {
        Some(config) => Ok(Json(ApiResponse::success(config))),
        None => Err(not_found("Config not available".to_string())),
    }
}

pub async fn get_collection_status(
    State(state): State<AppState>,
) -> ApiResult<Vec<CollectionStatus>> {
    Ok(Json(ApiResponse::success(
        state.inventory.collection_status().await,
    )))
}
