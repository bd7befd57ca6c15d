// VM inventory endpoints

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use super::common::{bad_request, not_found, ApiResponse, ApiResult, BatchEntry};
use crate::errors::{ConfigError, InventoryError};
use crate::reachability::{Reachability, VmView};
use crate::web::AppState;

#[derive(Deserialize)]
pub struct VmInfoQuery {
    pub vm_name: Option<String>,
    pub esxi_host: Option<String>,
}

#[derive(Deserialize)]
pub struct VmBatchRequest {
    pub vms: Vec<String>,
    pub esxi_host: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HostVms {
    pub esxi_host: String,
    pub reachability: Reachability,
    pub vms: Vec<VmView>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResult {
    pub esxi_host: String,
    pub collected: bool,
    pub error: Option<String>,
}

pub async fn get_vm_info(
    Query(query): Query<VmInfoQuery>,
    State(state): State<AppState>,
) -> ApiResult<VmView> {
    let Some(vm_name) = query.vm_name.filter(|name| !name.is_empty()) else {
        return Err(bad_request("vm_name is required"));
    };

    match state
        .inventory
        .get_vm_info(&vm_name, query.esxi_host.as_deref())
        .await
    {
        Some(view) => Ok(Json(ApiResponse::success(view))),
        None => Err(not_found(format!("VM not found: {}", vm_name))),
    }
}

pub async fn get_vm_info_batch(
    State(state): State<AppState>,
    Json(request): Json<VmBatchRequest>,
) -> ApiResult<BTreeMap<String, BatchEntry<VmView>>> {
    let mut results = BTreeMap::new();

    for vm_name in request.vms {
        let entry = match state
            .inventory
            .get_vm_info(&vm_name, request.esxi_host.as_deref())
            .await
        {
            Some(view) => BatchEntry::found(view),
            None => BatchEntry::missing(None),
        };
        results.insert(vm_name, entry);
    }

    Ok(Json(ApiResponse::success(results)))
}

/// All VMs of one hypervisor. 404 only when the host was never polled.
pub async fn get_vms_for_host(
    Path(esxi_host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<HostVms> {
    let vms = state.inventory.get_vms_for_host(&esxi_host).await;
    let reachability = state.inventory.reachability().reachability(&esxi_host).await;

    if vms.is_empty() && reachability == Reachability::Unknown {
        return Err(not_found(format!("No VM data for host: {}", esxi_host)));
    }

    Ok(Json(ApiResponse::success(HostVms {
        esxi_host,
        reachability,
        vms,
    })))
}

/// Collect one hypervisor now. An unreachable host is reported in the body.
pub async fn refresh_host(
    Path(esxi_host): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<RefreshResult> {
    info!("Manual refresh requested for {}", esxi_host);

    match state.inventory.refresh_now(&esxi_host).await {
        Ok(()) => Ok(Json(
            ApiResponse::success(RefreshResult {
                esxi_host: esxi_host.clone(),
                collected: true,
                error: None,
            })
            .with_message(format!("Data collection completed for {}", esxi_host)),
        )),
        Err(InventoryError::Config(ConfigError::MissingRequired { .. })) => Err(not_found(
            format!("No credentials configured for host: {}", esxi_host),
        )),
        Err(e) => {
            warn!("Manual refresh of {} failed: {}", esxi_host, e);
            let mut response = ApiResponse::success(RefreshResult {
                esxi_host: esxi_host.clone(),
                collected: false,
                error: Some(e.to_string()),
            })
            .with_message(format!("Failed to collect data from {}", esxi_host));
            response.success = false;
            Ok(Json(response))
        }
    }
}
