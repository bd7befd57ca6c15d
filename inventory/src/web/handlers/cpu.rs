// CPU benchmark endpoints
//
// Lookups answer from stored records only. Unknown CPUs can be queued for a
// background fetch; a `content` event follows once the record is saved.

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::common::{bad_request, not_found, ApiResponse, ApiResult, BatchEntry};
use crate::benchmark::LookupResult;
use crate::database::BenchmarkRecord;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct BenchmarkQuery {
    pub cpu: Option<String>,
    #[serde(default)]
    pub fetch: bool,
}

#[derive(Deserialize)]
pub struct BenchmarkBatchRequest {
    pub cpus: Vec<String>,
    #[serde(default)]
    pub fetch: bool,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkBatch {
    pub results: BTreeMap<String, BatchEntry<BenchmarkRecord>>,
    /// Number of background fetches started by this request
    pub queued: usize,
}

pub async fn get_cpu_benchmark(
    Query(query): Query<BenchmarkQuery>,
    State(state): State<AppState>,
) -> ApiResult<LookupResult> {
    let Some(cpu_name) = query.cpu.filter(|name| !name.trim().is_empty()) else {
        return Err(bad_request("CPU name is required"));
    };

    match state.benchmarks.lookup_or_queue(&cpu_name, query.fetch).await {
        LookupResult::NotFound => Err(not_found(format!(
            "Benchmark data not found for: {}",
            cpu_name
        ))),
        LookupResult::Pending => Ok(Json(
            ApiResponse::success(LookupResult::Pending)
                .with_message("Fetching benchmark data in background"),
        )),
        found => Ok(Json(ApiResponse::success(found))),
    }
}

pub async fn get_cpu_benchmarks_batch(
    State(state): State<AppState>,
    Json(request): Json<BenchmarkBatchRequest>,
) -> ApiResult<BenchmarkBatch> {
    let found = state.benchmarks.get_benchmarks_batch(&request.cpus).await;

    let missing: Vec<String> = found
        .iter()
        .filter(|(_, record)| record.is_none())
        .map(|(name, _)| name.clone())
        .collect();

    let queued = if request.fetch && !missing.is_empty() {
        state.benchmarks.queue_fetch_batch(&missing).await
    } else {
        0
    };

    let mut results = BTreeMap::new();
    for (name, record) in found {
        let entry = match record {
            Some(record) => BatchEntry::found(record),
            None => BatchEntry::missing(Some(state.benchmarks.is_fetch_pending(&name).await)),
        };
        results.insert(name, entry);
    }

    let mut response = ApiResponse::success(BenchmarkBatch { results, queued });
    if queued > 0 {
        response = response.with_message(format!("Queued {} background fetch(es)", queued));
    }
    Ok(Json(response))
}
