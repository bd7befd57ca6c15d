// File: inventory/src/web/server.rs
use crate::web::{handlers, AppState};
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn start_web_server<F>(host: &str, port: u16, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // === HOST ROUTES ===
        .route("/api/uptime", get(handlers::get_all_uptime))
        .route("/api/uptime/{host}", get(handlers::get_host_uptime))
        // === VM ROUTES ===
        .route("/api/vm/info", get(handlers::get_vm_info))
        .route("/api/vm/info/batch", post(handlers::get_vm_info_batch))
        .route("/api/vm/host/{esxi_host}", get(handlers::get_vms_for_host))
        .route("/api/vm/refresh/{esxi_host}", post(handlers::refresh_host))
        // === POWER ROUTES ===
        .route("/api/power", get(handlers::get_all_power))
        .route("/api/power/{host}", get(handlers::get_host_power))
        // === STORAGE ROUTES ===
        .route("/api/storage/zfs/{host}", get(handlers::get_host_zfs_pools))
        .route("/api/storage/mount/{host}", get(handlers::get_host_mounts))
        // === UPS ROUTES ===
        .route("/api/ups", get(handlers::get_all_ups))
        .route("/api/ups/{host}/{ups_name}", get(handlers::get_ups_detail))
        // === CPU BENCHMARK ROUTES ===
        .route("/api/cpu/benchmark", get(handlers::get_cpu_benchmark))
        .route(
            "/api/cpu/benchmark/batch",
            post(handlers::get_cpu_benchmarks_batch),
        )
        // === CONFIGURATION & EVENTS ===
        .route("/api/config", get(handlers::get_config))
        .route("/api/collection/status", get(handlers::get_collection_status))
        .route("/api/event", get(handlers::event_stream))
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
