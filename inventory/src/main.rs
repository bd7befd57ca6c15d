// File: inventory/src/main.rs
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use inventory::benchmark::{BenchmarkResolver, CpuBenchmarkScraper, CpuMatcher};
use inventory::cache_refresher::CacheRefresher;
use inventory::collector::{Collector, Sources};
use inventory::config::ConfigManager;
use inventory::database::Database;
use inventory::events::EventNotifier;
use inventory::scheduler::Scheduler;
use inventory::services::InventoryService;
use inventory::sources::{MetricsSource, PrometheusClient, RedfishClient, VsphereClient};
use inventory::ups::NutClient;
use inventory::web::{start_web_server, AppState};

const CONFIG_DIR_ENV: &str = "INVENTORY_CONFIG_DIR";
const DEFAULT_CONFIG_DIR: &str = "config";
const DATABASE_FILE: &str = "inventory.db";

fn config_dir() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_DIR_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("inventory=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("sqlx=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting server inventory collector");

    // Load configuration
    let config_manager = Arc::new(ConfigManager::new(config_dir()).await?);
    let config = config_manager.get_current_config().await;
    info!(
        "Configuration loaded: {} machines, {} hypervisors, {} power controllers, {} UPS daemons",
        config.machines.len(),
        config.secrets.esxi.len(),
        config.secrets.ilo.len(),
        config.ups.len()
    );

    // Initialize database
    let database_path = Path::new(&config.data_dir).join(DATABASE_FILE);
    let database = Arc::new(Database::new(&database_path.to_string_lossy()).await?);
    info!("Database initialized at {}", database_path.display());

    let notifier = EventNotifier::new();
    let request_timeout = Duration::from_secs(config.request_timeout_seconds);
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_seconds);

    // Source adapters
    let metrics: Option<Arc<dyn MetricsSource>> = match &config.prometheus {
        Some(prometheus) => Some(Arc::new(PrometheusClient::new(
            &prometheus.url,
            request_timeout,
        )?)),
        None => {
            warn!("No metrics server configured, uptime/storage collection disabled");
            None
        }
    };
    let sources = Sources {
        hypervisor: Arc::new(VsphereClient::new(request_timeout)?),
        power: Arc::new(RedfishClient::new(request_timeout)?),
        metrics,
        ups: Arc::new(NutClient::new()),
    };

    let collector = Arc::new(Collector::new(
        config_manager.clone(),
        database.clone(),
        sources,
        notifier.clone(),
    ));
    info!("Collector initialized");

    let matcher = Arc::new(CpuMatcher::new()?);
    let scraper = Arc::new(CpuBenchmarkScraper::new(request_timeout, matcher.clone())?);
    let benchmarks = BenchmarkResolver::new(database.clone(), scraper, notifier.clone(), matcher);
    info!("CPU benchmark resolver initialized");

    // Background workers
    let collector_scheduler = Scheduler::new(
        collector.clone(),
        Duration::from_secs(config.collect_interval_seconds),
        shutdown_timeout,
    );
    collector_scheduler.start().await;

    let refresher = Arc::new(CacheRefresher::new(
        config_manager.clone(),
        database.clone(),
        notifier.clone(),
    ));
    let refresher_scheduler = CacheRefresher::start(
        refresher,
        Duration::from_secs(config.cache_refresh_interval_seconds),
        shutdown_timeout,
    )
    .await;
    info!(
        "Background workers started (collect every {}s, cache refresh every {}s)",
        config.collect_interval_seconds, config.cache_refresh_interval_seconds
    );

    let inventory = Arc::new(InventoryService::new(
        database.clone(),
        config_manager.clone(),
        collector,
    ));
    let state = AppState::new(inventory, benchmarks, notifier);

    // Start web server
    let served = start_web_server(&config.host, config.port, state, shutdown_signal()).await;
    if let Err(e) = &served {
        error!("Web server stopped with error: {}", e);
    }

    collector_scheduler.stop().await;
    refresher_scheduler.stop().await;
    info!("Shutdown complete");

    served
}
