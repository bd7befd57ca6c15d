//! Fixed-interval background workers
//!
//! A `Scheduler` owns one long-lived worker that runs a `Job` pass, then
//! sleeps until the next interval or until it is told to stop. The stop
//! signal is observed only between passes: a pass that has started is
//! allowed to finish.
//!
//! Lifecycle:
//! - `start()` spawns the worker; starting a running scheduler is a no-op
//! - `stop()` signals the worker and waits up to the shutdown timeout, then
//!   returns whether or not the worker has exited

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[async_trait]
pub trait Job: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// One best-effort pass. Must not panic on expected failures.
    async fn run_once(&self);
}

struct Worker {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct Scheduler {
    job: Arc<dyn Job>,
    interval: Duration,
    shutdown_timeout: Duration,
    run_at_start: bool,
    worker: Mutex<Option<Worker>>,
}

impl Scheduler {
    pub fn new(job: Arc<dyn Job>, interval: Duration, shutdown_timeout: Duration) -> Self {
        Self {
            job,
            interval,
            shutdown_timeout,
            run_at_start: true,
            worker: Mutex::new(None),
        }
    }

    /// Wait one interval before the first pass
    pub fn delay_first_pass(mut self) -> Self {
        self.run_at_start = false;
        self
    }

    pub async fn is_running(&self) -> bool {
        self.worker
            .lock()
            .await
            .as_ref()
            .map(|worker| !worker.handle.is_finished())
            .unwrap_or(false)
    }

    /// Returns false when the worker was already running
    pub async fn start(&self) -> bool {
        let mut worker = self.worker.lock().await;
        if let Some(existing) = worker.as_ref() {
            if !existing.handle.is_finished() {
                debug!("Scheduler for {} already running", self.job.name());
                return false;
            }
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            self.job.clone(),
            self.interval,
            self.run_at_start,
            stop_rx,
        ));

        info!(
            "Started {} worker (interval {}s)",
            self.job.name(),
            self.interval.as_secs()
        );
        *worker = Some(Worker { stop_tx, handle });
        true
    }

    /// Signal the worker and wait for it with a bounded timeout.
    /// Returns true when the worker exited in time.
    pub async fn stop(&self) -> bool {
        let Some(worker) = self.worker.lock().await.take() else {
            return true;
        };

        let _ = worker.stop_tx.send(true);

        match tokio::time::timeout(self.shutdown_timeout, worker.handle).await {
            Ok(_) => {
                info!("Stopped {} worker", self.job.name());
                true
            }
            Err(_) => {
                warn!(
                    "{} worker did not stop within {}s, continuing shutdown",
                    self.job.name(),
                    self.shutdown_timeout.as_secs()
                );
                false
            }
        }
    }
}

async fn run_loop(
    job: Arc<dyn Job>,
    interval: Duration,
    run_at_start: bool,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut first = true;

    loop {
        if *stop_rx.borrow() {
            break;
        }

        if !first || run_at_start {
            debug!("Running {} pass", job.name());
            job.run_once().await;
        }
        first = false;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!("{} worker exited", job.name());
}
