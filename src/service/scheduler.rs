//! Background polling scheduler.
//!
//! Spawns a thread that runs one processing pass, waits the configured fixed
//! delay, and repeats until shut down. Runs never overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::processor::{EnvelopeService, RunSummary};

/// Sleep granularity for shutdown responsiveness.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(100);

/// One polling pass over the pending envelopes.
pub struct ScanTask {
    service: Arc<EnvelopeService>,
}

impl ScanTask {
    pub fn new(service: Arc<EnvelopeService>) -> Self {
        Self { service }
    }

    /// Run one pass. A listing failure is logged and the pass yields nothing;
    /// the next pass retries.
    pub fn run_once(&self) -> Option<RunSummary> {
        match self.service.process_pending() {
            Ok(summary) => {
                if summary.total() > 0 {
                    tracing::info!(
                        service = %self.service.service_name(),
                        success = summary.success,
                        success_with_warnings = summary.success_with_warnings,
                        errors = summary.errors,
                        fatal = summary.fatal,
                        unrecorded = summary.unrecorded,
                        "Polling run completed"
                    );
                }
                Some(summary)
            }
            Err(e) => {
                tracing::error!(
                    service = %self.service.service_name(),
                    error = %e,
                    "An error occurred when processing scanned documents"
                );
                None
            }
        }
    }
}

/// Handle for the polling thread.
///
/// Supports graceful shutdown via `shutdown()` or automatic cleanup on `Drop`.
pub struct ScanSchedulerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl ScanSchedulerHandle {
    /// Request graceful shutdown. A pass in progress completes first.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for ScanSchedulerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start polling on a separate thread. The first pass runs immediately.
pub fn start_scan_scheduler(task: ScanTask, poll_delay: Duration) -> ScanSchedulerHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(
            delay_ms = poll_delay.as_millis() as u64,
            "Envelope polling started"
        );
        scheduler_loop(&task, poll_delay, &flag);
    });

    ScanSchedulerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn scheduler_loop(task: &ScanTask, poll_delay: Duration, shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Relaxed) {
        task.run_once();

        // Sleep in small increments for responsive shutdown
        let mut waited = Duration::ZERO;
        while waited < poll_delay {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            let step = SLEEP_GRANULARITY.min(poll_delay - waited);
            std::thread::sleep(step);
            waited += step;
        }
    }
    tracing::info!("Envelope polling shutting down");
}
