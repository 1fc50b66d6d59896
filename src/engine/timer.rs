//! Periodic cycle driver.
//!
//! One background task per running timer. Each tick locks the shared
//! session and runs a full cycle before releasing it.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::session::SharedSession;

/// Timer handle shared between the binary and the dashboard.
pub type SharedTimer = Arc<Mutex<CycleTimer>>;

pub struct CycleTimer {
    session: SharedSession,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl CycleTimer {
    pub fn new(session: SharedSession, interval: Duration) -> Self {
        Self {
            session,
            handle: None,
            interval: clamp(interval),
        }
    }

    pub fn into_shared(self) -> SharedTimer {
        Arc::new(Mutex::new(self))
    }

    /// Run a cycle now and then every interval. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Cycle timer already running");
            return;
        }
        let interval = self.interval;
        let session = self.session.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                session.lock().await.run_cycle();
            }
        }));
        info!(interval_ms = interval.as_millis() as u64, "Cycle timer started");
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Cycle timer stopped");
        }
    }

    /// Cancel any running timer, then start with the new interval.
    pub fn restart(&mut self, interval: Duration) {
        self.stop();
        self.interval = clamp(interval);
        self.start();
    }

    /// Change the interval. A running timer is restarted on the new
    /// cadence; a stopped one stays stopped. Returns whether it restarted.
    pub fn set_interval(&mut self, interval: Duration) -> bool {
        if self.is_running() {
            self.restart(interval);
            true
        } else {
            self.interval = clamp(interval);
            false
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn clamp(interval: Duration) -> Duration {
    interval.max(Duration::from_millis(1))
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
