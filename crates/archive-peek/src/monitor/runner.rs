//! Drives a `HoverMonitor` from a tokio interval.

use std::sync::Arc;
use std::time::Duration;

use log::{info, trace, warn};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::monitor::poll_loop::HoverMonitor;

/// A running poll timer. Dropping it stops the timer too.
pub struct MonitorRunner {
    monitor: Arc<HoverMonitor>,
    task: Option<JoinHandle<()>>,
}

impl MonitorRunner {
    /// Starts ticking every `interval` on `runtime`.
    ///
    /// Each tick runs on the blocking pool because resolvers may call slow platform APIs. A
    /// panicking tick is logged and the next one proceeds normally.
    pub fn start(runtime: &Handle, monitor: Arc<HoverMonitor>, interval: Duration, debounce: Duration) -> Self {
        info!(
            "Hover monitor started with {}ms polling, {}ms debounce",
            interval.as_millis(),
            debounce.as_millis()
        );

        let ticking = Arc::clone(&monitor);
        let task = runtime.spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                let monitor = Arc::clone(&ticking);
                match tokio::task::spawn_blocking(move || monitor.tick()).await {
                    Ok(outcome) => trace!("tick: {:?}", outcome),
                    Err(e) => warn!("Error in hover monitor tick: {}", e),
                }
            }
        });

        Self {
            monitor,
            task: Some(task),
        }
    }

    pub fn monitor(&self) -> &Arc<HoverMonitor> {
        &self.monitor
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the timer and cancels any in-flight read. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.monitor.stop();
            info!("Hover monitor stopped");
        }
    }
}

impl Drop for MonitorRunner {
    fn drop(&mut self) {
        self.stop();
    }
}
