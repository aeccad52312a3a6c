// Fire-and-forget execution for webhook work
// Handlers acknowledge immediately; the event is processed on the runtime afterwards

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{field, info, info_span, warn, Instrument};

/// Spawns detached tasks and counts how many are still running
#[derive(Clone, Default)]
pub struct BackgroundDispatcher {
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the counter even if the task panics
struct InFlightGuard(Arc<AtomicUsize>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl BackgroundDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` in the background inside a `webhook_task` span.
    /// The handle is returned for tests; callers in the request path drop it.
    pub fn spawn<F>(&self, kind: &'static str, payment_id: Option<&str>, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));

        let span = info_span!("webhook_task", kind, payment_id = field::Empty);
        if let Some(payment_id) = payment_id {
            span.record("payment_id", payment_id);
        }
        tokio::spawn(
            async move {
                let _guard = guard;
                task.await;
            }
            .instrument(span),
        )
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Wait until no tasks are running or `timeout` elapses. Returns true when idle.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;

        while self.in_flight() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }

    /// Drain outstanding work on shutdown
    pub async fn shutdown(&self, timeout: Duration) {
        let pending = self.in_flight();
        if pending == 0 {
            return;
        }

        info!("Waiting for {} background task(s) to finish", pending);
        if !self.wait_idle(timeout).await {
            warn!(
                "Shutting down with {} background task(s) still running",
                self.in_flight()
            );
        }
    }
}
