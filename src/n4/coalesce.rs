//! Deduplication of concurrent refresh requests against the controller.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use crate::error::KetraError;

/// Coalesces identical in-flight queries so the controller is asked once.
///
/// If several clients of the same output want a status update at the same
/// time, we don't want to spam the controller with near-identical requests.
/// The first caller of a burst runs the action; everyone who joins while it
/// is running just waits, and all waiters are released together when the
/// action completes. Only the first enqueued action is executed, on the
/// assumption that the queries are identical in nature.
pub struct RequestCoalescer {
    waiters: Mutex<Vec<Arc<Notify>>>,
}

/// Handle for one waiter of a burst.
pub struct QueryTicket {
    notify: Arc<Notify>,
}

impl QueryTicket {
    /// Wait until the burst's action completes, up to `timeout`.
    ///
    /// Returns false when the wait timed out first. A timeout is not an
    /// error; the caller falls back to its cached value.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.notify.notified())
            .await
            .is_ok()
    }
}

impl RequestCoalescer {
    pub fn new() -> Self {
        Self {
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Enlist as a waiter; run `action` if no request is in flight.
    ///
    /// The caller that found the waiter list empty invokes the action on its
    /// own task and then releases the whole burst, including itself. An
    /// error from the action is returned to that caller only; enlisted
    /// followers are still released and read whatever state the action left
    /// behind.
    pub async fn request<F, Fut>(&self, action: F) -> Result<QueryTicket, KetraError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), KetraError>>,
    {
        let notify = Arc::new(Notify::new());
        let first = {
            let mut waiters = self.waiters.lock().expect("waiter list poisoned");
            let first = waiters.is_empty();
            waiters.push(notify.clone());
            first
        };

        if first {
            let result = action().await;
            self.notify();
            result?;
        }

        Ok(QueryTicket { notify })
    }

    /// Release every pending waiter and reset the list.
    ///
    /// Waiters are captured and cleared atomically, so a caller arriving
    /// after the clear starts a new burst.
    pub fn notify(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock().expect("waiter list poisoned"));
        for waiter in waiters {
            // each waiter has its own Notify, so the permit is never lost
            // even if it has not started waiting yet
            waiter.notify_one();
        }
    }
}

impl Default for RequestCoalescer {
    fn default() -> Self {
        Self::new()
    }
}
