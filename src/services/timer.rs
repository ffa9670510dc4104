use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A single cancellable delayed send.
///
/// Scheduling replaces any pending event, and dropping the handle cancels it,
/// so a screen that goes away never receives a stale event.
#[derive(Debug, Default)]
pub struct DeferredEvent {
    handle: Option<JoinHandle<()>>,
}

impl DeferredEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `event` on `tx` after `delay`, cancelling whatever was pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<T: Send + 'static>(
        &mut self,
        delay: Duration,
        tx: mpsc::UnboundedSender<T>,
        event: T,
    ) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone when the shell is shutting down
            let _ = tx.send(event);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for DeferredEvent {
    fn drop(&mut self) {
        self.cancel();
    }
}
