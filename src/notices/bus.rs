use std::sync::Mutex;

use tokio::task::JoinHandle;

use super::notice::Notice;
use super::sink::NoticeSink;

/// Queue of pending user-facing notices.
///
/// Producers hold a [`sender`](NoticeBus::sender) and push fire-and-forget.
/// The hosting shell consumes one of two ways: poll [`drain`](NoticeBus::drain)
/// from its render loop, or hand a [`NoticeSink`] to
/// [`forward_to`](NoticeBus::forward_to) for background delivery. Use one
/// consumption mode per bus; both read from the same queue.
pub struct NoticeBus {
    tx: flume::Sender<Notice>,
    rx: flume::Receiver<Notice>,
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            tx,
            rx,
            forwarder: Mutex::new(None),
        }
    }

    /// Sender handle for producers.
    #[must_use]
    pub fn sender(&self) -> flume::Sender<Notice> {
        self.tx.clone()
    }

    /// Remove and return every queued notice, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        self.rx.try_iter().collect()
    }

    /// Spawn a task delivering notices to `sink` as they arrive. Replaces
    /// any previous forwarder.
    pub fn forward_to<S>(&self, mut sink: S)
    where
        S: NoticeSink + 'static,
    {
        let rx = self.rx.clone();
        let handle = tokio::spawn(async move {
            while let Ok(notice) = rx.recv_async().await {
                if let Err(e) = sink.handle(&notice) {
                    tracing::warn!(error = %e, "notice sink error");
                }
            }
        });
        if let Some(previous) = self.forwarder.lock().unwrap().replace(handle) {
            previous.abort();
        }
    }

    /// Stop background delivery. Notices queued afterwards stay available
    /// to [`drain`](NoticeBus::drain).
    pub async fn stop(&self) {
        let handle = self.forwarder.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for NoticeBus {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.forwarder.lock()
            && let Some(handle) = guard.take()
        {
            handle.abort();
        }
    }
}
