use std::future::Future;
use tokio::task::JoinHandle;

/// Holder for a request-replace-request fetch.
///
/// Starting a new fetch aborts the superseded in-flight one, so a stale
/// response can never clobber a fresher one. This is the only cancellation
/// in the client; the chat stream itself is never cancelled.
#[derive(Debug)]
pub struct ReplaceableFetch<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> ReplaceableFetch<T> {
    /// Creates an empty holder.
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Spawns `fut`, aborting any fetch still in flight.
    pub fn start<F>(&mut self, fut: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        if let Some(prev) = self.handle.take() {
            prev.abort();
        }
        self.handle = Some(tokio::spawn(fut));
    }

    /// Awaits the current fetch. Returns `None` when no fetch is in flight
    /// or the awaited one was aborted by a replacement.
    pub async fn finish(&mut self) -> Option<T> {
        let handle = self.handle.take()?;
        handle.await.ok()
    }

    /// Aborts the in-flight fetch, if any.
    pub fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl<T: Send + 'static> Default for ReplaceableFetch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for ReplaceableFetch<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_replacement_aborts_previous_fetch() {
        let slow_completed = Arc::new(AtomicBool::new(false));
        let flag = slow_completed.clone();

        let mut fetch = ReplaceableFetch::new();
        fetch.start(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            flag.store(true, Ordering::SeqCst);
            "slow"
        });
        fetch.start(async { "fast" });

        assert_eq!(fetch.finish().await, Some("fast"));
        // Give the aborted task a chance to run if it somehow survived.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!slow_completed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_finish_without_start_is_none() {
        let mut fetch: ReplaceableFetch<()> = ReplaceableFetch::new();
        assert_eq!(fetch.finish().await, None);
    }

    #[tokio::test]
    async fn test_explicit_abort() {
        let mut fetch = ReplaceableFetch::new();
        fetch.start(async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            1u32
        });
        fetch.abort();
        assert_eq!(fetch.finish().await, None);
    }
}
