// Repository fetching.
// The source trait both strategies implement, the race combinator, and the orchestrator.

pub mod orchestrator;
pub mod race;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::error::{FolioError, Result};
use crate::github::RepoSummary;

pub use orchestrator::{LoadMode, LoadOutcome, Orchestrator, RefreshOutcome, Timeouts};
pub use race::race_first_non_empty;

/// Future returned by a [`RepoSource`]. Owns everything it needs so it can be spawned.
pub type FetchFuture = Pin<Box<dyn Future<Output = Option<Vec<RepoSummary>>> + Send + 'static>>;

/// One strategy for obtaining the repository list.
///
/// A source never fails loudly: any network, status or parse problem is
/// logged and reported as `None`.
pub trait RepoSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the list, giving up after `timeout`.
    fn fetch(&self, timeout: Duration) -> FetchFuture;
}

/// Bound `future` by `timeout`; the future is dropped (and its request aborted) on expiry.
pub async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(FolioError::Timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let value = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(value.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: Result<()> = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(FolioError::Timeout(_))));
    }
}
