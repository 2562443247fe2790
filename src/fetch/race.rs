// Race combinator for best-effort sources.
// First non-empty result wins; a single deadline bounds the whole wait.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

/// Run every task concurrently and return the first non-empty list.
///
/// Tasks that finish with `None`, an empty list, or a panic do not end the
/// race; the others keep running. The deadline is measured once, from the
/// call, and caps the total wait. Whatever is still running when the race
/// resolves is aborted.
pub async fn race_first_non_empty<T, I, F>(tasks: I, deadline: Duration) -> Option<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Option<Vec<T>>> + Send + 'static,
    T: Send + 'static,
{
    let deadline_at = Instant::now() + deadline;
    let mut set = JoinSet::new();
    for task in tasks {
        set.spawn(task);
    }

    loop {
        match tokio::time::timeout_at(deadline_at, set.join_next()).await {
            Err(_) => {
                tracing::debug!(
                    "Race deadline of {:?} reached with {} task(s) pending",
                    deadline,
                    set.len()
                );
                return None;
            }
            Ok(None) => return None,
            Ok(Some(Ok(Some(items)))) if !items.is_empty() => return Some(items),
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(e))) => tracing::warn!("Fetch task failed: {}", e),
        }
    }
}
