//! Deadline for remote calls, driven by the browser timer queue.

use std::future::Future;

use futures::future::{select, Either};
use gloo_timers::future::TimeoutFuture;

use classroom_types::{DirectoryError, Result};

/// Race `fut` against a `timeout_ms` timer. The loser is dropped, which
/// aborts nothing on the server side but releases the local future.
pub async fn with_timeout<T, F>(timeout_ms: u64, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timer = TimeoutFuture::new(u32::try_from(timeout_ms).unwrap_or(u32::MAX));
    match select(Box::pin(fut), Box::pin(timer)).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(DirectoryError::Timeout(timeout_ms)),
    }
}
