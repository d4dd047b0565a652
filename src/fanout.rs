// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Unbounded concurrent fan-out over spawned tasks
//!
//! Two join strategies, deliberately kept apart: `settle_all` tolerates
//! individual failures, `join_all_fail_fast` fails the batch on the first one.

use futures_util::future::{join_all, try_join_all};
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::Result;

/// Outcome of a settled batch
#[derive(Debug)]
pub struct Settled<T> {
    pub succeeded: Vec<T>,
    pub failed: usize,
}

/// Spawn one task per future, no concurrency cap
pub fn spawn_all<F, T>(futures: impl IntoIterator<Item = F>) -> Vec<JoinHandle<Result<T>>>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    futures.into_iter().map(tokio::spawn).collect()
}

/// Wait for every task and partition by outcome.
///
/// A task that errors or panics counts as failed; the rest are kept.
pub async fn settle_all<T>(handles: Vec<JoinHandle<Result<T>>>) -> Settled<T> {
    let mut succeeded = Vec::with_capacity(handles.len());
    let mut failed = 0;

    for outcome in join_all(handles).await {
        match outcome {
            Ok(Ok(value)) => succeeded.push(value),
            Ok(Err(e)) => {
                warn!("Task failed: {}", e);
                failed += 1;
            }
            Err(e) => {
                warn!("Task aborted: {}", e);
                failed += 1;
            }
        }
    }

    Settled { succeeded, failed }
}

/// Wait for every task; the first error or panic fails the whole batch
pub async fn join_all_fail_fast<T>(handles: Vec<JoinHandle<Result<T>>>) -> Result<Vec<T>> {
    try_join_all(handles.into_iter().map(|handle| async move { handle.await? })).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SortwiseError;

    fn job(n: u32) -> impl Future<Output = Result<u32>> + Send + 'static {
        async move {
            match n {
                3 => Err(SortwiseError::NotFound(format!("job {}", n))),
                5 => panic!("job {} blew up", n),
                _ => Ok(n * 10),
            }
        }
    }

    #[tokio::test]
    async fn test_settle_all_partitions() {
        let handles = spawn_all((1..=6).map(job));
        let settled = settle_all(handles).await;

        assert_eq!(settled.failed, 2);
        let mut values = settled.succeeded;
        values.sort();
        assert_eq!(values, vec![10, 20, 40, 60]);
    }

    #[tokio::test]
    async fn test_settle_all_empty() {
        let settled = settle_all::<u32>(Vec::new()).await;
        assert!(settled.succeeded.is_empty());
        assert_eq!(settled.failed, 0);
    }

    #[tokio::test]
    async fn test_fail_fast_on_error() {
        let handles = spawn_all([1, 2, 3].map(job));
        tokio_test::assert_err!(join_all_fail_fast(handles).await);
    }

    #[tokio::test]
    async fn test_fail_fast_on_panic() {
        let handles = spawn_all([1, 5].map(job));
        assert!(matches!(
            join_all_fail_fast(handles).await,
            Err(SortwiseError::Task(_))
        ));
    }

    #[tokio::test]
    async fn test_fail_fast_all_ok() {
        let handles = spawn_all([1, 2].map(job));
        let values = tokio_test::assert_ok!(join_all_fail_fast(handles).await);
        assert_eq!(values, vec![10, 20]);
    }
}
