use std::future::Future;

use crate::errors::AppError;

/// Runs `attempt` until it stops failing with `StateConflict`, at most
/// `max_retries` extra times. Each attempt must re-read whatever it commits against.
pub async fn with_commit_retry<T, F, Fut>(
    operation: &str,
    max_retries: u32,
    mut attempt: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut conflicts = 0;
    loop {
        match attempt().await {
            Err(AppError::StateConflict(reason)) if conflicts < max_retries => {
                conflicts += 1;
                tracing::warn!(
                    "{operation}: {reason}; retrying ({conflicts}/{max_retries})"
                );
                tokio::task::yield_now().await;
            }
            Err(AppError::StateConflict(reason)) => {
                tracing::error!("{operation}: giving up after {conflicts} retries: {reason}");
                return Err(AppError::StateConflict(reason));
            }
            other => return other,
        }
    }
}
