use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    db::{AggregateCommit, RatingStore, SampleWrite},
    engine::rating::{DRIFT_EPSILON, RunningMean},
    errors::AppError,
    models::RatedAggregate,
    service::retry::with_commit_retry,
    state::SharedStore,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub aggregate: RatedAggregate,
    /// Gap between the stored running mean and the recompute, in summed score units.
    pub drift: f64,
    pub corrected: bool,
}

/// Recomputes the aggregate's mean and count from its active samples.
pub async fn reconcile(
    store: &dyn RatingStore,
    aggregate_id: Uuid,
    max_retries: u32,
) -> Result<ReconcileReport, AppError> {
    let report = with_commit_retry("reconcile", max_retries, move || async move {
        // Aggregate first: a sample written after this read bumps the version.
        let aggregate = store.get_aggregate(aggregate_id).await?;
        let scores: Vec<f64> = store
            .active_samples(aggregate_id)
            .await?
            .iter()
            .map(|s| s.score)
            .collect();

        let stored = aggregate.rating();
        let recomputed = RunningMean::from_scores(&scores)?;
        let drift = stored.drift_from(&recomputed);

        if stored == recomputed {
            return Ok(ReconcileReport {
                aggregate,
                drift,
                corrected: false,
            });
        }

        let fixed = aggregate.with_rating(recomputed);
        store
            .commit(AggregateCommit {
                expected_version: aggregate.version,
                aggregate: fixed.clone(),
                sample: SampleWrite::None,
            })
            .await?;

        Ok(ReconcileReport {
            aggregate: fixed,
            drift,
            corrected: true,
        })
    })
    .await?;

    if report.drift > DRIFT_EPSILON {
        tracing::warn!(
            "Aggregate {} drifted by {:e}; reset to mean {} over {} samples",
            aggregate_id,
            report.drift,
            report.aggregate.mean_score,
            report.aggregate.sample_count
        );
    } else {
        tracing::debug!("Aggregate {} reconciled (drift {:e})", aggregate_id, report.drift);
    }

    Ok(report)
}

/// Reconciles every aggregate and returns how many were rewritten.
pub async fn reconcile_all(store: &dyn RatingStore, max_retries: u32) -> Result<usize, AppError> {
    let aggregates = store.list_aggregates().await?;
    let mut corrected = 0;

    for aggregate in aggregates {
        match reconcile(store, aggregate.id, max_retries).await {
            Ok(report) if report.corrected => corrected += 1,
            Ok(_) => {}
            Err(e) => tracing::error!("Failed to reconcile aggregate {}: {}", aggregate.id, e),
        }
    }

    Ok(corrected)
}

pub fn spawn_reconciler(store: SharedStore, period: Duration, max_retries: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so startup is not slowed down.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match reconcile_all(store.as_ref(), max_retries).await {
                Ok(corrected) => {
                    tracing::info!("Reconciliation pass done, {} aggregates corrected", corrected)
                }
                Err(e) => tracing::error!("Reconciliation pass failed: {}", e),
            }
        }
    })
}
