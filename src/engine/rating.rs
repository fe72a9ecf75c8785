use serde::Serialize;

use crate::errors::AppError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 5.0;

/// Tolerance for comparing a running mean against a full recompute.
pub const DRIFT_EPSILON: f64 = 1e-9;

pub fn validate_score(score: f64) -> Result<f64, AppError> {
    if !score.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(AppError::InvalidInput(format!(
            "Score must be between {} and {}, got {}",
            MIN_SCORE, MAX_SCORE, score
        )));
    }
    Ok(score)
}

/// Mean and count of the active samples of one aggregate.
///
/// Every transition is O(1); `from_scores` is the full recompute used to
/// reconcile accumulated floating-point drift.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningMean {
    pub mean_score: f64,
    pub sample_count: u32,
}

impl RunningMean {
    /// A new sample joins the set.
    pub fn added(&self, score: f64) -> Result<Self, AppError> {
        let score = validate_score(score)?;
        let sample_count = self.sample_count.checked_add(1).ok_or_else(|| {
            AppError::InternalError("Sample count overflow".into())
        })?;
        let mean_score =
            self.mean_score + (score - self.mean_score) / f64::from(sample_count);

        Ok(Self {
            mean_score: clamp_score(mean_score),
            sample_count,
        })
    }

    /// An already counted sample changes its score.
    pub fn replaced(&self, old_score: f64, new_score: f64) -> Result<Self, AppError> {
        let new_score = validate_score(new_score)?;
        if self.sample_count == 0 {
            return Err(AppError::InternalError(
                "Cannot replace a score on an aggregate with no samples".into(),
            ));
        }

        let mean_score =
            self.mean_score + (new_score - old_score) / f64::from(self.sample_count);

        Ok(Self {
            mean_score: clamp_score(mean_score),
            sample_count: self.sample_count,
        })
    }

    /// A counted sample leaves the set. Removing the last one resets to zero.
    pub fn removed(&self, score: f64) -> Result<Self, AppError> {
        match self.sample_count {
            0 => Err(AppError::InternalError(
                "Cannot remove a score from an aggregate with no samples".into(),
            )),
            1 => Ok(Self::default()),
            count => {
                let remaining = count - 1;
                let mean_score =
                    self.mean_score + (self.mean_score - score) / f64::from(remaining);
                Ok(Self {
                    mean_score: clamp_score(mean_score),
                    sample_count: remaining,
                })
            }
        }
    }

    pub fn from_scores(scores: &[f64]) -> Result<Self, AppError> {
        if scores.is_empty() {
            return Ok(Self::default());
        }

        let sample_count = count_of(scores.len())?;
        let sum: f64 = scores.iter().sum();
        Ok(Self {
            mean_score: sum / f64::from(sample_count),
            sample_count,
        })
    }

    /// Distance between this state and a full recompute, in units of summed score.
    pub fn drift_from(&self, reference: &RunningMean) -> f64 {
        let total = self.mean_score * f64::from(self.sample_count);
        let reference_total = reference.mean_score * f64::from(reference.sample_count);
        let count_gap = f64::from(self.sample_count.abs_diff(reference.sample_count));
        (total - reference_total).abs() + count_gap
    }
}

fn count_of(len: usize) -> Result<u32, AppError> {
    u32::try_from(len).map_err(|_| AppError::InternalError("Sample count overflow".into()))
}

// The true mean of scores in [0, 5] can never leave that range.
fn clamp_score(mean: f64) -> f64 {
    mean.clamp(MIN_SCORE, MAX_SCORE)
}
