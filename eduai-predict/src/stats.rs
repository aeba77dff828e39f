//! Aggregate statistics over one batch of predictions
//!
//! Chart-ready: every count block is a pair of parallel `labels`/`counts`
//! vectors.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use uuid::Uuid;

use crate::error::PredictError;

/// Histogram bin labels for the 0-20 grading scale
pub const SCORE_BIN_LABELS: [&str; 4] = ["0–5", "5–10", "10–15", "15–20"];

/// Parallel labels and counts, in first-occurrence order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCounts {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl LabelCounts {
    #[cfg(test)]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Batch-level summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStatistics {
    pub score_hist: LabelCounts,
    pub risk_counts: LabelCounts,
    pub cluster_counts: LabelCounts,
    pub avg_score: f64,
    /// Sample count
    pub n: usize,
}

/// Cached form of the statistics, tagged with the batch that produced them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub batch_id: Uuid,
    pub computed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: AggregateStatistics,
}

impl StatsSnapshot {
    pub fn new(batch_id: Uuid, stats: AggregateStatistics) -> Self {
        Self {
            batch_id,
            computed_at: Utc::now(),
            stats,
        }
    }
}

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Histogram bin for a score
///
/// Half-open bins; everything from 15 up (including out-of-range values)
/// lands in the last bin.
pub fn score_bin(score: f64) -> usize {
    if score < 5.0 {
        0
    } else if score < 10.0 {
        1
    } else if score < 15.0 {
        2
    } else {
        3
    }
}

fn count_first_seen<T, L>(items: &[T], label: L) -> LabelCounts
where
    T: Eq + Hash,
    L: Fn(&T) -> String,
{
    let mut index: HashMap<&T, usize> = HashMap::new();
    let mut labels = Vec::new();
    let mut counts = Vec::new();

    for item in items {
        match index.get(item) {
            Some(&i) => counts[i] += 1,
            None => {
                index.insert(item, labels.len());
                labels.push(label(item));
                counts.push(1);
            }
        }
    }

    LabelCounts { labels, counts }
}

/// Build the summary from parallel prediction sequences
///
/// An empty batch is valid and yields zero counts and `avg_score == 0.0`.
pub fn build_statistics(
    scores: &[f64],
    risk_categories: &[String],
    clusters: &[usize],
) -> Result<AggregateStatistics, PredictError> {
    if scores.len() != risk_categories.len() || scores.len() != clusters.len() {
        return Err(PredictError::Internal(format!(
            "prediction lengths differ: {} scores, {} risk categories, {} clusters",
            scores.len(),
            risk_categories.len(),
            clusters.len()
        )));
    }

    let mut bins = [0usize; 4];
    for &score in scores {
        bins[score_bin(score)] += 1;
    }

    let avg_score = if scores.is_empty() {
        0.0
    } else {
        round2(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    Ok(AggregateStatistics {
        score_hist: LabelCounts {
            labels: SCORE_BIN_LABELS.iter().map(|s| s.to_string()).collect(),
            counts: bins.to_vec(),
        },
        risk_counts: count_first_seen(risk_categories, |r| r.clone()),
        cluster_counts: count_first_seen(clusters, |c| c.to_string()),
        avg_score,
        n: scores.len(),
    })
}
