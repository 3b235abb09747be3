// Topic-count sweep: fit one trial model per candidate K and score it.
//
// Trials are independent and CPU-bound, so they run on tokio's blocking
// pool with at most `workers` in flight. The matrix is shared read-only
// through an Arc and each trial owns its own model. Results are only
// assembled once every trial has finished; a single failed trial fails the
// whole sweep.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use super::metrics::{Direction, Metric};
use crate::error::PipelineError;
use crate::matrix::DocumentTermMatrix;
use crate::model::{LdaModel, LdaParams};

/// What to sweep and how.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Candidate topic counts, each at least 2
    pub candidates: Vec<usize>,
    pub metrics: Vec<Metric>,
    /// Trials fitted concurrently
    pub workers: usize,
    /// Sampler settings shared by every trial; `topics` is overridden
    pub params: LdaParams,
}

impl SweepConfig {
    /// Sweep defaults: all four metrics, 1000 burn-in sweeps and a
    /// log-likelihood sample every 50 sweeps for Griffiths2004.
    pub fn new(candidates: Vec<usize>, seed: u64) -> Self {
        Self {
            candidates,
            metrics: Metric::ALL.to_vec(),
            workers: 2,
            params: LdaParams {
                burn_in: 1000,
                keep: 50,
                ..LdaParams::new(2, seed)
            },
        }
    }
}

/// One row of the sweep result, for CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub metric: Metric,
    pub topics: usize,
    pub score: f64,
}

/// Scores for every (metric, candidate) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTable {
    candidates: Vec<usize>,
    metrics: Vec<Metric>,
    scores: BTreeMap<(Metric, usize), f64>,
}

impl SweepTable {
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn score(&self, metric: Metric, topics: usize) -> Option<f64> {
        self.scores.get(&(metric, topics)).copied()
    }

    /// True when every (metric, candidate) pair has a finite score.
    pub fn is_complete(&self) -> bool {
        self.metrics.iter().all(|&m| {
            self.candidates
                .iter()
                .all(|&k| self.score(m, k).is_some_and(f64::is_finite))
        })
    }

    /// Scores of one metric in candidate order.
    pub fn series(&self, metric: Metric) -> Vec<(usize, f64)> {
        self.candidates
            .iter()
            .filter_map(|&k| self.score(metric, k).map(|s| (k, s)))
            .collect()
    }

    /// Scores of one metric min-max scaled to [0, 1] so curves with very
    /// different ranges can be read together. A flat curve maps to 0.
    pub fn normalized(&self, metric: Metric) -> Vec<(usize, f64)> {
        let series = self.series(metric);
        let min = series.iter().map(|(_, s)| *s).fold(f64::INFINITY, f64::min);
        let max = series.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        series
            .into_iter()
            .map(|(k, s)| (k, if range > 0.0 { (s - min) / range } else { 0.0 }))
            .collect()
    }

    /// Candidate that scores best under one metric. Advisory only: the
    /// topic count is always chosen by the operator.
    pub fn hint(&self, metric: Metric) -> Option<usize> {
        let series = self.series(metric);
        let best = match metric.direction() {
            Direction::Maximize => series.iter().max_by(|a, b| a.1.total_cmp(&b.1)),
            Direction::Minimize => series.iter().min_by(|a, b| a.1.total_cmp(&b.1)),
        };
        best.map(|(k, _)| *k)
    }

    pub fn rows(&self) -> Vec<SweepRow> {
        self.scores
            .iter()
            .map(|(&(metric, topics), &score)| SweepRow {
                metric,
                topics,
                score,
            })
            .collect()
    }
}

/// Result of one trial fit.
struct Trial {
    topics: usize,
    scores: Vec<(Metric, f64)>,
}

fn run_trial(
    dtm: &DocumentTermMatrix,
    params: &LdaParams,
    metrics: &[Metric],
) -> Result<Trial, PipelineError> {
    let model = LdaModel::fit(dtm, params)?;
    let scores = metrics.iter().map(|&m| (m, m.score(&model))).collect();
    Ok(Trial {
        topics: params.topics,
        scores,
    })
}

/// Run the sweep. Returns once every trial has finished.
pub async fn run_sweep(dtm: Arc<DocumentTermMatrix>, config: &SweepConfig) -> Result<SweepTable> {
    if config.candidates.is_empty() {
        anyhow::bail!("No candidate topic counts to sweep");
    }
    if config.metrics.is_empty() {
        anyhow::bail!("No metrics selected for the sweep");
    }
    if let Some(&bad) = config.candidates.iter().find(|&&k| k < 2) {
        return Err(PipelineError::InvalidTopicCount(bad).into());
    }
    dtm.ensure_no_empty_rows()?;

    let mut candidates = config.candidates.clone();
    candidates.sort_unstable();
    candidates.dedup();
    let workers = config.workers.max(1);

    info!(
        candidates = candidates.len(),
        workers,
        metrics = config.metrics.len(),
        "Starting topic-count sweep"
    );

    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("  Trials [{bar:30}] {pos}/{len} ({eta})")?);

    let results: Vec<Result<Trial>> = stream::iter(candidates.iter().map(|&topics| {
        let dtm = Arc::clone(&dtm);
        let metrics = config.metrics.clone();
        let params = LdaParams {
            topics,
            ..config.params.clone()
        };
        let pb = pb.clone();
        async move {
            let trial = tokio::task::spawn_blocking(move || run_trial(&dtm, &params, &metrics))
                .await
                .context("Trial worker panicked")??;
            pb.inc(1);
            Ok::<_, anyhow::Error>(trial)
        }
    }))
    .buffer_unordered(workers)
    .collect()
    .await;
    pb.finish_and_clear();

    let mut scores = BTreeMap::new();
    for result in results {
        let trial = match result {
            Ok(trial) => trial,
            Err(e) => {
                warn!(error = %e, "Trial failed, abandoning sweep");
                return Err(e.context("Topic-count sweep failed"));
            }
        };
        for (metric, score) in trial.scores {
            scores.insert((metric, trial.topics), score);
        }
    }

    let table = SweepTable {
        candidates,
        metrics: config.metrics.clone(),
        scores,
    };
    info!(complete = table.is_complete(), "Sweep finished");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(values: &[(usize, f64)]) -> SweepTable {
        SweepTable {
            candidates: values.iter().map(|(k, _)| *k).collect(),
            metrics: vec![Metric::CaoJuan2009, Metric::Deveaud2014],
            scores: values
                .iter()
                .flat_map(|&(k, s)| {
                    [((Metric::CaoJuan2009, k), s), ((Metric::Deveaud2014, k), s)]
                })
                .collect(),
        }
    }

    #[test]
    fn test_hint_follows_direction() {
        let t = table(&[(2, 0.3), (4, 0.1), (6, 0.5)]);
        assert_eq!(t.hint(Metric::CaoJuan2009), Some(4));
        assert_eq!(t.hint(Metric::Deveaud2014), Some(6));
    }

    #[test]
    fn test_normalized_range() {
        let t = table(&[(2, 10.0), (4, 20.0), (6, 15.0)]);
        let n = t.normalized(Metric::CaoJuan2009);
        assert_eq!(n, vec![(2, 0.0), (4, 1.0), (6, 0.5)]);

        let flat = table(&[(2, 1.0), (4, 1.0)]);
        assert!(flat.normalized(Metric::CaoJuan2009).iter().all(|(_, v)| *v == 0.0));
    }

    #[test]
    fn test_completeness() {
        let t = table(&[(2, 1.0), (4, 2.0)]);
        assert!(t.is_complete());
        assert_eq!(t.rows().len(), 4);
    }
}
