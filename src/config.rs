use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::matrix::DEFAULT_MIN_WORD_LEN;
use crate::model::LdaParams;
use crate::tuning::{Metric, SweepConfig};

/// Central configuration loaded from environment variables.
///
/// Every value has a default except the topic count, which is a judgment
/// call the operator makes after `topictrend tune`. The .env file is loaded
/// automatically at startup via dotenvy, and CLI flags override whatever is
/// loaded here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of plain-text documents, one per file
    pub corpus_dir: PathBuf,
    /// Directory of `<stem>.xml` metadata files
    pub metadata_dir: PathBuf,
    /// Where CSV, JSON and report artifacts are written
    pub output_dir: PathBuf,
    /// Terms removed in addition to the English stoplist
    pub extra_stopwords: Vec<String>,
    pub min_word_len: usize,
    /// Sparsity threshold for term removal, strictly between 0 and 1
    pub sparsity: f64,
    /// Topic count K (TOPICTREND_TOPICS); no default
    pub topics: Option<usize>,
    pub seed: u64,
    pub iterations: usize,
    pub burn_in: usize,
    /// Document-topic prior; unset means 50 / K
    pub alpha: Option<f64>,
    pub beta: f64,
    /// Candidate topic counts for `tune`
    pub sweep_candidates: Vec<usize>,
    pub sweep_metrics: Vec<Metric>,
    /// Concurrent trial fits during `tune`
    pub workers: usize,
    /// Observations per seasonal cycle in yearly series
    pub series_frequency: usize,
    /// Terms shown per topic
    pub top_terms: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Ok(Self {
            corpus_dir: env_path("TOPICTREND_CORPUS_DIR", "./corpus"),
            metadata_dir: env_path("TOPICTREND_METADATA_DIR", "./metadata"),
            output_dir: env_path("TOPICTREND_OUTPUT_DIR", "./output"),
            extra_stopwords: env::var("TOPICTREND_EXTRA_STOPWORDS")
                .map(|v| parse_word_list(&v))
                .unwrap_or_default(),
            min_word_len: env_parse("TOPICTREND_MIN_WORD_LEN", DEFAULT_MIN_WORD_LEN)?,
            sparsity: env_parse("TOPICTREND_SPARSITY", 0.95)?,
            topics: env_optional("TOPICTREND_TOPICS")?,
            seed: env_parse("TOPICTREND_SEED", 1234)?,
            iterations: env_parse("TOPICTREND_ITERATIONS", 2000)?,
            burn_in: env_parse("TOPICTREND_BURN_IN", 0)?,
            alpha: env_optional("TOPICTREND_ALPHA")?,
            beta: env_parse("TOPICTREND_BETA", 0.1)?,
            sweep_candidates: match env::var("TOPICTREND_SWEEP") {
                Ok(v) => parse_candidates(&v).context("Invalid TOPICTREND_SWEEP")?,
                Err(_) => (2..=15).collect(),
            },
            sweep_metrics: match env::var("TOPICTREND_METRICS") {
                Ok(v) => parse_metrics(&v).context("Invalid TOPICTREND_METRICS")?,
                Err(_) => Metric::ALL.to_vec(),
            },
            workers: env_parse("TOPICTREND_WORKERS", 2)?,
            series_frequency: env_parse("TOPICTREND_SERIES_FREQUENCY", 4)?,
            top_terms: env_parse("TOPICTREND_TOP_TERMS", 10)?,
        })
    }

    /// The topic count, or a message telling the operator how to pick one.
    pub fn require_topics(&self) -> Result<usize> {
        match self.topics {
            Some(k) if k >= 2 => Ok(k),
            Some(k) => anyhow::bail!("Topic count must be at least 2, got {k}"),
            None => anyhow::bail!(
                "No topic count set. Run `topictrend tune` to compare candidates,\n\
                 then pass --topics K or set TOPICTREND_TOPICS in your .env file."
            ),
        }
    }

    /// Sampler settings for the final fit.
    pub fn lda_params(&self) -> Result<LdaParams> {
        Ok(LdaParams {
            topics: self.require_topics()?,
            alpha: self.alpha,
            beta: self.beta,
            iterations: self.iterations,
            burn_in: self.burn_in,
            keep: 0,
            seed: self.seed,
        })
    }

    /// Sweep settings; uses the sweep's own burn-in and sampling interval.
    pub fn sweep_config(&self) -> SweepConfig {
        let mut sweep = SweepConfig::new(self.sweep_candidates.clone(), self.seed);
        sweep.metrics = self.sweep_metrics.clone();
        sweep.workers = self.workers;
        sweep.params.alpha = self.alpha;
        sweep.params.beta = self.beta;
        sweep.params.iterations = self.iterations;
        sweep
    }
}

fn env_path(name: &str, default: &str) -> PathBuf {
    env::var(name)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn env_optional<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {name}: {raw:?}")),
        _ => Ok(None),
    }
}

/// Split a comma-separated word list, dropping blanks.
pub fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Parse candidate topic counts: comma-separated numbers and ranges, with
/// an optional step, e.g. `2,4,8`, `2-20`, `5-50/5`.
pub fn parse_candidates(raw: &str) -> Result<Vec<usize>> {
    let mut out: Vec<usize> = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (range, step) = match part.split_once('/') {
            Some((r, s)) => (r, s.trim().parse::<usize>().context("Invalid step")?),
            None => (part, 1),
        };
        if step == 0 {
            anyhow::bail!("Step must be positive in {part:?}");
        }
        match range.split_once('-') {
            Some((lo, hi)) => {
                let lo: usize = lo.trim().parse().with_context(|| format!("Invalid range {part:?}"))?;
                let hi: usize = hi.trim().parse().with_context(|| format!("Invalid range {part:?}"))?;
                if lo > hi {
                    anyhow::bail!("Empty range {part:?}");
                }
                out.extend((lo..=hi).step_by(step));
            }
            None => out.push(
                range
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid topic count {part:?}"))?,
            ),
        }
    }
    out.sort_unstable();
    out.dedup();
    if out.is_empty() {
        anyhow::bail!("No candidate topic counts in {raw:?}");
    }
    Ok(out)
}

pub fn parse_metrics(raw: &str) -> Result<Vec<Metric>> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| m.parse::<Metric>())
        .collect()
}
