// Join topic proportions with publication years and aggregate per year.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::{info, warn};

use super::{BETA_CSV, DATED_GAMMA_CSV, GAMMA_CSV, MEANS_CSV};
use crate::config::Config;
use crate::metadata::{join_years, load_years, DatedGammaRow};
use crate::model::{top_terms_from_beta, GammaRow, TopicTerms};
use crate::output::tables::{
    read_beta_csv, read_gamma_csv, write_dated_gamma_csv, write_means_csv,
};
use crate::temporal::{aggregate_by_year, TopicYearMean, YearSeries};

#[derive(Debug, Clone)]
pub struct TrendRun {
    pub dated: Vec<DatedGammaRow>,
    pub means: Vec<TopicYearMean>,
}

impl TrendRun {
    /// Topic numbers present in the means, ascending.
    pub fn topics(&self) -> Vec<usize> {
        self.means
            .iter()
            .map(|m| m.topic)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn series(&self, topic: usize, frequency: usize) -> Result<YearSeries> {
        YearSeries::from_means(&self.means, topic, frequency)
    }
}

/// Read `gamma.csv` from a previous `topics` run.
pub fn load_gamma(config: &Config) -> Result<Vec<GammaRow>> {
    let path = config.output_dir.join(GAMMA_CSV);
    if !path.is_file() {
        anyhow::bail!(
            "No topic proportions at {}. Run `topictrend topics` first.",
            path.display()
        );
    }
    read_gamma_csv(&path)
}

/// Top terms for `topics`, rebuilt from `beta.csv` of a previous `topics`
/// run. Topics the table does not cover, or every topic when the file is
/// absent, come back with no terms.
pub fn load_topic_labels(config: &Config, topics: &[usize]) -> Result<Vec<TopicTerms>> {
    let path = config.output_dir.join(BETA_CSV);
    let ranked = if path.is_file() {
        top_terms_from_beta(&read_beta_csv(&path)?, config.top_terms)
    } else {
        warn!(path = %path.display(), "No term table; topics shown without labels");
        Vec::new()
    };

    Ok(topics
        .iter()
        .map(|&topic| {
            ranked
                .iter()
                .find(|t| t.topic == topic)
                .cloned()
                .unwrap_or_else(|| TopicTerms {
                    topic,
                    terms: Vec::new(),
                })
        })
        .collect())
}

/// Load years for every document in `gamma`, join, aggregate, and write
/// `gamma_by_year.csv` and `topic_year_means.csv`.
pub fn trends(config: &Config, gamma: &[GammaRow]) -> Result<TrendRun> {
    let documents: Vec<String> = gamma
        .iter()
        .map(|r| r.document.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let years = load_years(&config.metadata_dir, &documents)?;
    let dated = join_years(gamma, &years)?;
    let means = aggregate_by_year(&dated);

    let out = &config.output_dir;
    write_dated_gamma_csv(&out.join(DATED_GAMMA_CSV), &dated)?;
    write_means_csv(&out.join(MEANS_CSV), &means)?;

    info!(
        documents = documents.len(),
        rows = dated.len(),
        means = means.len(),
        "Yearly topic means written"
    );

    Ok(TrendRun { dated, means })
}
