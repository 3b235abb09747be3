// Fit the final topic model and persist its distributions.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::{prepare_matrix, PreparedCorpus, BETA_CSV, GAMMA_CSV, LDAVIS_JSON};
use crate::config::Config;
use crate::matrix::DocumentTermMatrix;
use crate::model::{BetaRow, GammaRow, LdaModel, LdaParams, TopicTerms};
use crate::output::ldavis::LdavisBundle;
use crate::output::tables::{write_beta_csv, write_gamma_csv};

/// Everything produced by one `topics` run.
#[derive(Debug, Clone)]
pub struct TopicRun {
    pub prepared: PreparedCorpus,
    pub params: LdaParams,
    pub model: LdaModel,
    pub beta: Vec<BetaRow>,
    pub gamma: Vec<GammaRow>,
    pub top_terms: Vec<TopicTerms>,
}

/// Fit with a progress bar over every Gibbs sweep, burn-in included.
pub fn fit_model(dtm: &DocumentTermMatrix, params: &LdaParams) -> Result<LdaModel> {
    let pb = ProgressBar::new((params.burn_in + params.iterations) as u64);
    pb.set_style(
        ProgressStyle::default_bar().template("  Sampling [{bar:30}] {pos}/{len} ({eta})")?,
    );

    let fitted = LdaModel::fit_with_progress(dtm, params, |sweep| pb.set_position(sweep as u64));
    pb.finish_and_clear();
    let model = fitted?;

    info!(
        topics = model.topics(),
        alpha = model.alpha(),
        log_likelihood = model.log_likelihood(),
        "Topic model fitted"
    );
    Ok(model)
}

/// Load through reduction, fit K topics, and write `beta.csv`,
/// `gamma.csv` and `ldavis.json`.
pub fn fit_topics(config: &Config) -> Result<TopicRun> {
    let params = config.lda_params()?;
    let prepared = prepare_matrix(config)?;
    let model = fit_model(&prepared.matrix, &params)?;

    let beta = model.beta_table();
    let gamma = model.gamma_table();
    let top_terms = model.top_terms(config.top_terms);

    let out = &config.output_dir;
    write_beta_csv(&out.join(BETA_CSV), &beta)?;
    write_gamma_csv(&out.join(GAMMA_CSV), &gamma)?;
    LdavisBundle::from_model(&model, &prepared.matrix)?.write(&out.join(LDAVIS_JSON))?;

    info!(
        output = %out.display(),
        beta_rows = beta.len(),
        gamma_rows = gamma.len(),
        "Topic tables written"
    );

    Ok(TopicRun {
        prepared,
        params,
        model,
        beta,
        gamma,
        top_terms,
    })
}
