// End-to-end pipeline stages wired to configuration and the output directory.
//
// Each stage takes the previous stage's value as an argument; nothing is
// shared through globals. `trends` reads `gamma.csv` so it can run in a
// later invocation than `topics`.

pub mod topics;
pub mod trends;
pub mod tune;

use anyhow::Result;
use tracing::info;

use crate::config::Config;
use crate::corpus::loader::load_corpus;
use crate::corpus::normalize::Normalizer;
use crate::error::PipelineError;
use crate::matrix::DocumentTermMatrix;
use crate::output::markdown::{write_report, ReportInput};

pub use topics::{fit_model, fit_topics, TopicRun};
pub use trends::{load_gamma, load_topic_labels, trends, TrendRun};
pub use tune::tune;

pub const BETA_CSV: &str = "beta.csv";
pub const GAMMA_CSV: &str = "gamma.csv";
pub const DATED_GAMMA_CSV: &str = "gamma_by_year.csv";
pub const MEANS_CSV: &str = "topic_year_means.csv";
pub const SWEEP_CSV: &str = "sweep.csv";
pub const LDAVIS_JSON: &str = "ldavis.json";
pub const REPORT_MD: &str = "report.md";

/// Every artifact a full run can leave in the output directory, in the
/// order the stages produce them.
pub const ARTIFACTS: [&str; 7] = [
    SWEEP_CSV,
    BETA_CSV,
    GAMMA_CSV,
    LDAVIS_JSON,
    DATED_GAMMA_CSV,
    MEANS_CSV,
    REPORT_MD,
];

/// The reduced matrix a model is fitted on, plus what reduction removed.
#[derive(Debug, Clone)]
pub struct PreparedCorpus {
    pub matrix: DocumentTermMatrix,
    /// Documents whose rows were empty after sparsity reduction
    pub dropped: Vec<String>,
    pub loaded: usize,
    /// Vocabulary size before sparsity reduction
    pub raw_terms: usize,
}

/// Load, normalize, vectorize, reduce and drop empty rows.
pub fn prepare_matrix(config: &Config) -> Result<PreparedCorpus> {
    let documents = load_corpus(&config.corpus_dir)?;
    let normalizer = Normalizer::new(&config.extra_stopwords);
    let normalized = normalizer.normalize_corpus(&documents);

    let full = DocumentTermMatrix::from_documents(&normalized, config.min_word_len);
    let reduced = full.remove_sparse_terms(config.sparsity)?;
    let (matrix, dropped) = reduced.drop_empty_rows();

    if matrix.n_documents() == 0 {
        return Err(PipelineError::EmptyCorpus(format!(
            "{} (no document kept a term at sparsity {})",
            config.corpus_dir.display(),
            config.sparsity
        ))
        .into());
    }

    info!(
        loaded = documents.len(),
        kept = matrix.n_documents(),
        dropped = dropped.len(),
        raw_terms = full.n_terms(),
        terms = matrix.n_terms(),
        "Corpus prepared"
    );

    Ok(PreparedCorpus {
        matrix,
        dropped,
        loaded: documents.len(),
        raw_terms: full.n_terms(),
    })
}

/// Write `report.md` for a topic run and, when available, its trends.
pub fn write_run_report(config: &Config, run: &TopicRun, trends: Option<&TrendRun>) -> Result<()> {
    let input = ReportInput {
        params: &run.params,
        alpha: run.model.alpha(),
        documents: run.prepared.matrix.n_documents(),
        terms: run.prepared.matrix.n_terms(),
        sparsity: config.sparsity,
        dropped: &run.prepared.dropped,
        topics: &run.top_terms,
        means: trends.map(|t| t.means.as_slice()),
    };
    let path = config.output_dir.join(REPORT_MD);
    write_report(&input, &path)?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

