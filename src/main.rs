use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topictrend::config::{self, Config};
use topictrend::model::TopicTerms;
use topictrend::output::terminal;
use topictrend::pipeline::{self, TopicRun, TrendRun};

/// Topictrend: topic models and topic trends for dated text corpora.
///
/// Fits an LDA topic model over a directory of plain-text documents, joins
/// each document's topic mixture with the publication year in its companion
/// XML file, and shows how topic prevalence moves over time.
#[derive(Parser)]
#[command(name = "topictrend", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare candidate topic counts under four selection metrics
    Tune {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Candidate topic counts, e.g. "2-20" or "5,10,15" or "5-50/5"
        #[arg(long)]
        candidates: Option<String>,

        /// Metrics to compute (comma-separated, default: all four)
        #[arg(long)]
        metrics: Option<String>,

        /// Number of trial fits to run in parallel
        #[arg(long)]
        workers: Option<usize>,

        /// Gibbs iterations per trial after burn-in
        #[arg(long)]
        iterations: Option<usize>,
    },

    /// Fit the topic model and write beta.csv, gamma.csv and ldavis.json
    Topics {
        #[command(flatten)]
        corpus: CorpusArgs,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Join gamma.csv with publication years and show yearly trends
    Trends {
        #[command(flatten)]
        trend: TrendArgs,

        /// Output directory holding gamma.csv
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Fit the model and compute trends in one go
    Run {
        #[command(flatten)]
        corpus: CorpusArgs,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        trend: TrendArgs,
    },

    /// Show configuration and which artifacts exist
    Status,
}

#[derive(Args)]
struct CorpusArgs {
    /// Directory of plain-text documents
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Directory for CSV, JSON and report output
    #[arg(long)]
    output: Option<PathBuf>,

    /// Drop terms absent from more than this share of documents (0 < s < 1)
    #[arg(long)]
    sparsity: Option<f64>,

    /// Ignore terms shorter than this many characters
    #[arg(long)]
    min_word_len: Option<usize>,

    /// Extra stopwords, comma-separated
    #[arg(long)]
    stopwords: Option<String>,
}

#[derive(Args)]
struct ModelArgs {
    /// Number of topics K
    #[arg(long, short = 'k')]
    topics: Option<usize>,

    /// Gibbs iterations after burn-in
    #[arg(long)]
    iterations: Option<usize>,

    /// Gibbs iterations discarded before sampling
    #[arg(long)]
    burn_in: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Document-topic prior (default: 50 / K)
    #[arg(long)]
    alpha: Option<f64>,

    /// Topic-term prior
    #[arg(long)]
    beta: Option<f64>,

    /// Terms to show per topic
    #[arg(long)]
    top_terms: Option<usize>,
}

#[derive(Args)]
struct TrendArgs {
    /// Directory of <stem>.xml metadata files
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Show autocorrelation and decomposition for this topic
    #[arg(long)]
    topic: Option<usize>,

    /// Observations per seasonal cycle for decomposition
    #[arg(long)]
    frequency: Option<usize>,

    /// Highest autocorrelation lag to show
    #[arg(long, default_value = "5")]
    max_lag: usize,
}

impl CorpusArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.corpus {
            config.corpus_dir = dir.clone();
        }
        if let Some(dir) = &self.output {
            config.output_dir = dir.clone();
        }
        if let Some(s) = self.sparsity {
            config.sparsity = s;
        }
        if let Some(n) = self.min_word_len {
            config.min_word_len = n;
        }
        if let Some(words) = &self.stopwords {
            config.extra_stopwords.extend(config::parse_word_list(words));
        }
    }
}

impl ModelArgs {
    fn apply(&self, config: &mut Config) {
        if self.topics.is_some() {
            config.topics = self.topics;
        }
        if let Some(n) = self.iterations {
            config.iterations = n;
        }
        if let Some(n) = self.burn_in {
            config.burn_in = n;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.alpha.is_some() {
            config.alpha = self.alpha;
        }
        if let Some(beta) = self.beta {
            config.beta = beta;
        }
        if let Some(n) = self.top_terms {
            config.top_terms = n;
        }
    }
}

impl TrendArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.metadata {
            config.metadata_dir = dir.clone();
        }
        if let Some(f) = self.frequency {
            config.series_frequency = f;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topictrend=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tune {
            corpus,
            candidates,
            metrics,
            workers,
            iterations,
        } => {
            let mut config = Config::load()?;
            corpus.apply(&mut config);
            if let Some(raw) = candidates {
                config.sweep_candidates = config::parse_candidates(&raw)?;
            }
            if let Some(raw) = metrics {
                config.sweep_metrics = config::parse_metrics(&raw)?;
            }
            if let Some(n) = workers {
                config.workers = n;
            }
            if let Some(n) = iterations {
                config.iterations = n;
            }

            println!(
                "Sweeping {} candidate topic counts ({} workers)...",
                config.sweep_candidates.len(),
                config.workers
            );
            let table = pipeline::tune(&config).await?;
            terminal::display_sweep(&table);
        }

        Commands::Topics { corpus, model } => {
            let mut config = Config::load()?;
            corpus.apply(&mut config);
            model.apply(&mut config);

            let run = fit_and_show(&config)?;
            pipeline::write_run_report(&config, &run, None)?;

            println!(
                "\n{}",
                format!("Topic tables saved to: {}", config.output_dir.display()).bold()
            );
            println!("Next: run `topictrend trends` to join publication years.");
        }

        Commands::Trends { trend, output } => {
            let mut config = Config::load()?;
            trend.apply(&mut config);
            if let Some(dir) = output {
                config.output_dir = dir;
            }

            let gamma = pipeline::load_gamma(&config)?;
            println!("Joining {} topic proportions with publication years...", gamma.len());
            let trends = pipeline::trends(&config, &gamma)?;

            let labels = pipeline::load_topic_labels(&config, &trends.topics())?;
            show_trends(&config, &trends, &labels, &trend)?;
        }

        Commands::Run {
            corpus,
            model,
            trend,
        } => {
            let mut config = Config::load()?;
            corpus.apply(&mut config);
            model.apply(&mut config);
            trend.apply(&mut config);

            let run = fit_and_show(&config)?;
            let trends = pipeline::trends(&config, &run.gamma)?;
            show_trends(&config, &trends, &run.top_terms, &trend)?;
            pipeline::write_run_report(&config, &run, Some(&trends))?;

            println!(
                "\n{}",
                format!("Run complete. Artifacts in: {}", config.output_dir.display()).bold()
            );
        }

        Commands::Status => {
            let config = Config::load()?;
            topictrend::status::show(&config)?;
        }
    }

    Ok(())
}

/// Fit the configured model and print its corpus summary and top terms.
fn fit_and_show(config: &Config) -> Result<TopicRun> {
    let k = config.require_topics()?;
    println!(
        "Fitting {k} topics on {} ({} iterations)...",
        config.corpus_dir.display(),
        config.iterations
    );

    let run = pipeline::fit_topics(config)?;
    let prepared = &run.prepared;
    println!(
        "  {} documents, {} of {} terms kept at sparsity {}",
        prepared.matrix.n_documents(),
        prepared.matrix.n_terms(),
        prepared.raw_terms,
        config.sparsity
    );
    terminal::display_dropped_documents(&prepared.dropped);
    terminal::display_top_terms(&run.top_terms);

    info!(
        documents = prepared.loaded,
        log_likelihood = run.model.log_likelihood(),
        "Fit complete"
    );
    Ok(run)
}

fn show_trends(
    config: &Config,
    trends: &TrendRun,
    labels: &[TopicTerms],
    args: &TrendArgs,
) -> Result<()> {
    terminal::display_yearly_trends(&trends.means, labels);

    if let Some(topic) = args.topic {
        let series = trends.series(topic, config.series_frequency)?;
        terminal::display_series_diagnostics(&series, args.max_lag);
    } else {
        println!(
            "{}",
            "Pass --topic N to see autocorrelation and decomposition for one topic.".dimmed()
        );
    }
    Ok(())
}
