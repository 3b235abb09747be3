// Markdown report: run parameters, topics and yearly trends in one file.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::{LdaParams, TopicTerms};
use crate::temporal::{by_year, TopicYearMean};

/// Everything the report shows. `means` is absent when the run stopped
/// before the metadata join.
pub struct ReportInput<'a> {
    pub params: &'a LdaParams,
    pub alpha: f64,
    pub documents: usize,
    pub terms: usize,
    pub sparsity: f64,
    pub dropped: &'a [String],
    pub topics: &'a [TopicTerms],
    pub means: Option<&'a [TopicYearMean]>,
}

pub fn render_report(input: &ReportInput<'_>, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Topic Trend Report\n");
    let _ = writeln!(
        md,
        "Generated {}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let _ = writeln!(md, "## Run parameters\n");
    let _ = writeln!(md, "| Parameter | Value |");
    let _ = writeln!(md, "|---|---|");
    let _ = writeln!(md, "| Topics (K) | {} |", input.params.topics);
    let _ = writeln!(md, "| Alpha | {:.4} |", input.alpha);
    let _ = writeln!(md, "| Beta | {} |", input.params.beta);
    let _ = writeln!(md, "| Iterations | {} |", input.params.iterations);
    let _ = writeln!(md, "| Burn-in | {} |", input.params.burn_in);
    let _ = writeln!(md, "| Seed | {} |", input.params.seed);
    let _ = writeln!(md, "| Sparsity threshold | {} |", input.sparsity);
    let _ = writeln!(md, "| Documents | {} |", input.documents);
    let _ = writeln!(md, "| Terms | {} |", input.terms);

    if !input.dropped.is_empty() {
        let _ = writeln!(
            md,
            "\n{} documents had no terms left after sparsity reduction and were dropped:\n",
            input.dropped.len()
        );
        for id in input.dropped {
            let _ = writeln!(md, "- `{id}`");
        }
    }

    let _ = writeln!(md, "\n## Topics\n");
    for topic in input.topics {
        let _ = writeln!(md, "### Topic {}: {}\n", topic.topic, topic.label());
        let _ = writeln!(md, "| Term | Beta |");
        let _ = writeln!(md, "|---|---|");
        for (term, beta) in &topic.terms {
            let _ = writeln!(md, "| {term} | {beta:.4} |");
        }
        let _ = writeln!(md);
    }

    if let Some(means) = input.means {
        let years = by_year(means);
        let _ = writeln!(md, "## Mean topic proportion by year\n");

        let mut header = String::from("| Year |");
        let mut rule = String::from("|---|");
        for topic in input.topics {
            let _ = write!(header, " {} |", topic.topic);
            rule.push_str("---|");
        }
        let _ = writeln!(md, "{header}\n{rule}");

        for (year, values) in &years {
            let mut line = format!("| {year} |");
            for topic in input.topics {
                match values.iter().find(|(t, _)| *t == topic.topic) {
                    Some((_, g)) => {
                        let _ = write!(line, " {g:.3} |");
                    }
                    None => line.push_str(" - |"),
                }
            }
            let _ = writeln!(md, "{line}");
        }
    }

    md
}

/// Render and write the report, creating the parent directory if needed.
pub fn write_report(input: &ReportInput<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_report(input, Utc::now()))
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
