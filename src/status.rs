// Status display: which pipeline artifacts exist in the output directory.
//
// `trends` depends on `gamma.csv` from an earlier `topics` run, so the
// listing doubles as a hint for what to run next.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::pipeline::{ARTIFACTS, GAMMA_CSV, MEANS_CSV, SWEEP_CSV};

/// One artifact and its size, if present.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactStatus {
    pub name: &'static str,
    pub bytes: Option<u64>,
}

/// Check every known artifact in `output_dir`.
pub fn collect(output_dir: &Path) -> Vec<ArtifactStatus> {
    ARTIFACTS
        .iter()
        .map(|&name| ArtifactStatus {
            name,
            bytes: std::fs::metadata(output_dir.join(name))
                .ok()
                .filter(|m| m.is_file())
                .map(|m| m.len()),
        })
        .collect()
}

/// Display configuration and artifact status to the terminal.
pub fn show(config: &Config) -> Result<()> {
    println!("Corpus: {}", describe_dir(&config.corpus_dir));
    println!("Metadata: {}", describe_dir(&config.metadata_dir));
    match config.topics {
        Some(k) => println!("Topic count: {k}"),
        None => println!("Topic count: {}", "not set".yellow()),
    }

    if !config.output_dir.is_dir() {
        println!("Output: {} (not created yet)", config.output_dir.display());
        println!("\nRun `topictrend tune` or `topictrend topics --topics K` to start.");
        return Ok(());
    }

    println!("Output: {}", config.output_dir.display());
    let artifacts = collect(&config.output_dir);
    for artifact in &artifacts {
        match artifact.bytes {
            Some(bytes) => println!("  {:<22} {}", artifact.name, format_bytes(bytes)),
            None => println!("  {:<22} {}", artifact.name, "missing".dimmed()),
        }
    }

    let present = |name: &str| artifacts.iter().any(|a| a.name == name && a.bytes.is_some());
    if !present(SWEEP_CSV) && !present(GAMMA_CSV) {
        println!("\n  Run `topictrend tune` to compare topic counts");
    } else if !present(GAMMA_CSV) {
        println!("\n  Run `topictrend topics --topics K` to fit the model");
    } else if !present(MEANS_CSV) {
        println!("\n  Run `topictrend trends` to join publication years");
    }

    Ok(())
}

fn describe_dir(dir: &Path) -> String {
    match std::fs::read_dir(dir) {
        Ok(entries) => format!("{} ({} entries)", dir.display(), entries.count()),
        Err(_) => format!("{} ({})", dir.display(), "not found".red()),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
