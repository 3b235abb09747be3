// Tidy tables on disk.
//
// Every artifact is a headed CSV whose columns are the serde field names of
// its row type. Floats are written in shortest round-trip form, so reading a
// table back yields bit-identical values.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::metadata::DatedGammaRow;
use crate::model::{BetaRow, GammaRow};
use crate::temporal::TopicYearMean;
use crate::tuning::SweepRow;

/// Serialize rows to a CSV file, creating the parent directory if needed.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write a row to {}", path.display()))?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "Wrote table");
    Ok(())
}

/// Deserialize every row of a headed CSV file.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Malformed table in {}", path.display()))
}

pub fn write_gamma_csv(path: &Path, rows: &[GammaRow]) -> Result<()> {
    write_rows(path, rows)
}

pub fn read_gamma_csv(path: &Path) -> Result<Vec<GammaRow>> {
    read_rows(path)
}

pub fn write_dated_gamma_csv(path: &Path, rows: &[DatedGammaRow]) -> Result<()> {
    write_rows(path, rows)
}

pub fn read_dated_gamma_csv(path: &Path) -> Result<Vec<DatedGammaRow>> {
    read_rows(path)
}

pub fn write_beta_csv(path: &Path, rows: &[BetaRow]) -> Result<()> {
    write_rows(path, rows)
}

pub fn read_beta_csv(path: &Path) -> Result<Vec<BetaRow>> {
    read_rows(path)
}

pub fn write_means_csv(path: &Path, rows: &[TopicYearMean]) -> Result<()> {
    write_rows(path, rows)
}

pub fn read_means_csv(path: &Path) -> Result<Vec<TopicYearMean>> {
    read_rows(path)
}

/// Sweep scores in long form: one (metric, topics, score) row per pair.
pub fn write_sweep_csv(path: &Path, rows: &[SweepRow]) -> Result<()> {
    write_rows(path, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_header_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("gamma.csv");
        let rows = vec![
            GammaRow {
                document: "a.txt".into(),
                topic: 1,
                gamma: 0.1 + 0.2,
            },
            GammaRow {
                document: "a.txt".into(),
                topic: 2,
                gamma: 1.0 - (0.1 + 0.2),
            },
        ];
        write_gamma_csv(&path, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("document,topic,gamma\n"));
        assert_eq!(read_gamma_csv(&path).unwrap(), rows);
    }

    #[test]
    fn test_beta_header_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beta.csv");
        let rows = vec![
            BetaRow {
                topic: 1,
                term: "harbour".into(),
                beta: 0.7,
            },
            BetaRow {
                topic: 1,
                term: "grain".into(),
                beta: 1.0 / 3.0,
            },
        ];
        write_beta_csv(&path, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("topic,term,beta\n"));
        assert_eq!(read_beta_csv(&path).unwrap(), rows);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_gamma_csv(&dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn test_malformed_row_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gamma.csv");
        fs::write(&path, "document,topic,gamma\na.txt,one,0.5\n").unwrap();
        let err = read_gamma_csv(&path).unwrap_err();
        assert!(err.to_string().contains("Malformed table"));
    }
}
