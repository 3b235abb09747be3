// Corpus loader: one document per file in a flat directory.
//
// Files are sorted by name so the document order (and therefore every table
// derived from it) is the same on every platform and every run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::Document;
use crate::error::PipelineError;

/// Read every regular, non-hidden file in `dir` as a document.
///
/// Invalid UTF-8 is replaced rather than rejected; scanned archives
/// routinely contain a stray byte or two.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read corpus directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(PipelineError::EmptyCorpus(dir.display().to_string()).into());
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(document = %id, bytes = bytes.len(), "Loaded document");
        documents.push(Document {
            id,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        });
    }

    info!(documents = documents.len(), dir = %dir.display(), "Corpus loaded");
    Ok(documents)
}
