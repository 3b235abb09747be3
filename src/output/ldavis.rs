// Input bundle for LDAvis-style interactive topic browsers.
//
// The browser needs the two distributions plus corpus statistics that the
// model alone does not carry: per-document token counts and per-term corpus
// frequencies. Both come from the same matrix the model was fitted on.

use std::fs;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::matrix::DocumentTermMatrix;
use crate::model::LdaModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LdavisBundle {
    /// Topic-term distributions, K rows over the vocabulary
    pub phi: Vec<Vec<f64>>,
    /// Document-topic distributions, D rows over K topics
    pub theta: Vec<Vec<f64>>,
    pub doc_length: Vec<u64>,
    pub vocab: Vec<String>,
    pub term_frequency: Vec<u64>,
}

impl LdavisBundle {
    /// Assemble the bundle. The matrix must be the one the model was fitted on.
    pub fn from_model(model: &LdaModel, dtm: &DocumentTermMatrix) -> Result<Self> {
        if model.terms() != dtm.terms() {
            anyhow::bail!(
                "Vocabulary mismatch: model has {} terms, matrix has {}",
                model.terms().len(),
                dtm.n_terms()
            );
        }
        if model.documents() != dtm.documents() {
            anyhow::bail!(
                "Document mismatch: model has {} documents, matrix has {}",
                model.documents().len(),
                dtm.n_documents()
            );
        }

        Ok(Self {
            phi: model.phi(),
            theta: model.theta(),
            doc_length: dtm.document_lengths(),
            vocab: dtm.terms().to_vec(),
            term_frequency: dtm.term_frequencies(),
        })
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(
            path = %path.display(),
            topics = self.phi.len(),
            terms = self.vocab.len(),
            "Wrote LDAvis bundle"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::NormalizedDocument;
    use crate::model::LdaParams;

    fn matrix() -> DocumentTermMatrix {
        let docs = [
            ("a", "apple banana apple"),
            ("b", "banana cherry"),
            ("c", "cherry apple cherry"),
        ]
        .into_iter()
        .map(|(id, text)| NormalizedDocument {
            id: id.into(),
            text: text.into(),
        })
        .collect::<Vec<_>>();
        DocumentTermMatrix::from_documents(&docs, 3)
    }

    #[test]
    fn test_bundle_shapes() {
        let dtm = matrix();
        let params = LdaParams {
            iterations: 20,
            ..LdaParams::new(2, 7)
        };
        let model = LdaModel::fit(&dtm, &params).unwrap();
        let bundle = LdavisBundle::from_model(&model, &dtm).unwrap();

        assert_eq!(bundle.phi.len(), 2);
        assert_eq!(bundle.theta.len(), 3);
        assert_eq!(bundle.vocab, vec!["apple", "banana", "cherry"]);
        assert_eq!(bundle.doc_length, vec![3, 2, 3]);
        assert_eq!(bundle.term_frequency, vec![3, 2, 3]);
    }

    #[test]
    fn test_mismatched_matrix_rejected() {
        let dtm = matrix();
        let model = LdaModel::fit(
            &dtm,
            &LdaParams {
                iterations: 5,
                ..LdaParams::new(2, 1)
            },
        )
        .unwrap();
        let other = DocumentTermMatrix::from_parts(
            dtm.documents().to_vec(),
            vec!["apple".into(), "banana".into()],
            vec![vec![(0, 2), (1, 1)], vec![(1, 1)], vec![(0, 1)]],
        );
        assert!(LdavisBundle::from_model(&model, &other).is_err());
    }
}
