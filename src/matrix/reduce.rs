// Sparsity reduction and empty-row filtering.
//
// Sparsity of a term = fraction of documents it is absent from. A term is
// kept only when its document frequency is strictly greater than
// n_documents * (1 - sparse); with sparse = 0.95 a term must appear in more
// than 5% of documents. Dropping terms can leave documents with no terms at
// all, and those rows must go before the model is fitted.

use tracing::{info, warn};

use super::DocumentTermMatrix;
use crate::error::PipelineError;

impl DocumentTermMatrix {
    /// Drop terms whose sparsity exceeds `sparse`. Returns a new matrix
    /// whose vocabulary is a subset of this one, in the same order.
    pub fn remove_sparse_terms(&self, sparse: f64) -> Result<Self, PipelineError> {
        if !(sparse > 0.0 && sparse < 1.0) {
            return Err(PipelineError::InvalidSparsity(sparse));
        }

        let cutoff = self.n_documents() as f64 * (1.0 - sparse);
        let df = self.document_frequencies();

        // Old term index -> new term index for kept terms
        let mut remap = vec![None; self.n_terms()];
        let mut terms = Vec::new();
        for (old, term) in self.terms.iter().enumerate() {
            if df[old] as f64 > cutoff {
                remap[old] = Some(terms.len());
                terms.push(term.clone());
            }
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|&(t, n)| remap[t].map(|new| (new, n)))
                    .collect()
            })
            .collect();

        info!(
            sparse,
            before = self.n_terms(),
            after = terms.len(),
            "Removed sparse terms"
        );

        Ok(Self {
            documents: self.documents.clone(),
            terms,
            rows,
        })
    }

    /// Drop documents with no remaining terms. Returns the filtered matrix
    /// and the ids of the dropped documents, in corpus order.
    pub fn drop_empty_rows(&self) -> (Self, Vec<String>) {
        let mut documents = Vec::with_capacity(self.n_documents());
        let mut rows = Vec::with_capacity(self.n_documents());
        let mut dropped = Vec::new();

        for (id, row) in self.documents.iter().zip(&self.rows) {
            if row.is_empty() {
                dropped.push(id.clone());
            } else {
                documents.push(id.clone());
                rows.push(row.clone());
            }
        }

        if !dropped.is_empty() {
            warn!(
                dropped = dropped.len(),
                first = %dropped[0],
                "Dropped documents with no terms after reduction"
            );
        }

        (
            Self {
                documents,
                terms: self.terms.clone(),
                rows,
            },
            dropped,
        )
    }

    /// Fail on the first all-zero row.
    pub fn ensure_no_empty_rows(&self) -> Result<(), PipelineError> {
        match self.rows.iter().position(|row| row.is_empty()) {
            Some(i) => Err(PipelineError::EmptyDocument(self.documents[i].clone())),
            None => Ok(()),
        }
    }
}
