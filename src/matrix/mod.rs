// Sparse document-term matrix.
//
// Rows are documents in corpus order, columns are the vocabulary sorted
// alphabetically. Each row stores only its non-zero cells as
// (term index, count) pairs, ordered by term index.

pub mod reduce;

use std::collections::BTreeMap;

use tracing::info;

use crate::corpus::NormalizedDocument;

/// Default minimum token length, in chars. Shorter tokens are not counted.
pub const DEFAULT_MIN_WORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTermMatrix {
    documents: Vec<String>,
    terms: Vec<String>,
    rows: Vec<Vec<(usize, u32)>>,
}

impl DocumentTermMatrix {
    /// Count whitespace tokens of each normalized document.
    pub fn from_documents(documents: &[NormalizedDocument], min_word_len: usize) -> Self {
        let counted: Vec<BTreeMap<&str, u32>> = documents
            .iter()
            .map(|doc| {
                let mut counts = BTreeMap::new();
                for token in doc.tokens() {
                    if token.chars().count() >= min_word_len {
                        *counts.entry(token).or_insert(0) += 1;
                    }
                }
                counts
            })
            .collect();

        let mut vocabulary: Vec<&str> = counted.iter().flat_map(|c| c.keys().copied()).collect();
        vocabulary.sort_unstable();
        vocabulary.dedup();

        let index: BTreeMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (*t, i))
            .collect();

        // BTreeMap iteration is sorted, and so is `vocabulary`, so each row
        // comes out ordered by term index.
        let rows = counted
            .iter()
            .map(|counts| counts.iter().map(|(t, n)| (index[t], *n)).collect())
            .collect();

        let dtm = Self {
            documents: documents.iter().map(|d| d.id.clone()).collect(),
            terms: vocabulary.into_iter().map(str::to_string).collect(),
            rows,
        };
        info!(
            documents = dtm.n_documents(),
            terms = dtm.n_terms(),
            "Document-term matrix built"
        );
        dtm
    }

    /// Assemble a matrix from parts. Rows must be sorted by term index and
    /// hold only indices below `terms.len()`; zero counts are dropped.
    pub fn from_parts(
        documents: Vec<String>,
        terms: Vec<String>,
        rows: Vec<Vec<(usize, u32)>>,
    ) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().filter(|(_, n)| *n > 0).collect())
            .collect();
        Self {
            documents,
            terms,
            rows,
        }
    }

    pub fn n_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Non-zero cells of document `doc`.
    pub fn row(&self, doc: usize) -> &[(usize, u32)] {
        &self.rows[doc]
    }

    pub fn row_sum(&self, doc: usize) -> u64 {
        self.rows[doc].iter().map(|(_, n)| *n as u64).sum()
    }

    /// Count of a single cell.
    pub fn get(&self, doc: usize, term: usize) -> u32 {
        self.rows[doc]
            .binary_search_by_key(&term, |(t, _)| *t)
            .map(|pos| self.rows[doc][pos].1)
            .unwrap_or(0)
    }

    /// Token count per document (row totals).
    pub fn document_lengths(&self) -> Vec<u64> {
        (0..self.n_documents()).map(|d| self.row_sum(d)).collect()
    }

    /// Corpus-wide count per term (column totals).
    pub fn term_frequencies(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.n_terms()];
        for row in &self.rows {
            for &(t, n) in row {
                totals[t] += n as u64;
            }
        }
        totals
    }

    /// Number of documents each term appears in.
    pub fn document_frequencies(&self) -> Vec<usize> {
        let mut df = vec![0usize; self.n_terms()];
        for row in &self.rows {
            for &(t, _) in row {
                df[t] += 1;
            }
        }
        df
    }

    pub fn total_tokens(&self) -> u64 {
        self.document_lengths().iter().sum()
    }
}
