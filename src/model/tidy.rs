// Tidy views of a fitted model: one row per (topic, term) and one row per
// (document, topic). Pure reshaping of φ and θ. Topic numbers are 1-based
// in every table a user sees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lda::LdaModel;

/// Probability of a term under a topic (φ).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaRow {
    pub topic: usize,
    pub term: String,
    pub beta: f64,
}

/// Probability of a topic within a document (θ).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaRow {
    pub document: String,
    pub topic: usize,
    pub gamma: f64,
}

/// The highest-probability terms of one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTerms {
    pub topic: usize,
    pub terms: Vec<(String, f64)>,
}

impl TopicTerms {
    /// Label from the first three terms, e.g. "war / army / peace".
    pub fn label(&self) -> String {
        self.terms
            .iter()
            .take(3)
            .map(|(t, _)| t.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Rebuild each topic's `n` most probable terms from a beta table, such as
/// one read back from `beta.csv`. Ties keep the table's term order.
pub fn top_terms_from_beta(rows: &[BetaRow], n: usize) -> Vec<TopicTerms> {
    let mut by_topic: BTreeMap<usize, Vec<(String, f64)>> = BTreeMap::new();
    for row in rows {
        by_topic
            .entry(row.topic)
            .or_default()
            .push((row.term.clone(), row.beta));
    }

    by_topic
        .into_iter()
        .map(|(topic, mut terms)| {
            terms.sort_by(|a, b| b.1.total_cmp(&a.1));
            terms.truncate(n);
            TopicTerms { topic, terms }
        })
        .collect()
}

impl LdaModel {
    /// (topic, term, beta) for every topic and term, topic-major.
    pub fn beta_table(&self) -> Vec<BetaRow> {
        let terms = self.terms();
        self.phi()
            .into_iter()
            .enumerate()
            .flat_map(|(k, row)| {
                row.into_iter().enumerate().map(move |(w, beta)| BetaRow {
                    topic: k + 1,
                    term: terms[w].clone(),
                    beta,
                })
            })
            .collect()
    }

    /// (document, topic, gamma) for every document and topic, document-major.
    pub fn gamma_table(&self) -> Vec<GammaRow> {
        let documents = self.documents();
        self.theta()
            .into_iter()
            .enumerate()
            .flat_map(|(d, row)| {
                row.into_iter().enumerate().map(move |(k, gamma)| GammaRow {
                    document: documents[d].clone(),
                    topic: k + 1,
                    gamma,
                })
            })
            .collect()
    }

    /// The `n` most probable terms of each topic, ties broken by term order.
    pub fn top_terms(&self, n: usize) -> Vec<TopicTerms> {
        let terms = self.terms();
        self.phi()
            .into_iter()
            .enumerate()
            .map(|(k, row)| {
                let mut ranked: Vec<(usize, f64)> = row.into_iter().enumerate().collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                TopicTerms {
                    topic: k + 1,
                    terms: ranked
                        .into_iter()
                        .take(n)
                        .map(|(w, p)| (terms[w].clone(), p))
                        .collect(),
                }
            })
            .collect()
    }
}
