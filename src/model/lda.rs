// Latent Dirichlet Allocation fitted by collapsed Gibbs sampling.
//
// Each token carries a topic assignment z. One sweep resamples every token
// from its full conditional
//
//   p(z = k | rest) ∝ (n_dk + α) * (n_kw + β) / (n_k + Vβ)
//
// with the token's own assignment removed from the counts. Point estimates
// are read off the final state:
//
//   φ_kw = (n_kw + β) / (n_k + Vβ)      θ_dk = (n_dk + α) / (n_d + Kα)
//
// so every row of φ and θ is a probability simplex by construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::special::ln_gamma;
use crate::error::PipelineError;
use crate::matrix::DocumentTermMatrix;

/// Sampler settings. Defaults follow the common Gibbs LDA conventions:
/// α = 50/K, β = 0.1, 2000 iterations, no burn-in.
#[derive(Debug, Clone, PartialEq)]
pub struct LdaParams {
    /// Number of topics K (at least 2)
    pub topics: usize,
    /// Document-topic prior; `None` means 50 / K
    pub alpha: Option<f64>,
    /// Topic-term prior
    pub beta: f64,
    /// Sampling sweeps after burn-in
    pub iterations: usize,
    /// Sweeps run and discarded before `iterations`
    pub burn_in: usize,
    /// Record the log-likelihood every `keep` post-burn-in sweeps (0 = never)
    pub keep: usize,
    pub seed: u64,
}

impl LdaParams {
    pub fn new(topics: usize, seed: u64) -> Self {
        Self {
            topics,
            alpha: None,
            beta: 0.1,
            iterations: 2000,
            burn_in: 0,
            keep: 0,
            seed,
        }
    }

    pub fn effective_alpha(&self) -> f64 {
        self.alpha.unwrap_or(50.0 / self.topics as f64)
    }
}

/// A fitted topic model: the final Gibbs state plus what was recorded on
/// the way.
#[derive(Debug, Clone)]
pub struct LdaModel {
    topics: usize,
    alpha: f64,
    beta: f64,
    documents: Vec<String>,
    terms: Vec<String>,
    /// [doc][topic]
    ndk: Vec<Vec<u32>>,
    /// [topic][term]
    nkw: Vec<Vec<u32>>,
    /// [topic]
    nk: Vec<u64>,
    /// [doc]
    nd: Vec<u64>,
    log_likelihoods: Vec<f64>,
}

impl LdaModel {
    pub fn fit(dtm: &DocumentTermMatrix, params: &LdaParams) -> Result<Self, PipelineError> {
        Self::fit_with_progress(dtm, params, |_| {})
    }

    /// Fit, calling `on_iteration` with the 1-based sweep number after
    /// every sweep (burn-in included).
    pub fn fit_with_progress<F>(
        dtm: &DocumentTermMatrix,
        params: &LdaParams,
        mut on_iteration: F,
    ) -> Result<Self, PipelineError>
    where
        F: FnMut(usize),
    {
        if params.topics < 2 {
            return Err(PipelineError::InvalidTopicCount(params.topics));
        }
        if params.iterations == 0 {
            return Err(PipelineError::NoIterations);
        }
        let alpha = params.effective_alpha();
        let beta = params.beta;
        for (name, value) in [("alpha", alpha), ("beta", beta)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PipelineError::InvalidPrior { name, value });
            }
        }
        // A document with no tokens has no defined topic mixture.
        dtm.ensure_no_empty_rows()?;

        let k = params.topics;
        let v = dtm.n_terms();
        let d = dtm.n_documents();
        let v_beta = v as f64 * beta;

        let mut rng = StdRng::seed_from_u64(params.seed);

        // Expand rows into token streams: term index repeated `count` times
        let tokens: Vec<Vec<usize>> = (0..d)
            .map(|doc| {
                dtm.row(doc)
                    .iter()
                    .flat_map(|&(t, n)| std::iter::repeat(t).take(n as usize))
                    .collect()
            })
            .collect();

        let mut ndk = vec![vec![0u32; k]; d];
        let mut nkw = vec![vec![0u32; v]; k];
        let mut nk = vec![0u64; k];
        let nd: Vec<u64> = tokens.iter().map(|t| t.len() as u64).collect();

        let mut z: Vec<Vec<usize>> = Vec::with_capacity(d);
        for (doc, words) in tokens.iter().enumerate() {
            let mut assignments = Vec::with_capacity(words.len());
            for &w in words {
                let topic = rng.random_range(0..k);
                assignments.push(topic);
                ndk[doc][topic] += 1;
                nkw[topic][w] += 1;
                nk[topic] += 1;
            }
            z.push(assignments);
        }

        info!(
            topics = k,
            documents = d,
            terms = v,
            tokens = nd.iter().sum::<u64>(),
            alpha,
            beta,
            seed = params.seed,
            "Fitting LDA by Gibbs sampling"
        );

        let mut model = Self {
            topics: k,
            alpha,
            beta,
            documents: dtm.documents().to_vec(),
            terms: dtm.terms().to_vec(),
            ndk,
            nkw,
            nk,
            nd,
            log_likelihoods: Vec::new(),
        };

        let total = params.burn_in + params.iterations;
        let mut weights = vec![0.0f64; k];

        for sweep in 1..=total {
            for (doc, words) in tokens.iter().enumerate() {
                for (pos, &w) in words.iter().enumerate() {
                    let old = z[doc][pos];
                    model.ndk[doc][old] -= 1;
                    model.nkw[old][w] -= 1;
                    model.nk[old] -= 1;

                    let mut sum = 0.0;
                    for (topic, weight) in weights.iter_mut().enumerate() {
                        let left = model.ndk[doc][topic] as f64 + alpha;
                        let right =
                            (model.nkw[topic][w] as f64 + beta) / (model.nk[topic] as f64 + v_beta);
                        sum += left * right;
                        *weight = sum;
                    }

                    let u = rng.random::<f64>() * sum;
                    let new = weights.iter().position(|&c| u < c).unwrap_or(k - 1);

                    z[doc][pos] = new;
                    model.ndk[doc][new] += 1;
                    model.nkw[new][w] += 1;
                    model.nk[new] += 1;
                }
            }

            if params.keep > 0 && sweep > params.burn_in && (sweep - params.burn_in) % params.keep == 0
            {
                let ll = model.log_likelihood();
                debug!(sweep, log_likelihood = ll, "Recorded log-likelihood");
                model.log_likelihoods.push(ll);
            }

            on_iteration(sweep);
        }

        info!(
            topics = k,
            log_likelihood = model.log_likelihood(),
            "LDA fit complete"
        );
        Ok(model)
    }

    pub fn topics(&self) -> usize {
        self.topics
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Token count per document as seen by the sampler.
    pub fn document_lengths(&self) -> &[u64] {
        &self.nd
    }

    /// Log-likelihoods recorded every `keep` sweeps after burn-in.
    pub fn log_likelihoods(&self) -> &[f64] {
        &self.log_likelihoods
    }

    /// log p(w | z) of the current state, with φ integrated out.
    pub fn log_likelihood(&self) -> f64 {
        let v = self.terms.len() as f64;
        let lg_beta = ln_gamma(self.beta);
        let mut ll = self.topics as f64 * ln_gamma(v * self.beta);
        for (row, &total) in self.nkw.iter().zip(&self.nk) {
            // Zero cells contribute lnΓ(β) - lnΓ(β) = 0
            for &count in row {
                if count > 0 {
                    ll += ln_gamma(count as f64 + self.beta) - lg_beta;
                }
            }
            ll -= ln_gamma(total as f64 + v * self.beta);
        }
        ll
    }

    /// Term distribution per topic, K rows of length V.
    pub fn phi(&self) -> Vec<Vec<f64>> {
        let v_beta = self.terms.len() as f64 * self.beta;
        self.nkw
            .iter()
            .zip(&self.nk)
            .map(|(row, &total)| {
                let denom = total as f64 + v_beta;
                row.iter()
                    .map(|&n| (n as f64 + self.beta) / denom)
                    .collect()
            })
            .collect()
    }

    /// Topic distribution per document, D rows of length K.
    pub fn theta(&self) -> Vec<Vec<f64>> {
        let k_alpha = self.topics as f64 * self.alpha;
        self.ndk
            .iter()
            .zip(&self.nd)
            .map(|(row, &len)| {
                let denom = len as f64 + k_alpha;
                row.iter()
                    .map(|&n| (n as f64 + self.alpha) / denom)
                    .collect()
            })
            .collect()
    }
}
