// Model-fit metrics for choosing a topic count.
//
// Four published heuristics, each computed from one fitted model:
//
//   Griffiths2004  harmonic mean of sampled log p(w|z)          maximise
//   CaoJuan2009    mean pairwise cosine similarity of topics    minimise
//   Arun2010       symmetric KL between singular values of φ
//                  and the length-weighted topic mass of θ      minimise
//   Deveaud2014    mean pairwise symmetric KL between topics    maximise
//
// None of them is authoritative on its own; the operator reads the curves
// side by side and picks K.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::special::{log_sum_exp, singular_values};
use crate::model::LdaModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    Griffiths2004,
    CaoJuan2009,
    Arun2010,
    Deveaud2014,
}

/// Whether a larger or smaller score is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Griffiths2004,
        Metric::CaoJuan2009,
        Metric::Arun2010,
        Metric::Deveaud2014,
    ];

    pub fn direction(self) -> Direction {
        match self {
            Metric::Griffiths2004 | Metric::Deveaud2014 => Direction::Maximize,
            Metric::CaoJuan2009 | Metric::Arun2010 => Direction::Minimize,
        }
    }

    /// Score a fitted model. Griffiths2004 falls back to the final state's
    /// log-likelihood when the fit recorded no samples.
    pub fn score(self, model: &LdaModel) -> f64 {
        match self {
            Metric::Griffiths2004 => {
                let samples = model.log_likelihoods();
                if samples.is_empty() {
                    harmonic_mean_log(&[model.log_likelihood()])
                } else {
                    harmonic_mean_log(samples)
                }
            }
            Metric::CaoJuan2009 => cao_juan(&model.phi()),
            Metric::Arun2010 => arun(&model.phi(), &model.theta(), model.document_lengths()),
            Metric::Deveaud2014 => deveaud(&model.phi()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Griffiths2004 => "Griffiths2004",
            Metric::CaoJuan2009 => "CaoJuan2009",
            Metric::Arun2010 => "Arun2010",
            Metric::Deveaud2014 => "Deveaud2014",
        };
        f.pad(name)
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "griffiths2004" | "griffiths" => Ok(Metric::Griffiths2004),
            "caojuan2009" | "caojuan" => Ok(Metric::CaoJuan2009),
            "arun2010" | "arun" => Ok(Metric::Arun2010),
            "deveaud2014" | "deveaud" => Ok(Metric::Deveaud2014),
            other => anyhow::bail!(
                "Unknown metric {other:?}; expected one of Griffiths2004, CaoJuan2009, Arun2010, Deveaud2014"
            ),
        }
    }
}

/// Log of the harmonic mean of likelihoods given their logs, computed
/// around the median so exp() never overflows.
pub fn harmonic_mean_log(log_liks: &[f64]) -> f64 {
    let mut sorted = log_liks.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };
    let shifted: Vec<f64> = log_liks.iter().map(|x| -(x - median)).collect();
    median - (log_sum_exp(&shifted) - (n as f64).ln())
}

/// Mean cosine similarity over all topic pairs.
pub fn cao_juan(phi: &[Vec<f64>]) -> f64 {
    let k = phi.len();
    let mut total = 0.0;
    for i in 0..k {
        for j in (i + 1)..k {
            total += cosine(&phi[i], &phi[j]);
        }
    }
    total / (k * (k - 1) / 2) as f64
}

/// KL(cm1 || cm2) + KL(cm2 || cm1) where cm1 are the singular values of φ
/// and cm2 is the length-weighted column mass of θ, scaled by the longest
/// document.
pub fn arun(phi: &[Vec<f64>], theta: &[Vec<f64>], doc_lengths: &[u64]) -> f64 {
    let cm1 = singular_values(phi);

    let k = phi.len();
    let longest = doc_lengths.iter().copied().max().unwrap_or(1).max(1) as f64;
    let mut cm2 = vec![0.0; k];
    for (row, &len) in theta.iter().zip(doc_lengths) {
        for (topic, g) in row.iter().enumerate() {
            cm2[topic] += len as f64 * g;
        }
    }
    for v in &mut cm2 {
        *v /= longest;
    }

    kl_term(&cm1, &cm2) + kl_term(&cm2, &cm1)
}

/// Mean symmetric KL divergence over all ordered topic pairs.
pub fn deveaud(phi: &[Vec<f64>]) -> f64 {
    let k = phi.len();
    let has_zero = phi.iter().flatten().any(|&p| p == 0.0);
    let phi: Vec<Vec<f64>> = if has_zero {
        phi.iter()
            .map(|row| row.iter().map(|p| p + f64::MIN_POSITIVE).collect())
            .collect()
    } else {
        phi.to_vec()
    };

    let mut total = 0.0;
    for i in 0..k {
        for j in (i + 1)..k {
            total += 0.5 * kl_term(&phi[i], &phi[j]) + 0.5 * kl_term(&phi[j], &phi[i]);
        }
    }
    total / (k * (k - 1)) as f64
}

fn cosine(x: &[f64], y: &[f64]) -> f64 {
    let dot: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let nx: f64 = x.iter().map(|a| a * a).sum::<f64>().sqrt();
    let ny: f64 = y.iter().map(|b| b * b).sum::<f64>().sqrt();
    if nx == 0.0 || ny == 0.0 {
        0.0
    } else {
        dot / (nx * ny)
    }
}

/// Σ x ln(x / y), taking 0 ln(0 / y) = 0.
fn kl_term(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y)
        .filter(|(a, _)| **a > 0.0)
        .map(|(a, b)| a * (a / b).ln())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harmonic_mean_of_equal_values() {
        let hm = harmonic_mean_log(&[-100.0, -100.0, -100.0]);
        assert!((hm + 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_harmonic_mean_below_arithmetic() {
        // Harmonic mean of likelihoods is dominated by the smallest one
        let hm = harmonic_mean_log(&[-1000.0, -1010.0]);
        assert!(hm < -1000.0 && hm > -1010.0);
        assert!((hm - (-1010.0 + 2f64.ln() - (1.0 + (-10f64).exp()).ln())).abs() < 1e-6);
    }

    #[test]
    fn test_cao_juan_identical_and_disjoint() {
        let same = vec![vec![0.5, 0.5], vec![0.5, 0.5]];
        assert!((cao_juan(&same) - 1.0).abs() < 1e-12);
        let disjoint = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        assert!(cao_juan(&disjoint).abs() < 1e-12);
    }

    #[test]
    fn test_deveaud_zero_for_identical_topics() {
        let same = vec![vec![0.2, 0.8], vec![0.2, 0.8], vec![0.2, 0.8]];
        assert!(deveaud(&same).abs() < 1e-12);
        let apart = vec![vec![0.9, 0.1], vec![0.1, 0.9]];
        assert!(deveaud(&apart) > 0.0);
    }

    #[test]
    fn test_arun_is_finite_and_non_negative() {
        let phi = vec![vec![0.7, 0.2, 0.1], vec![0.1, 0.2, 0.7]];
        let theta = vec![vec![0.9, 0.1], vec![0.2, 0.8], vec![0.5, 0.5]];
        let value = arun(&phi, &theta, &[10, 20, 5]);
        assert!(value.is_finite());
        assert!(value >= -1e-12);
    }

    #[test]
    fn test_parse_and_display() {
        for m in Metric::ALL {
            assert_eq!(m.to_string().parse::<Metric>().unwrap(), m);
        }
        assert_eq!("arun".parse::<Metric>().unwrap(), Metric::Arun2010);
        assert!("perplexity".parse::<Metric>().is_err());
    }
}
