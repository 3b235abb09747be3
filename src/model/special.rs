// Numerical helpers for the sampler and the tuning metrics.

use std::f64::consts::PI;

use nalgebra::{DMatrix, SymmetricEigen};

/// Lanczos coefficients for g = 7, n = 9.
const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function for x > 0.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection: Γ(x)Γ(1-x) = π / sin(πx)
        return PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let mut a = LANCZOS[0];
    for (i, c) in LANCZOS.iter().enumerate().skip(1) {
        a += c / (x + i as f64);
    }
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
}

/// log(sum(exp(xs))) without overflow.
pub fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    max + xs.iter().map(|x| (x - max).exp()).sum::<f64>().ln()
}

/// Singular values of a row-major `rows x cols` matrix, one per row, sorted
/// descending. Taken as the square roots of the eigenvalues of M Mᵀ, so a
/// matrix with fewer columns than rows still yields `rows` values.
pub fn singular_values(rows: &[Vec<f64>]) -> Vec<f64> {
    let n = rows.len();
    let cols = rows.first().map_or(0, Vec::len);
    let m = DMatrix::from_row_slice(n, cols, &rows.concat());
    let gram = &m * m.transpose();

    let mut values: Vec<f64> = SymmetricEigen::new(gram)
        .eigenvalues
        .iter()
        .map(|l| l.max(0.0).sqrt())
        .collect();
    values.sort_by(|x, y| y.total_cmp(x));
    values
}
