// Yearly series for one topic and its diagnostics.
//
// The series spans the first to the last year present in the data; the
// start and end are never fixed up front. `frequency` is the number of
// observations per seasonal cycle and only matters for decomposition.

use anyhow::Result;
use tracing::warn;

use super::aggregate::TopicYearMean;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub topic: usize,
    pub start: i32,
    pub frequency: usize,
    pub values: Vec<f64>,
}

/// Classical additive decomposition: value = trend + seasonal + remainder.
/// Trend and remainder are undefined at the ends, where the moving-average
/// window does not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub trend: Vec<Option<f64>>,
    pub seasonal: Vec<f64>,
    pub remainder: Vec<Option<f64>>,
    /// One seasonal effect per position in the cycle, centred on zero
    pub figure: Vec<f64>,
}

impl YearSeries {
    /// Build the series of `topic` from aggregated means. Missing interior
    /// years are filled by linear interpolation.
    pub fn from_means(means: &[TopicYearMean], topic: usize, frequency: usize) -> Result<Self> {
        let mut points: Vec<(i32, f64)> = means
            .iter()
            .filter(|m| m.topic == topic)
            .map(|m| (m.year, m.gamma))
            .collect();
        points.sort_by_key(|(y, _)| *y);

        let (Some(&(start, _)), Some(&(end, _))) = (points.first(), points.last()) else {
            anyhow::bail!("No yearly means for topic {topic}");
        };

        let mut values = Vec::with_capacity((end - start + 1) as usize);
        let mut filled = 0;
        for pair in points.windows(2) {
            let (y0, v0) = pair[0];
            let (y1, v1) = pair[1];
            values.push(v0);
            for y in (y0 + 1)..y1 {
                let t = (y - y0) as f64 / (y1 - y0) as f64;
                values.push(v0 + t * (v1 - v0));
                filled += 1;
            }
        }
        if let Some(&(_, last)) = points.last() {
            values.push(last);
        }

        if filled > 0 {
            warn!(topic, filled, start, end, "Interpolated missing years in series");
        }

        Ok(Self {
            topic,
            start,
            frequency: frequency.max(1),
            values,
        })
    }

    pub fn end(&self) -> i32 {
        self.start + self.values.len() as i32 - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (year, value) pairs.
    pub fn points(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(i, v)| (self.start + i as i32, *v))
    }

    /// Sample autocorrelation for lags 0..=max_lag (clamped to len - 1).
    /// A constant series has no defined correlation; its lags above 0
    /// are reported as 0.
    pub fn autocorrelation(&self, max_lag: usize) -> Vec<f64> {
        let n = self.values.len();
        if n == 0 {
            return Vec::new();
        }
        let mean = self.values.iter().sum::<f64>() / n as f64;
        let dev: Vec<f64> = self.values.iter().map(|v| v - mean).collect();
        let denom: f64 = dev.iter().map(|d| d * d).sum();

        (0..=max_lag.min(n - 1))
            .map(|lag| {
                if lag == 0 {
                    1.0
                } else if denom == 0.0 {
                    0.0
                } else {
                    dev.iter().zip(&dev[lag..]).map(|(a, b)| a * b).sum::<f64>() / denom
                }
            })
            .collect()
    }

    /// (x_t, x_{t+lag}) pairs for a lag plot.
    pub fn lag_pairs(&self, lag: usize) -> Vec<(f64, f64)> {
        if lag >= self.values.len() {
            return Vec::new();
        }
        self.values
            .iter()
            .zip(&self.values[lag..])
            .map(|(a, b)| (*a, *b))
            .collect()
    }

    /// Classical additive decomposition with a centred moving average of
    /// one cycle. Needs a frequency of at least 2 and two full cycles.
    pub fn decompose(&self) -> Result<Decomposition, PipelineError> {
        let f = self.frequency;
        let n = self.values.len();
        let needed = 2 * f.max(2);
        if f < 2 || n < needed {
            return Err(PipelineError::SeriesTooShort {
                topic: self.topic,
                len: n,
                needed,
            });
        }

        // Odd cycle: f equal weights. Even cycle: f + 1 weights with halves
        // at both ends, so the window stays centred.
        let weights: Vec<f64> = if f % 2 == 0 {
            let mut w = vec![1.0 / f as f64; f + 1];
            w[0] = 0.5 / f as f64;
            w[f] = 0.5 / f as f64;
            w
        } else {
            vec![1.0 / f as f64; f]
        };
        let half = weights.len() / 2;

        let trend: Vec<Option<f64>> = (0..n)
            .map(|t| {
                if t < half || t + half >= n {
                    None
                } else {
                    Some(
                        weights
                            .iter()
                            .enumerate()
                            .map(|(j, w)| w * self.values[t + j - half])
                            .sum(),
                    )
                }
            })
            .collect();

        let mut figure = vec![0.0; f];
        for (pos, slot) in figure.iter_mut().enumerate() {
            let detrended: Vec<f64> = (pos..n)
                .step_by(f)
                .filter_map(|t| trend[t].map(|tr| self.values[t] - tr))
                .collect();
            if !detrended.is_empty() {
                *slot = detrended.iter().sum::<f64>() / detrended.len() as f64;
            }
        }
        let centre = figure.iter().sum::<f64>() / f as f64;
        for v in &mut figure {
            *v -= centre;
        }

        let seasonal: Vec<f64> = (0..n).map(|t| figure[t % f]).collect();
        let remainder = (0..n)
            .map(|t| trend[t].map(|tr| self.values[t] - tr - seasonal[t]))
            .collect();

        Ok(Decomposition {
            trend,
            seasonal,
            remainder,
            figure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(year: i32, topic: usize, gamma: f64) -> TopicYearMean {
        TopicYearMean { year, topic, gamma }
    }

    #[test]
    fn test_span_from_data_with_interpolation() {
        let means = vec![
            mean(1990, 1, 0.2),
            mean(1993, 1, 0.5),
            mean(1990, 2, 0.8),
            mean(1991, 1, 0.3),
        ];
        let s = YearSeries::from_means(&means, 1, 1).unwrap();
        assert_eq!(s.start, 1990);
        assert_eq!(s.end(), 1993);
        assert_eq!(s.len(), 4);
        assert!((s.values[2] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_topic_fails() {
        assert!(YearSeries::from_means(&[mean(2000, 1, 0.5)], 3, 1).is_err());
    }

    #[test]
    fn test_autocorrelation_alternating() {
        let s = YearSeries {
            topic: 1,
            start: 2000,
            frequency: 1,
            values: vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0],
        };
        let acf = s.autocorrelation(2);
        assert_eq!(acf.len(), 3);
        assert_eq!(acf[0], 1.0);
        assert!(acf[1] < -0.8);
        assert!(acf[2] > 0.6);
        assert_eq!(s.lag_pairs(1)[0], (1.0, -1.0));
        assert_eq!(s.lag_pairs(5).len(), 1);
    }

    #[test]
    fn test_decompose_trend_plus_cycle() {
        // x_t = t + (+1, -1, +1, -1, ...)
        let values: Vec<f64> = (0..8)
            .map(|t| t as f64 + if t % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let s = YearSeries {
            topic: 1,
            start: 1980,
            frequency: 2,
            values,
        };
        let d = s.decompose().unwrap();
        assert_eq!(d.trend[0], None);
        assert_eq!(d.trend[7], None);
        for t in 1..7 {
            assert!((d.trend[t].unwrap() - t as f64).abs() < 1e-12);
            assert!(d.remainder[t].unwrap().abs() < 1e-12);
        }
        assert!((d.figure[0] - 1.0).abs() < 1e-12);
        assert!((d.figure[1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_decompose_needs_two_cycles() {
        let s = YearSeries {
            topic: 4,
            start: 2000,
            frequency: 4,
            values: vec![0.1; 7],
        };
        assert_eq!(
            s.decompose().unwrap_err(),
            PipelineError::SeriesTooShort {
                topic: 4,
                len: 7,
                needed: 8
            }
        );
    }
}
