/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use num_complex::Complex;
use std::f64::consts::PI;

use crate::error::{FilterError, Result};
use crate::signal::{check_positive, Signal};

/// Pass band of a filter: `0 < low < high < sample_rate / 2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandSpec {
    low: f64,
    high: f64,
    sample_rate: f64,
}

impl BandSpec {
    pub fn new(low: f64, high: f64, sample_rate: f64) -> Result<Self> {
        check_positive("sample rate", sample_rate)?;
        let nyquist = sample_rate / 2.0;
        if !low.is_finite() || !high.is_finite() {
            return Err(FilterError::InvalidFilterSpec(format!(
                "Band edges must be finite, got [{}, {}] Hz",
                low, high
            )));
        }
        if low <= 0.0 {
            return Err(FilterError::InvalidFilterSpec(format!(
                "Low cutoff ({} Hz) must be greater than 0",
                low
            )));
        }
        if high >= nyquist {
            return Err(FilterError::InvalidFilterSpec(format!(
                "High cutoff ({} Hz) must be less than Nyquist ({} Hz)",
                high, nyquist
            )));
        }
        if low >= high {
            return Err(FilterError::InvalidFilterSpec(format!(
                "Low cutoff ({} Hz) must be less than high cutoff ({} Hz)",
                low, high
            )));
        }
        Ok(Self { low, high, sample_rate })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Arithmetic center of the band in Hz.
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Transfer function coefficients
/// H(z) = (b0 + b1*z^-1 + ... ) / (a0 + a1*z^-1 + ...)
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    /// Fails unless both sequences are non-empty and finite and `a[0] != 0`.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(FilterError::InvalidFilterSpec(
                "numerator and denominator must be non-empty".to_string(),
            ));
        }
        if b.iter().chain(a.iter()).any(|c| !c.is_finite()) {
            return Err(FilterError::InvalidFilterSpec("coefficients must be finite".to_string()));
        }
        if a[0] == 0.0 {
            return Err(FilterError::InvalidFilterSpec("a[0] must be non-zero".to_string()));
        }
        Ok(Self { b, a })
    }

    /// Feed-forward only filter, `a = [1]`.
    pub fn fir(b: Vec<f64>) -> Result<Self> {
        Self::new(b, vec![1.0])
    }

    pub fn b(&self) -> &[f64] {
        &self.b
    }

    pub fn a(&self) -> &[f64] {
        &self.a
    }

    pub fn is_fir(&self) -> bool {
        self.a.len() == 1
    }

    /// Highest delay appearing in either polynomial.
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()) - 1
    }

    /// Complex response H(e^{jω}) at `freq` Hz for sample rate `sample_rate`.
    pub fn frequency_response(&self, freq: f64, sample_rate: f64) -> Complex<f64> {
        let omega = 2.0 * PI * freq / sample_rate;
        let eval = |coeffs: &[f64]| -> Complex<f64> {
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &c)| Complex::from_polar(c, -omega * k as f64))
                .sum()
        };
        eval(&self.b) / eval(&self.a)
    }

    /// Magnitude response |H| at `freq` Hz.
    pub fn gain_at(&self, freq: f64, sample_rate: f64) -> f64 {
        self.frequency_response(freq, sample_rate).norm()
    }

    /// True when every root of `a` lies strictly inside the unit circle.
    ///
    /// Schur-Cohn step-down on the coefficients themselves, so rounding introduced
    /// when `a` was expanded from its roots is taken into account.
    pub fn is_stable(&self) -> bool {
        schur_stable(&self.a, 1.0)
    }

    /// Largest root magnitude of `a`, 0.0 for a feed-forward filter.
    pub fn max_pole_radius(&self) -> f64 {
        if self.a.len() == 1 {
            return 0.0;
        }
        // every root lies within the Cauchy bound
        let a0 = self.a[0];
        let mut hi = 1.0 + self.a[1..].iter().fold(0.0_f64, |max, &c| max.max((c / a0).abs()));
        let mut lo = 0.0;
        for _ in 0..64 {
            let mid = 0.5 * (lo + hi);
            if schur_stable(&self.a, mid) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }

    /// Filters `x` with the causal difference equation
    /// `a0*y[i] = Σ b[k]*x[i-k] - Σ_{k>=1} a[k]*y[i-k]`, starting from zero state.
    ///
    /// Output has the same length and sample rate as the input. Sums are accumulated
    /// in increasing `k`, so identical inputs give bit-identical outputs.
    /// Fails with `NonFiniteOutput` at the first sample that overflows.
    pub fn apply(&self, x: &Signal) -> Result<Signal> {
        let input = x.samples();
        let a0 = self.a[0];
        let mut y = vec![0.0; input.len()];

        for i in 0..input.len() {
            // feed-forward part, only taps with i - k >= 0
            let mut acc = 0.0;
            for (k, &b_k) in self.b.iter().enumerate().take(i + 1) {
                acc += b_k * input[i - k];
            }
            // feedback part
            for (k, &a_k) in self.a.iter().enumerate().skip(1).take(i) {
                acc -= a_k * y[i - k];
            }
            y[i] = acc / a0;
            if !y[i].is_finite() {
                return Err(FilterError::NonFiniteOutput { index: i });
            }
        }

        Ok(Signal::from_parts(y, x.sample_rate()))
    }
}

/// Whether all roots of `a` have magnitude below `radius`.
/// Steps the scaled polynomial down one degree at a time; each reflection
/// coefficient must stay inside (-1, 1).
fn schur_stable(a: &[f64], radius: f64) -> bool {
    let a0 = a[0];
    let mut c: Vec<f64> = a
        .iter()
        .enumerate()
        .map(|(k, &x)| x / a0 / radius.powi(k as i32))
        .collect();
    while c.len() > 1 {
        let n = c.len() - 1;
        let k = c[n];
        if !(k.abs() < 1.0) {
            return false;
        }
        let d = 1.0 - k * k;
        c = (0..n).map(|i| (c[i] - k * c[n - i]) / d).collect();
    }
    true
}
