/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::signal::Signal;

/// Magnitude spectrum: bin frequencies in Hz paired with |X[k]|.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    resolution: f64,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// (frequency, magnitude) pairs in bin order.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies.iter().copied().zip(self.magnitudes.iter().copied())
    }

    /// Bin spacing `Fs / M` in Hz.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// First ⌊M/2⌋ bins, the meaningful half for a real-valued input.
    pub fn one_sided(&self) -> Spectrum {
        let half = self.len() / 2;
        Spectrum {
            frequencies: self.frequencies[..half].to_vec(),
            magnitudes: self.magnitudes[..half].to_vec(),
            resolution: self.resolution,
        }
    }

    /// Index of the bin nearest to `freq`, if it lies within the spectrum.
    pub fn bin_index(&self, freq: f64) -> Option<usize> {
        if self.is_empty() || !freq.is_finite() || freq < 0.0 {
            return None;
        }
        let k = (freq / self.resolution).round() as usize;
        (k < self.len()).then_some(k)
    }

    /// Magnitude of the bin nearest to `freq`.
    pub fn magnitude_at(&self, freq: f64) -> Option<f64> {
        self.bin_index(freq).map(|k| self.magnitudes[k])
    }

    /// Magnitude of the bin nearest to `freq` in dB (20 log10), floored for empty bins.
    pub fn magnitude_db_at(&self, freq: f64) -> Option<f64> {
        self.magnitude_at(freq).map(|m| 20.0 * m.max(f64::MIN_POSITIVE).log10())
    }
}

/// Computes the magnitude spectrum of `signal`:
/// `magnitude[k] = |Σ x[i] exp(-2πi k i / M)|` at `frequency[k] = k Fs / M`, for all `M` bins.
///
/// Any length is accepted. Callers wanting a one-sided spectrum use [`Spectrum::one_sided`].
pub fn analyze(signal: &Signal) -> Spectrum {
    let len = signal.len();
    let resolution = signal.sample_rate() / len.max(1) as f64;
    if len == 0 {
        return Spectrum {
            frequencies: Vec::new(),
            magnitudes: Vec::new(),
            resolution,
        };
    }

    let mut buffer: Vec<Complex<f64>> = signal.samples().iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(len);
    fft.process(&mut buffer);

    Spectrum {
        frequencies: (0..len).map(|k| k as f64 * resolution).collect(),
        magnitudes: buffer.iter().map(|c| c.norm()).collect(),
        resolution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{synthesize, ToneSpec};
    use crate::_EPSILON;
    use float_cmp::approx_eq;
    use std::f64::consts::PI;

    fn naive_dft_magnitudes(x: &[f64]) -> Vec<f64> {
        let m = x.len();
        (0..m)
            .map(|k| {
                x.iter()
                    .enumerate()
                    .map(|(i, &v)| Complex::from_polar(v, -2.0 * PI * (k * i) as f64 / m as f64))
                    .sum::<Complex<f64>>()
                    .norm()
            })
            .collect()
    }

    #[test]
    fn test_matches_direct_dft() {
        // lengths that are not powers of two
        for len in [1, 7, 10, 45, 100] {
            let samples: Vec<f64> = (0..len).map(|i| ((i * 7 + 3) % 11) as f64 / 11.0 - 0.5).collect();
            let sig = Signal::new(samples.clone(), 1000.0).unwrap();
            let spec = analyze(&sig);
            let expected = naive_dft_magnitudes(&samples);
            assert_eq!(spec.len(), len);
            for (got, exp) in spec.magnitudes().iter().zip(expected.iter()) {
                assert!(approx_eq!(f64, *got, *exp, epsilon = 1e-9), "len {}: {} vs {}", len, got, exp);
            }
        }
    }

    #[test]
    fn test_bin_frequencies() {
        let sig = Signal::new(vec![0.0; 8], 8000.0).unwrap();
        let spec = analyze(&sig);
        assert!(approx_eq!(f64, spec.resolution(), 1000.0, epsilon = _EPSILON));
        assert_eq!(spec.frequencies(), &[0.0, 1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0]);
        let pairs: Vec<(f64, f64)> = spec.bins().collect();
        assert_eq!(pairs[3], (3000.0, 0.0));
    }

    #[test]
    fn test_pure_tone_peak() {
        // 1 s at 8 kHz: 440 Hz falls exactly on bin 440
        let sig = synthesize(8000.0, 1.0, &[ToneSpec::new(440.0, 1.0)]).unwrap();
        let spec = analyze(&sig);
        assert!(approx_eq!(f64, spec.magnitude_at(440.0).unwrap(), 4000.0, epsilon = 1e-6));
        // mirror image
        assert!(approx_eq!(f64, spec.magnitude_at(7560.0).unwrap(), 4000.0, epsilon = 1e-6));
        assert!(spec.magnitude_at(1000.0).unwrap() < 1e-6);
        let db = spec.magnitude_db_at(440.0).unwrap();
        assert!(approx_eq!(f64, db, 20.0 * 4000.0_f64.log10(), epsilon = 1e-9));
    }

    #[test]
    fn test_one_sided() {
        let sig = Signal::new(vec![1.0; 9], 9.0).unwrap();
        let spec = analyze(&sig);
        let half = spec.one_sided();
        assert_eq!(half.len(), 4);
        assert_eq!(half.frequencies(), &spec.frequencies()[..4]);
        assert!(approx_eq!(f64, half.magnitudes()[0], 9.0, epsilon = _EPSILON));
    }

    #[test]
    fn test_bin_index_bounds() {
        let sig = Signal::new(vec![0.0; 100], 1000.0).unwrap();
        let spec = analyze(&sig);
        assert_eq!(spec.bin_index(0.0), Some(0));
        assert_eq!(spec.bin_index(54.0), Some(5));
        assert_eq!(spec.bin_index(56.0), Some(6));
        assert_eq!(spec.bin_index(995.0), None);
        assert_eq!(spec.bin_index(-1.0), None);
        assert_eq!(spec.magnitude_db_at(50.0).map(|d| d < -300.0), Some(true));
    }

    #[test]
    fn test_empty_signal() {
        let sig = Signal::new(vec![], 1000.0).unwrap();
        let spec = analyze(&sig);
        assert!(spec.is_empty());
        assert_eq!(spec.one_sided().len(), 0);
        assert_eq!(spec.magnitude_at(0.0), None);
    }
}
