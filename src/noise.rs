/* ==================================================================================================
 *                           This file is part of the bachelor thesis project
 *                  Implementation and Analysis of Selected Noise Reduction Methods
 *                                Weronika Tarnawska (Index No. 331171)
 *                                  Supervisor:  dr hab. Paweł Woźny
 *                                  University of Wrocław, June 2025
 * ================================================================================================== */
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{FilterError, Result};
use crate::signal::{sinusoid, Signal};

/// Additive corruption applied to a clean signal: Gaussian white noise plus a mains hum tone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseSpec {
    /// Standard deviation of the white noise
    pub white_amplitude: f64,
    /// Hum frequency in Hz
    pub hum_frequency: f64,
    pub hum_amplitude: f64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            white_amplitude: 0.2,
            hum_frequency: 50.0,
            hum_amplitude: 0.3,
        }
    }
}

impl NoiseSpec {
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        if !ok(self.white_amplitude) || !ok(self.hum_amplitude) || !self.hum_frequency.is_finite() {
            return Err(FilterError::InvalidParameter(format!(
                "noise amplitudes must be finite and non-negative, hum frequency finite: {:?}",
                self
            )));
        }
        Ok(())
    }
}

/// Mix clean signal with noise, scaling noise by `noise_level`.
fn add_noise(signal: &[f64], noise: &[f64], noise_level: f64) -> Vec<f64> {
    signal
        .iter()
        .zip(noise.iter())
        .map(|(s, n)| s + n * noise_level)
        .collect()
}

/// Draws `len` independent standard normal samples from `rng`.
fn white_noise<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f64> {
    (0..len)
        .map(|_| {
            let z: f64 = StandardNormal.sample(rng);
            z
        })
        .collect()
}

/// Corrupts `signal` with white noise and a hum tone:
/// `x[i] + white_amplitude * N(0,1) + hum_amplitude * sin(2π hum_frequency i / Fs)`.
///
/// Exactly one normal draw is taken from `rng` per sample, in sample order,
/// so a seeded generator gives reproducible output.
pub fn inject_noise<R: Rng + ?Sized>(signal: &Signal, spec: &NoiseSpec, rng: &mut R) -> Result<Signal> {
    spec.validate()?;
    let len = signal.len();
    let fs = signal.sample_rate();

    let white = white_noise(len, rng);
    let hum = sinusoid(len, spec.hum_frequency, spec.hum_amplitude, fs);

    let noisy = add_noise(signal.samples(), &white, spec.white_amplitude);
    let noisy = add_noise(&noisy, &hum, 1.0);

    log::debug!(
        "Injected white noise (scale {}) and {} Hz hum (amplitude {}) into {} samples",
        spec.white_amplitude,
        spec.hum_frequency,
        spec.hum_amplitude,
        len
    );
    Ok(Signal::from_parts(noisy, fs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{synthesize, ToneSpec};
    use crate::_EPSILON;
    use float_cmp::approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    #[test]
    fn test_add_noise() {
        let out = add_noise(&[1.0, 2.0, 3.0], &[0.5, -0.5, 1.0], 2.0);
        assert_eq!(out, vec![2.0, 1.0, 5.0]);
    }

    #[test]
    fn test_hum_only_is_deterministic_sine() {
        let fs = 8000.0;
        let clean = synthesize(fs, 0.05, &[ToneSpec::new(440.0, 1.0)]).unwrap();
        let spec = NoiseSpec {
            white_amplitude: 0.0,
            hum_frequency: 50.0,
            hum_amplitude: 0.3,
        };
        let noisy = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(noisy.len(), clean.len());
        for (i, (&n, &c)) in noisy.samples().iter().zip(clean.samples()).enumerate() {
            let hum = 0.3 * (2.0 * PI * 50.0 * i as f64 / fs).sin();
            assert!(approx_eq!(f64, n, c + hum, epsilon = _EPSILON));
        }
    }

    #[test]
    fn test_same_seed_same_noise() {
        let clean = synthesize(8000.0, 0.5, &[ToneSpec::new(440.0, 0.6)]).unwrap();
        let spec = NoiseSpec::default();
        let a = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(42)).unwrap();
        let c = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(43)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_white_noise_statistics() {
        let clean = Signal::new(vec![0.0; 40_000], 8000.0).unwrap();
        let spec = NoiseSpec {
            white_amplitude: 0.2,
            hum_frequency: 50.0,
            hum_amplitude: 0.0,
        };
        let noisy = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(7)).unwrap();
        let n = noisy.len() as f64;
        let mean = noisy.samples().iter().sum::<f64>() / n;
        let var = noisy.samples().iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.01, "mean = {}", mean);
        assert!((var.sqrt() - 0.2).abs() < 0.01, "std = {}", var.sqrt());
    }

    #[test]
    fn test_rejects_negative_amplitude() {
        let clean = Signal::new(vec![0.0; 8], 8000.0).unwrap();
        let spec = NoiseSpec {
            white_amplitude: -0.2,
            ..NoiseSpec::default()
        };
        let res = inject_noise(&clean, &spec, &mut StdRng::seed_from_u64(0));
        assert!(matches!(res, Err(FilterError::InvalidParameter(_))));
    }
}
