/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use std::f64::consts::PI;

use crate::error::{FilterError, Result};

/// Real-valued samples together with the rate they were taken at.
#[derive(Clone, Debug, PartialEq)]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
}

impl Signal {
    /// Wraps `samples` taken at `sample_rate` Hz.
    /// Fails if the rate is not a positive finite number or any sample is not finite.
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        check_positive("sample rate", sample_rate)?;
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FilterError::InvalidParameter(format!(
                "sample {} is not finite ({})",
                i, samples[i]
            )));
        }
        Ok(Self { samples, sample_rate })
    }

    /// Internal constructor for stages whose output is finite by construction.
    pub(crate) fn from_parts(samples: Vec<f64>, sample_rate: f64) -> Self {
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time of each sample in seconds (`i / Fs`), for plotting against.
    pub fn time_axis(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|i| i as f64 / self.sample_rate).collect()
    }

    /// Largest absolute sample value, 0.0 for an empty signal.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0_f64, |max, &s| max.max(s.abs()))
    }

    /// Scale the signal so its peak absolute value is 1.0.
    ///
    /// A silent signal cannot be scaled; it is returned unchanged and a warning is logged.
    pub fn normalized(&self) -> Signal {
        let peak = self.peak();
        if peak == 0.0 {
            log::warn!(
                "Degenerate signal: all {} samples are zero, skipping peak normalization",
                self.samples.len()
            );
            return self.clone();
        }
        Signal::from_parts(self.samples.iter().map(|s| s / peak).collect(), self.sample_rate)
    }
}

/// A single sinusoidal component of a test signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    /// Frequency in Hz
    pub frequency: f64,
    pub amplitude: f64,
}

impl ToneSpec {
    pub fn new(frequency: f64, amplitude: f64) -> Self {
        Self { frequency, amplitude }
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FilterError::InvalidParameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

/// Longest signal the pipeline will allocate, 2^28 samples (2 GiB of f64).
pub const MAX_SAMPLES: usize = 1 << 28;

/// Number of samples in `duration` seconds at `sample_rate` Hz.
/// Fails with `InvalidParameter` above [`MAX_SAMPLES`].
pub fn sample_count(sample_rate: f64, duration: f64) -> Result<usize> {
    check_positive("sample rate", sample_rate)?;
    check_positive("duration", duration)?;
    let count = (sample_rate * duration).round();
    if !(count <= MAX_SAMPLES as f64) {
        return Err(FilterError::InvalidParameter(format!(
            "{} s at {} Hz needs {} samples, at most {} are supported",
            duration, sample_rate, count, MAX_SAMPLES
        )));
    }
    Ok(count as usize)
}

/// Generates `amplitude * sin(2π f i / sr)` for `i` in `0..len`.
pub(crate) fn sinusoid(len: usize, frequency: f64, amplitude: f64, sr: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            amplitude * (2.0 * PI * frequency * t).sin()
        })
        .collect()
}

/// Synthesizes the sum of `tones` over `duration` seconds.
///
/// The result has `round(sample_rate * duration)` samples; sample `i` is
/// `Σ amplitude · sin(2π · frequency · i / sample_rate)`.
/// An empty tone list yields silence.
pub fn synthesize(sample_rate: f64, duration: f64, tones: &[ToneSpec]) -> Result<Signal> {
    let len = sample_count(sample_rate, duration)?;
    for tone in tones {
        if !tone.frequency.is_finite() || !tone.amplitude.is_finite() {
            return Err(FilterError::InvalidParameter(format!("tone {:?} is not finite", tone)));
        }
    }

    // Sum components sample-wise, in tone order
    let mut samples = vec![0.0; len];
    for tone in tones {
        let component = sinusoid(len, tone.frequency, tone.amplitude, sample_rate);
        samples.iter_mut().zip(component).for_each(|(s, c)| *s += c);
    }

    log::debug!(
        "Synthesized {} samples ({} s at {} Hz) from {} tone(s)",
        len,
        duration,
        sample_rate,
        tones.len()
    );
    Ok(Signal::from_parts(samples, sample_rate))
}
