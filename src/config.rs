/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use crate::error::{FilterError, Result};
use crate::filter::BandSpec;
use crate::noise::NoiseSpec;
use crate::signal::{sample_count, ToneSpec};
use crate::window::Window;

/// Windowed FIR band-pass parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirConfig {
    pub order: usize,
    pub low: f64,
    pub high: f64,
    pub window: Window,
}

impl Default for FirConfig {
    fn default() -> Self {
        Self {
            order: 80,
            low: 100.0,
            high: 3000.0,
            window: Window::Hamming,
        }
    }
}

impl FirConfig {
    pub fn band(&self, sample_rate: f64) -> Result<BandSpec> {
        BandSpec::new(self.low, self.high, sample_rate)
    }
}

/// Butterworth band-pass parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IirConfig {
    pub order: usize,
    pub low: f64,
    pub high: f64,
}

impl Default for IirConfig {
    fn default() -> Self {
        Self {
            order: 6,
            low: 100.0,
            high: 3000.0,
        }
    }
}

impl IirConfig {
    pub fn band(&self, sample_rate: f64) -> Result<BandSpec> {
        BandSpec::new(self.low, self.high, sample_rate)
    }
}

/// Everything one run of the pipeline depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Signal duration in seconds
    pub duration: f64,
    pub tones: Vec<ToneSpec>,
    pub noise: NoiseSpec,
    pub fir: FirConfig,
    pub iir: IirConfig,
    /// Seed for the white noise; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000.0,
            duration: 5.0,
            tones: vec![ToneSpec::new(440.0, 0.6), ToneSpec::new(660.0, 0.4)],
            noise: NoiseSpec::default(),
            fir: FirConfig::default(),
            iir: IirConfig::default(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Checks every parameter up front so a run fails before any work is done.
    pub fn validate(&self) -> Result<()> {
        sample_count(self.sample_rate, self.duration)?;
        self.noise.validate()?;
        self.fir.band(self.sample_rate)?;
        self.iir.band(self.sample_rate)?;
        if self.fir.order == 0 || self.iir.order == 0 {
            return Err(FilterError::InvalidFilterSpec(format!(
                "filter orders must be at least 1 (FIR {}, IIR {})",
                self.fir.order, self.iir.order
            )));
        }
        Ok(())
    }

    /// Number of samples a run will produce.
    pub fn num_samples(&self) -> Result<usize> {
        sample_count(self.sample_rate, self.duration)
    }
}
