/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter::FilterCoefficients;
use crate::fir::design_fir_bandpass;
use crate::iir::design_iir_bandpass;
use crate::noise::inject_noise;
use crate::report::{Marker, SpectralReport};
use crate::signal::{synthesize, Signal};
use crate::spectrum::{analyze, Spectrum};

/// Every intermediate product of one run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub clean: Signal,
    pub noisy: Signal,
    pub fir_coefficients: FilterCoefficients,
    pub iir_coefficients: FilterCoefficients,
    pub fir_output: Signal,
    pub iir_output: Signal,
    pub noisy_spectrum: Spectrum,
    pub fir_spectrum: Spectrum,
    pub iir_spectrum: Spectrum,
}

impl PipelineOutput {
    /// Compares the three spectra at every tone and at the hum frequency.
    pub fn report(&self, config: &PipelineConfig) -> SpectralReport {
        SpectralReport::new(
            &self.noisy_spectrum,
            &self.fir_spectrum,
            &self.iir_spectrum,
            &markers(config),
        )
    }
}

/// Tone frequencies followed by the hum frequency.
pub fn markers(config: &PipelineConfig) -> Vec<Marker> {
    config
        .tones
        .iter()
        .map(|t| Marker::tone(t.frequency))
        .chain(std::iter::once(Marker::hum(config.noise.hum_frequency)))
        .collect()
}

/// Generator for the white noise: seeded when `config.seed` is set, from OS entropy otherwise.
pub fn noise_rng(config: &PipelineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Runs synthesis, noise injection, both filter designs, filtering and spectral analysis.
///
/// Any invalid parameter aborts the run before a sample is produced.
/// With the same config and an identically seeded `rng` the outputs are bit-identical.
pub fn run<R: Rng + ?Sized>(config: &PipelineConfig, rng: &mut R) -> Result<PipelineOutput> {
    config.validate()?;
    let fs = config.sample_rate;

    let clean = synthesize(fs, config.duration, &config.tones)?;
    log::info!(
        "Synthesized {} samples ({} s at {} Hz) from {} tones",
        clean.len(),
        config.duration,
        fs,
        config.tones.len()
    );

    let noisy = inject_noise(&clean, &config.noise, rng)?;
    log::info!(
        "Added white noise {} and {} Hz hum {}",
        config.noise.white_amplitude,
        config.noise.hum_frequency,
        config.noise.hum_amplitude
    );

    let fir_coefficients = design_fir_bandpass(&config.fir.band(fs)?, config.fir.order, config.fir.window)?;
    if fir_coefficients.b().len() > clean.len() {
        log::warn!(
            "FIR filter has {} taps but the signal only {} samples, output is mostly transient",
            fir_coefficients.b().len(),
            clean.len()
        );
    }
    let iir_coefficients = design_iir_bandpass(&config.iir.band(fs)?, config.iir.order)?;
    log::info!(
        "Designed FIR order {} [{}, {}] Hz and IIR order {} [{}, {}] Hz",
        config.fir.order,
        config.fir.low,
        config.fir.high,
        config.iir.order,
        config.iir.low,
        config.iir.high
    );

    let fir_output = fir_coefficients.apply(&noisy)?;
    let iir_output = iir_coefficients.apply(&noisy)?;
    log::info!("Filtered {} samples with both filters", noisy.len());

    let noisy_spectrum = analyze(&noisy);
    let fir_spectrum = analyze(&fir_output);
    let iir_spectrum = analyze(&iir_output);
    log::debug!("Spectra computed, resolution {} Hz", noisy_spectrum.resolution());

    Ok(PipelineOutput {
        clean,
        noisy,
        fir_coefficients,
        iir_coefficients,
        fir_output,
        iir_output,
        noisy_spectrum,
        fir_spectrum,
        iir_spectrum,
    })
}
