/* ==================================================================================================
 *                           This file is part of the bachelor thesis project
 *                  Implementation and Analysis of Selected Noise Reduction Methods
 *                                Weronika Tarnawska (Index No. 331171)
 *                                  Supervisor:  dr hab. Paweł Woźny
 *                                  University of Wrocław, June 2025
 * ================================================================================================== */
use bandpass_denoise::fir::design_fir_bandpass;
use bandpass_denoise::iir::design_iir_bandpass;
use bandpass_denoise::noise::inject_noise;
use bandpass_denoise::pipeline::noise_rng;
use bandpass_denoise::signal::{synthesize, Signal};
use bandpass_denoise::spectrum::{analyze, Spectrum};
use bandpass_denoise::{FilterCoefficients, PipelineConfig, Result};

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use csv::Writer;

/// Level change in dB at `freq` from `before` to `after`, `None` outside the spectra
fn level_change(before: &Spectrum, after: &Spectrum, freq: f64) -> Option<f64> {
    Some(after.magnitude_db_at(freq)? - before.magnitude_db_at(freq)?)
}

/// Filters `noisy` with `coeffs`, measures the spectral change and appends one row
fn record_filter(
    algorithm: &str,
    order: usize,
    coeffs: &FilterCoefficients,
    noisy: &Signal,
    noisy_spectrum: &Spectrum,
    config: &PipelineConfig,
    csv_writer: &mut Writer<File>,
) -> Result<()> {
    let start = Instant::now();
    let filtered = match coeffs.apply(noisy) {
        Ok(filtered) => filtered,
        Err(e) => {
            log::warn!("Skipping {} order {}: {}", algorithm, order, e);
            return Ok(());
        }
    };
    let duration_sec = start.elapsed().as_secs_f64();

    let filtered_spectrum = analyze(&filtered);
    let hum_change = level_change(noisy_spectrum, &filtered_spectrum, config.noise.hum_frequency).unwrap_or(f64::NAN);
    let worst_tone_change = config
        .tones
        .iter()
        .filter_map(|t| level_change(noisy_spectrum, &filtered_spectrum, t.frequency))
        .fold(0.0_f64, |worst, c| if c.abs() > worst.abs() { c } else { worst });

    log::info!(
        "{} order {}: hum {:+.2} dB, worst tone {:+.2} dB, {:.4} s",
        algorithm,
        order,
        hum_change,
        worst_tone_change,
        duration_sec
    );
    csv_writer.write_record(&[
        algorithm,
        order.to_string().as_str(),
        coeffs.b().len().to_string().as_str(),
        &hum_change.to_string(),
        &worst_tone_change.to_string(),
        &duration_sec.to_string(),
    ])?;
    Ok(())
}

/// Designs every FIR and IIR order in the grids, filters the same seeded noisy signal with each
/// and writes the hum attenuation, tone change and filtering time to `out_file`.
///
/// Orders that cannot be designed are logged and skipped.
pub fn run(config: &PipelineConfig, fir_orders: &[usize], iir_orders: &[usize], out_file: &Path) -> Result<()> {
    config.validate()?;
    let fs = config.sample_rate;

    let clean = synthesize(fs, config.duration, &config.tones)?;
    let noisy = inject_noise(&clean, &config.noise, &mut noise_rng(config))?;
    let noisy_spectrum = analyze(&noisy);

    let mut csv_writer = Writer::from_path(out_file)?;
    csv_writer.write_record(&["algorithm", "order", "taps", "hum_change_db", "worst_tone_change_db", "time_sec"])?;

    let fir_band = config.fir.band(fs)?;
    for &order in fir_orders {
        match design_fir_bandpass(&fir_band, order, config.fir.window) {
            Ok(coeffs) => record_filter("FIR", order, &coeffs, &noisy, &noisy_spectrum, config, &mut csv_writer)?,
            Err(e) => log::warn!("Skipping FIR order {}: {}", order, e),
        }
    }

    let iir_band = config.iir.band(fs)?;
    for &order in iir_orders {
        match design_iir_bandpass(&iir_band, order) {
            Ok(coeffs) => record_filter("IIR", order, &coeffs, &noisy, &noisy_spectrum, config, &mut csv_writer)?,
            Err(e) => log::warn!("Skipping IIR order {}: {}", order, e),
        }
    }

    csv_writer.flush()?;
    println!("Sweep completed. Results (dB change and timing) in '{}'.", out_file.display());
    Ok(())
}
