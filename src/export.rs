/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
//! CSV tables for an external plotting tool.
use std::path::Path;

use csv::Writer;

use crate::error::{FilterError, Result};
use crate::filter::FilterCoefficients;
use crate::signal::Signal;
use crate::spectrum::Spectrum;

/// Writes signals side by side against a shared time axis: columns `time_s`, then one per signal.
///
/// All signals must have the same length and sample rate.
pub fn write_time_series<P: AsRef<Path>>(path: P, series: &[(&str, &Signal)]) -> Result<()> {
    let (_, first) = series
        .first()
        .ok_or_else(|| FilterError::InvalidParameter("no signals to export".to_string()))?;
    for (name, sig) in series {
        if sig.len() != first.len() || sig.sample_rate() != first.sample_rate() {
            return Err(FilterError::InvalidParameter(format!(
                "signal '{}' ({} samples at {} Hz) does not match {} samples at {} Hz",
                name,
                sig.len(),
                sig.sample_rate(),
                first.len(),
                first.sample_rate()
            )));
        }
    }

    let mut csv_writer = Writer::from_path(path.as_ref())?;
    let header: Vec<&str> = std::iter::once("time_s").chain(series.iter().map(|(name, _)| *name)).collect();
    csv_writer.write_record(&header)?;
    for (i, t) in first.time_axis().into_iter().enumerate() {
        let mut record = vec![t.to_string()];
        record.extend(series.iter().map(|(_, sig)| sig.samples()[i].to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;

    log::debug!("Exported {} time series to {}", series.len(), path.as_ref().display());
    Ok(())
}

/// Writes the one-sided half of each spectrum: columns `frequency_hz`, then one magnitude per spectrum.
///
/// All spectra must share the same bins.
pub fn write_spectra<P: AsRef<Path>>(path: P, spectra: &[(&str, &Spectrum)]) -> Result<()> {
    let (_, first) = spectra
        .first()
        .ok_or_else(|| FilterError::InvalidParameter("no spectra to export".to_string()))?;
    for (name, spec) in spectra {
        if spec.frequencies() != first.frequencies() {
            return Err(FilterError::InvalidParameter(format!(
                "spectrum '{}' has different frequency bins",
                name
            )));
        }
    }

    let halves: Vec<Spectrum> = spectra.iter().map(|(_, s)| s.one_sided()).collect();
    let mut csv_writer = Writer::from_path(path.as_ref())?;
    let header: Vec<&str> = std::iter::once("frequency_hz").chain(spectra.iter().map(|(name, _)| *name)).collect();
    csv_writer.write_record(&header)?;
    for (k, f) in halves[0].frequencies().iter().enumerate() {
        let mut record = vec![f.to_string()];
        record.extend(halves.iter().map(|s| s.magnitudes()[k].to_string()));
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;

    log::debug!("Exported {} spectra to {}", spectra.len(), path.as_ref().display());
    Ok(())
}

/// Writes `b` and `a` side by side: columns `index,b,a`, the shorter one padded with empty cells.
pub fn write_coefficients<P: AsRef<Path>>(path: P, coefficients: &FilterCoefficients) -> Result<()> {
    let b = coefficients.b();
    let a = coefficients.a();
    let cell = |c: &[f64], k: usize| c.get(k).map(|v| v.to_string()).unwrap_or_default();

    let mut csv_writer = Writer::from_path(path.as_ref())?;
    csv_writer.write_record(["index", "b", "a"])?;
    for k in 0..b.len().max(a.len()) {
        csv_writer.write_record(&[k.to_string(), cell(b, k), cell(a, k)])?;
    }
    csv_writer.flush()?;
    Ok(())
}
