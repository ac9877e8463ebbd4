/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use std::fmt;

use crate::spectrum::Spectrum;

/// What a marked frequency is expected to carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// A tone of the clean signal, should pass through the filters
    Tone,
    /// The mains hum, should be attenuated
    Hum,
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerKind::Tone => f.pad("tone"),
            MarkerKind::Hum => f.pad("hum"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub frequency: f64,
    pub kind: MarkerKind,
}

impl Marker {
    pub fn tone(frequency: f64) -> Self {
        Self { frequency, kind: MarkerKind::Tone }
    }

    pub fn hum(frequency: f64) -> Self {
        Self { frequency, kind: MarkerKind::Hum }
    }
}

/// Spectral levels at one marker frequency, in dB.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportRow {
    pub marker: Marker,
    pub noisy_db: f64,
    pub fir_db: f64,
    pub iir_db: f64,
}

impl ReportRow {
    /// Level change introduced by the FIR filter (negative means attenuation).
    pub fn fir_change_db(&self) -> f64 {
        self.fir_db - self.noisy_db
    }

    /// Level change introduced by the IIR filter (negative means attenuation).
    pub fn iir_change_db(&self) -> f64 {
        self.iir_db - self.noisy_db
    }
}

/// Frequency-domain comparison of the noisy signal against both filter outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralReport {
    rows: Vec<ReportRow>,
}

impl SpectralReport {
    /// Reads the nearest bin of each spectrum at every marker frequency.
    /// Markers outside the spectra are skipped with a warning.
    pub fn new(noisy: &Spectrum, fir: &Spectrum, iir: &Spectrum, markers: &[Marker]) -> Self {
        let mut rows = Vec::with_capacity(markers.len());
        for &marker in markers {
            let levels = (
                noisy.magnitude_db_at(marker.frequency),
                fir.magnitude_db_at(marker.frequency),
                iir.magnitude_db_at(marker.frequency),
            );
            match levels {
                (Some(noisy_db), Some(fir_db), Some(iir_db)) => rows.push(ReportRow {
                    marker,
                    noisy_db,
                    fir_db,
                    iir_db,
                }),
                _ => log::warn!("Marker at {} Hz lies outside the spectrum, skipped", marker.frequency),
            }
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// First row probing `freq`.
    pub fn row(&self, freq: f64) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.marker.frequency == freq)
    }
}

impl fmt::Display for SpectralReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>10} {:>5} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "freq[Hz]", "kind", "noisy[dB]", "fir[dB]", "iir[dB]", "fir Δ", "iir Δ"
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:>10.1} {:>5} {:>10.2} {:>10.2} {:>10.2} {:>+10.2} {:>+10.2}",
                r.marker.frequency,
                r.marker.kind,
                r.noisy_db,
                r.fir_db,
                r.iir_db,
                r.fir_change_db(),
                r.iir_change_db()
            )?;
        }
        Ok(())
    }
}
