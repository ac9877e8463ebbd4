/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::{FilterError, Result};
use crate::signal::Signal;

const SAMPLE_MAX: f64 = 32767.0;

/// Peak-normalizes the signal to [-1.0, 1.0] and converts it to 16-bit PCM,
/// `round(x / max|x| * 32767)`. A silent signal stays silent.
pub fn to_pcm16(signal: &Signal) -> Vec<i16> {
    signal
        .normalized()
        .samples()
        .iter()
        .map(|&s| (s * SAMPLE_MAX).round() as i16)
        .collect()
}

/// Writes a signal to a single-channel 16-bit PCM WAV file at the signal's sample rate.
/// The entire signal is first normalized to [-1.0, 1.0], then scaled to i16.
pub fn save_wav<P: AsRef<Path>>(signal: &Signal, path: P) -> Result<()> {
    let rate = signal.sample_rate().round();
    if rate < 1.0 || rate > u32::MAX as f64 {
        return Err(FilterError::InvalidParameter(format!(
            "sample rate {} Hz cannot be stored in a WAV header",
            signal.sample_rate()
        )));
    }
    if rate != signal.sample_rate() {
        log::warn!("WAV sample rate rounded from {} to {} Hz", signal.sample_rate(), rate);
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: rate as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for s in to_pcm16(signal) {
        writer.write_sample(s)?;
    }
    writer.finalize()?;

    log::debug!("Saved {} samples to {}", signal.len(), path.as_ref().display());
    Ok(())
}
