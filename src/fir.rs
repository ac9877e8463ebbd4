/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use std::f64::consts::PI;

use crate::error::{FilterError, Result};
use crate::filter::{BandSpec, FilterCoefficients};
use crate::window::Window;

/// Normalized sinc: sin(πx) / (πx)
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Ideal band-pass impulse response at offset `t` from the center tap.
/// `f1`, `f2` are the cutoffs as fractions of Nyquist.
fn ideal_bandpass(t: f64, f1: f64, f2: f64) -> f64 {
    // difference of two ideal low-pass responses
    f2 * sinc(f2 * t) - f1 * sinc(f1 * t)
}

/// Designs a linear-phase FIR band-pass filter with the window method.
///
/// The ideal band-pass response for the cutoffs `band.low()` and `band.high()` is
/// truncated to `order + 1` taps centered at `order / 2`, tapered with `window`
/// and scaled so the gain at the band center is exactly one.
///
/// # Arguments
/// * `band`   - Pass band and sample rate.
/// * `order`  - Filter order, the filter has `order + 1` taps (must be at least 1).
/// * `window` - Taper applied to the truncated response.
///
/// # Returns
/// Coefficients with `a = [1]` and symmetric `b` (`b[k] == b[order - k]`),
/// so the group delay is `order / 2` samples at every frequency.
pub fn design_fir_bandpass(band: &BandSpec, order: usize, window: Window) -> Result<FilterCoefficients> {
    if order == 0 {
        return Err(FilterError::InvalidFilterSpec(
            "FIR band-pass order must be at least 1".to_string(),
        ));
    }
    let num_taps = order + 1;
    let center = order as f64 / 2.0;
    let f1 = band.low() / band.nyquist();
    let f2 = band.high() / band.nyquist();
    let win = window.coefficients(num_taps);

    // Compute the first half and mirror it, so symmetry holds bit for bit
    let mut taps = vec![0.0; num_taps];
    for n in 0..(num_taps + 1) / 2 {
        let tap = ideal_bandpass(n as f64 - center, f1, f2) * win[n];
        taps[n] = tap;
        taps[order - n] = tap;
    }

    // Scale so that the response at the band center is unity
    let fc = (f1 + f2) / 2.0;
    let gain: f64 = taps
        .iter()
        .enumerate()
        .map(|(n, &h)| h * (PI * fc * (n as f64 - center)).cos())
        .sum();
    if gain.abs() < f64::EPSILON {
        return Err(FilterError::InvalidFilterSpec(format!(
            "{} taps cannot realize the band [{}, {}] Hz",
            num_taps,
            band.low(),
            band.high()
        )));
    }
    taps.iter_mut().for_each(|h| *h /= gain);

    log::debug!(
        "Designed FIR band-pass [{}, {}] Hz, {} taps, {:?} window (center gain before scaling {:.6})",
        band.low(),
        band.high(),
        num_taps,
        window,
        gain
    );
    FilterCoefficients::fir(taps)
}
