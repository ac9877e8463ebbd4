/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use num_complex::Complex;
use std::f64::consts::PI;

use crate::error::{FilterError, Result};
use crate::filter::{BandSpec, FilterCoefficients};

/// Zeros, poles and gain of a transfer function,
/// H = gain * Π(x - zeros) / Π(x - poles), with x = s (analog) or z (digital).
#[derive(Clone, Debug, PartialEq)]
pub struct Zpk {
    pub zeros: Vec<Complex<f64>>,
    pub poles: Vec<Complex<f64>>,
    pub gain: f64,
}

impl Zpk {
    /// Largest pole magnitude, 0.0 when there are no poles.
    pub fn max_pole_radius(&self) -> f64 {
        self.poles.iter().fold(0.0_f64, |max, p| max.max(p.norm()))
    }

    /// Expand into polynomial coefficients in powers of z^-1, normalized so that `a[0] = 1`.
    pub fn to_coefficients(&self) -> Result<FilterCoefficients> {
        let b: Vec<f64> = poly(&self.zeros).iter().map(|c| self.gain * c.re).collect();
        let a: Vec<f64> = poly(&self.poles).iter().map(|c| c.re).collect();
        FilterCoefficients::new(b, a)
    }
}

/// Monic polynomial with the given roots, highest power first.
/// Roots must come in conjugate pairs for the imaginary parts to cancel.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs
}

/// Analog Butterworth low-pass prototype with unity cutoff:
/// poles exp(iπ(2k+n+1)/(2n)) for k = 0..n, no zeros, unit gain.
fn butterworth_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| Complex::from_polar(1.0, PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n)))
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

/// Prewarp frequency for bilinear transform (rad/s)
fn prewarp(freq: f64, sample_rate: f64) -> f64 {
    2.0 * sample_rate * (PI * freq / sample_rate).tan()
}

/// Analog low-pass to band-pass substitution s -> (s^2 + w0^2) / (s * bw).
fn lowpass_to_bandpass(proto: &Zpk, w_low: f64, w_high: f64) -> Zpk {
    let bw = w_high - w_low;
    let w0_sq = w_low * w_high;
    let degree = proto.poles.len() - proto.zeros.len();

    // each root r maps to the pair r*bw/2 ± sqrt((r*bw/2)^2 - w0^2)
    let split = |roots: &[Complex<f64>]| -> Vec<Complex<f64>> {
        let scaled: Vec<Complex<f64>> = roots.iter().map(|&r| r * (bw / 2.0)).collect();
        let plus = scaled.iter().map(|&r| r + (r * r - w0_sq).sqrt());
        let minus = scaled.iter().map(|&r| r - (r * r - w0_sq).sqrt());
        plus.chain(minus).collect()
    };

    let mut zeros = split(&proto.zeros);
    zeros.extend(std::iter::repeat(Complex::new(0.0, 0.0)).take(degree));
    Zpk {
        zeros,
        poles: split(&proto.poles),
        gain: proto.gain * bw.powi(degree as i32),
    }
}

/// Bilinear transform s = 2 fs (z - 1) / (z + 1) of an analog design.
/// Zeros at infinity land on z = -1.
fn bilinear(analog: &Zpk, sample_rate: f64) -> Zpk {
    let fs2 = 2.0 * sample_rate;
    let degree = analog.poles.len() - analog.zeros.len();
    let map = |s: &Complex<f64>| (fs2 + *s) / (fs2 - *s);

    let mut zeros: Vec<Complex<f64>> = analog.zeros.iter().map(map).collect();
    zeros.extend(std::iter::repeat(Complex::new(-1.0, 0.0)).take(degree));
    let poles = analog.poles.iter().map(map).collect();

    let num: Complex<f64> = analog.zeros.iter().map(|&z| fs2 - z).product();
    let den: Complex<f64> = analog.poles.iter().map(|&p| fs2 - p).product();
    Zpk {
        zeros,
        poles,
        gain: analog.gain * (num / den).re,
    }
}

fn check_stability(digital: &Zpk) -> Result<()> {
    let radius = digital.max_pole_radius();
    if !(radius < 1.0) {
        return Err(FilterError::UnstableDesign { radius });
    }
    Ok(())
}

/// Zeros, poles and gain of a digital Butterworth band-pass of the given order.
///
/// The design has `2 * order` poles, `order` zeros at z = 1 and `order` zeros at z = -1.
/// Fails with `UnstableDesign` if any pole is not strictly inside the unit circle.
pub fn butterworth_bandpass_zpk(band: &BandSpec, order: usize) -> Result<Zpk> {
    if order == 0 {
        return Err(FilterError::InvalidFilterSpec(
            "Butterworth order must be at least 1".to_string(),
        ));
    }
    let fs = band.sample_rate();
    let w_low = prewarp(band.low(), fs);
    let w_high = prewarp(band.high(), fs);

    let analog = lowpass_to_bandpass(&butterworth_prototype(order), w_low, w_high);
    let digital = bilinear(&analog, fs);
    check_stability(&digital)?;
    Ok(digital)
}

/// Designs an IIR Butterworth band-pass filter.
///
/// 1. Analog Butterworth low-pass prototype of order `order`
/// 2. Low-pass to band-pass transform between the prewarped band edges
/// 3. Bilinear transform at the band's sample rate
/// 4. Expansion into `b`, `a` with `a[0] = 1`
///
/// Both coefficient sequences have `2 * order + 1` entries.
///
/// Fails with `UnstableDesign` if a pole of the zpk design, or a root of the expanded `a`,
/// is not strictly inside the unit circle. Narrow bands at high orders cluster the poles
/// so tightly that the polynomial expansion alone can push roots of `a` outside.
pub fn design_iir_bandpass(band: &BandSpec, order: usize) -> Result<FilterCoefficients> {
    let zpk = butterworth_bandpass_zpk(band, order)?;
    let coeffs = zpk.to_coefficients()?;
    if !coeffs.is_stable() {
        let radius = coeffs.max_pole_radius();
        log::warn!(
            "Butterworth band-pass [{}, {}] Hz, order {}: zpk pole radius {:.6} but denominator root radius {:.6}",
            band.low(),
            band.high(),
            order,
            zpk.max_pole_radius(),
            radius
        );
        return Err(FilterError::UnstableDesign { radius });
    }
    log::debug!(
        "Designed Butterworth band-pass [{}, {}] Hz, order {}, max pole radius {:.6}",
        band.low(),
        band.high(),
        order,
        coeffs.max_pole_radius()
    );
    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Signal;
    use crate::_EPSILON;
    use float_cmp::approx_eq;

    fn db(x: f64) -> f64 {
        20.0 * x.log10()
    }

    /// Durand-Kerner iteration for the roots of a[0] + a[1] x^-1 + ... (as a polynomial in x).
    fn roots(a: &[f64]) -> Vec<Complex<f64>> {
        let n = a.len() - 1;
        let monic: Vec<f64> = a.iter().map(|c| c / a[0]).collect();
        let eval = |x: Complex<f64>| monic.iter().fold(Complex::new(0.0, 0.0), |acc, &c| acc * x + c);
        let seed = Complex::new(0.4, 0.9);
        let mut r: Vec<Complex<f64>> = (0..n).map(|k| seed.powu(k as u32)).collect();
        for _ in 0..2000 {
            let mut delta = 0.0_f64;
            for i in 0..n {
                let mut den = Complex::new(1.0, 0.0);
                for j in 0..n {
                    if j != i {
                        den *= r[i] - r[j];
                    }
                }
                let step = eval(r[i]) / den;
                r[i] -= step;
                delta = delta.max(step.norm());
            }
            if delta < 1e-14 {
                break;
            }
        }
        r
    }

    #[test]
    fn test_poly() {
        // (x - 1)(x + 2) = x^2 + x - 2
        let p = poly(&[Complex::new(1.0, 0.0), Complex::new(-2.0, 0.0)]);
        assert_eq!(p, vec![Complex::new(1.0, 0.0), Complex::new(1.0, 0.0), Complex::new(-2.0, 0.0)]);
        // (x - i)(x + i) = x^2 + 1
        let p = poly(&[Complex::new(0.0, 1.0), Complex::new(0.0, -1.0)]);
        assert!(approx_eq!(f64, p[1].norm(), 0.0, epsilon = _EPSILON));
        assert!(approx_eq!(f64, p[2].re, 1.0, epsilon = _EPSILON));
    }

    #[test]
    fn test_prototype_poles_in_left_half_plane() {
        for order in 1..=8 {
            let proto = butterworth_prototype(order);
            assert_eq!(proto.poles.len(), order);
            for p in &proto.poles {
                assert!(p.re < 0.0, "order {}: pole {}", order, p);
                assert!(approx_eq!(f64, p.norm(), 1.0, epsilon = _EPSILON));
            }
        }
        // first order is the single real pole at -1
        let p = butterworth_prototype(1).poles[0];
        assert!(approx_eq!(f64, p.re, -1.0, epsilon = _EPSILON));
        assert!(approx_eq!(f64, p.im, 0.0, epsilon = _EPSILON));
    }

    #[test]
    fn test_iir_shape() {
        let band = BandSpec::new(100.0, 3000.0, 8000.0).unwrap();
        for order in 1..=10 {
            let iir = design_iir_bandpass(&band, order).unwrap();
            assert_eq!(iir.b().len(), 2 * order + 1);
            assert_eq!(iir.a().len(), 2 * order + 1);
            assert_eq!(iir.a()[0], 1.0);
        }
    }

    #[test]
    fn test_iir_zpk_poles_inside_unit_circle() {
        let bands = [(100.0, 3000.0, 8000.0), (300.0, 3400.0, 8000.0), (20.0, 20000.0, 44100.0), (990.0, 1010.0, 8000.0), (20.0, 3900.0, 8000.0)];
        for &(low, high, fs) in &bands {
            let band = BandSpec::new(low, high, fs).unwrap();
            for order in 1..=10 {
                let zpk = butterworth_bandpass_zpk(&band, order).unwrap();
                assert_eq!(zpk.poles.len(), 2 * order);
                assert!(zpk.max_pole_radius() < 1.0, "band {:?} order {}", band, order);
            }
        }
    }

    #[test]
    fn test_iir_denominator_roots_inside_unit_circle() {
        for &(low, high, order) in &[(100.0, 3000.0, 6), (300.0, 1200.0, 4), (500.0, 2500.0, 3)] {
            let band = BandSpec::new(low, high, 8000.0).unwrap();
            let iir = design_iir_bandpass(&band, order).unwrap();
            let zpk = butterworth_bandpass_zpk(&band, order).unwrap();
            let found = roots(iir.a());
            let radius = found.iter().fold(0.0_f64, |m, r| m.max(r.norm()));
            assert!(radius < 1.0, "[{}, {}] order {}: {}", low, high, order, radius);
            assert!((radius - zpk.max_pole_radius()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_iir_default_response() {
        let fs = 8000.0;
        let band = BandSpec::new(100.0, 3000.0, fs).unwrap();
        let iir = design_iir_bandpass(&band, 6).unwrap();
        // Butterworth: -3 dB exactly at the band edges
        for f in [100.0, 3000.0] {
            let g = db(iir.gain_at(f, fs));
            assert!(approx_eq!(f64, g, -3.0103, epsilon = 1e-3), "{} Hz: {} dB", f, g);
        }
        for f in [440.0, 660.0, 1550.0] {
            let g = db(iir.gain_at(f, fs));
            assert!(g.abs() < 0.01, "{} Hz: {} dB", f, g);
        }
        assert!(db(iir.gain_at(50.0, fs)) < -30.0);
        assert!(db(iir.gain_at(3800.0, fs)) < -30.0);
    }

    #[test]
    fn test_iir_reference_coefficients() {
        let band = BandSpec::new(100.0, 3000.0, 8000.0).unwrap();
        let iir = design_iir_bandpass(&band, 6).unwrap();
        assert!(approx_eq!(f64, iir.b()[0], 0.17573573813352847, epsilon = 1e-9));
        assert!(approx_eq!(f64, iir.b()[1], 0.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, iir.b()[2], -1.0544144288011708, epsilon = 1e-9));
        assert!(approx_eq!(f64, iir.a()[1], -2.7456669097135915, epsilon = 1e-9));
        assert!(approx_eq!(f64, iir.a()[2], 0.8017794100807734, epsilon = 1e-9));
    }

    #[test]
    fn test_iir_zeros_at_dc_and_nyquist() {
        let band = BandSpec::new(100.0, 3000.0, 8000.0).unwrap();
        let zpk = butterworth_bandpass_zpk(&band, 3).unwrap();
        let at_dc = zpk.zeros.iter().filter(|z| (*z - Complex::new(1.0, 0.0)).norm() < 1e-12).count();
        let at_nyq = zpk.zeros.iter().filter(|z| (*z - Complex::new(-1.0, 0.0)).norm() < 1e-12).count();
        assert_eq!((at_dc, at_nyq), (3, 3));
    }

    #[test]
    fn test_unstable_poles_are_rejected() {
        let zpk = Zpk {
            zeros: vec![],
            poles: vec![Complex::new(0.5, 0.0), Complex::new(1.2, 0.0)],
            gain: 1.0,
        };
        match check_stability(&zpk) {
            Err(FilterError::UnstableDesign { radius }) => assert!(approx_eq!(f64, radius, 1.2, epsilon = _EPSILON)),
            other => panic!("expected UnstableDesign, got {:?}", other),
        }
        let on_circle = Zpk {
            zeros: vec![],
            poles: vec![Complex::new(0.0, 1.0)],
            gain: 1.0,
        };
        assert!(check_stability(&on_circle).is_err());
    }

    #[test]
    fn test_iir_rejects_zero_order() {
        let band = BandSpec::new(100.0, 3000.0, 8000.0).unwrap();
        assert!(matches!(design_iir_bandpass(&band, 0), Err(FilterError::InvalidFilterSpec(_))));
    }
    #[test]
    fn test_iir_returned_denominator_is_stable() {
        let bands = [(100.0, 3000.0, 8000.0), (300.0, 3400.0, 8000.0), (300.0, 1200.0, 8000.0), (500.0, 2500.0, 8000.0)];
        for &(low, high, fs) in &bands {
            let band = BandSpec::new(low, high, fs).unwrap();
            for order in 1..=10 {
                let iir = design_iir_bandpass(&band, order).unwrap();
                assert!(iir.is_stable(), "band {:?} order {}", band, order);
                assert!(iir.max_pole_radius() < 1.0);
            }
        }
        let band = BandSpec::new(100.0, 3000.0, 8000.0).unwrap();
        let iir = design_iir_bandpass(&band, 6).unwrap();
        assert!(approx_eq!(f64, iir.max_pole_radius(), 0.98045507, epsilon = 1e-6));
    }

    #[test]
    fn test_iir_narrow_band_expansion_is_rejected() {
        // zpk poles stay inside, the expanded denominator does not
        let cases = [(990.0, 1010.0, 8000.0, 10), (20.0, 40.0, 44100.0, 8), (20.0, 40.0, 44100.0, 10), (100.0, 110.0, 8000.0, 10)];
        for &(low, high, fs, order) in &cases {
            let band = BandSpec::new(low, high, fs).unwrap();
            assert!(butterworth_bandpass_zpk(&band, order).unwrap().max_pole_radius() < 1.0);
            match design_iir_bandpass(&band, order) {
                Err(FilterError::UnstableDesign { radius }) => {
                    assert!(radius > 1.0, "band {:?} order {}: radius {}", band, order, radius)
                }
                other => panic!("band {:?} order {}: expected UnstableDesign, got {:?}", band, order, other),
            }
        }
    }

    #[test]
    fn test_iir_impulse_response_decays() {
        for &(low, high, order) in &[(100.0, 3000.0, 6), (100.0, 3000.0, 10), (990.0, 1010.0, 5)] {
            let band = BandSpec::new(low, high, 8000.0).unwrap();
            let iir = design_iir_bandpass(&band, order).unwrap();
            let mut x = vec![0.0; 200_000];
            x[0] = 1.0;
            let y = iir.apply(&Signal::new(x, 8000.0).unwrap()).unwrap();
            let tail = y.samples()[190_000..].iter().fold(0.0_f64, |m, s| m.max(s.abs()));
            assert!(tail < 1e-9, "[{}, {}] order {}: tail {}", low, high, order, tail);
        }
    }
}
