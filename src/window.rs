/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use std::f64::consts::PI;
use std::str::FromStr;

use crate::error::FilterError;

/// Tapers applied to a truncated impulse response.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Window {
    #[default]
    Hamming,
    Hanning,
    Blackman,
    Rectangle,
}

impl Window {
    /// Generate symmetric window coefficients of the given length.
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        if len == 1 {
            return vec![1.0];
        }
        let span = (len - 1) as f64;
        match self {
            Window::Hamming => (0..len)
                .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / span).cos())
                .collect(),
            Window::Hanning => (0..len)
                .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / span).cos())
                .collect(),
            Window::Blackman => (0..len)
                .map(|n| {
                    let ratio = 2.0 * PI * n as f64 / span;
                    0.42 - 0.50 * ratio.cos() + 0.08 * (2.0 * ratio).cos()
                })
                .collect(),
            Window::Rectangle => vec![1.0; len],
        }
    }
}

impl FromStr for Window {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hamming" => Ok(Window::Hamming),
            "hanning" | "hann" => Ok(Window::Hanning),
            "blackman" => Ok(Window::Blackman),
            "rectangle" => Ok(Window::Rectangle),
            other => Err(FilterError::InvalidParameter(format!("Unknown window type: {}", other))),
        }
    }
}
