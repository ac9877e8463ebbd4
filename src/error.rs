/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    /// Non-positive or non-finite sample rate, duration or amplitude.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Band edges outside (0, Nyquist), inverted band, or unusable order.
    #[error("Invalid filter spec: {0}")]
    InvalidFilterSpec(String),

    #[error("Unstable IIR design: pole radius {radius} is not inside the unit circle")]
    UnstableDesign { radius: f64 },

    #[error("Filter output diverged: sample {index} is not finite")]
    NonFiniteOutput { index: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
