/* ==========================================================================================
 *                          This file is part of the Bachelor Thesis project
 *                                   University of Wrocław
 *                         Author: Weronika Tarnawska (Index No. 331171)
 *                                         June 2025
 * ========================================================================================== */
pub mod error;
pub mod signal;
pub mod noise;
pub mod window;
pub mod filter;
pub mod fir;
pub mod iir;
pub mod spectrum;
pub mod config;
pub mod report;
pub mod pipeline;
pub mod wav;
pub mod export;

pub use config::{FirConfig, IirConfig, PipelineConfig};
pub use error::{FilterError, Result};
pub use filter::{BandSpec, FilterCoefficients};
pub use noise::NoiseSpec;
pub use signal::{Signal, ToneSpec};
pub use spectrum::Spectrum;
pub use window::Window;

#[cfg(test)]
const _EPSILON: f64 = 1e-12;
