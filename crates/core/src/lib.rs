//! Core library for the synthetic spectrum generator.
//!
//! The crate produces mock frequency-domain spectra for exercising
//! spectrum-analysis pipelines without real RF hardware: a fundamental tone,
//! a binary tree of harmonic sidebands repeated as a comb across the array,
//! and a Gaussian noise floor on top. The `math` module holds the pure
//! primitives, `config` the request types and their validation, and `synth`
//! the engine that paints the peaks.

pub mod config;
pub mod error;
pub mod math;
pub mod synth;

pub use config::{ModulationSpec, SpectrumSpec, MAX_SIDEBAND_ORDERS};
pub use error::{Result, SpectrumError};
pub use synth::{Spectrum, SynthesisEngine};
