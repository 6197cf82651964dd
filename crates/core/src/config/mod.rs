use serde::{Deserialize, Serialize};

use crate::{Result, SpectrumError};

/// Upper bound on sideband orders accepted by validation. Each order doubles
/// the peak count, so the cost of a modulation grows as `2^sidebands`.
pub const MAX_SIDEBAND_ORDERS: u32 = 32;

/// One modulation source superimposed onto the spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulationSpec {
    /// Spacing in bins between repetitions of this modulation's comb.
    pub frequency: f64,
    /// Number of recursive harmonic sideband orders (0 = main peak only).
    pub sidebands: u32,
    /// Bin offset of the first-order sidebands from the main peak.
    pub sideband_offset: f64,
    /// Sigma of the Gaussian-shaped peak.
    pub sigma: f64,
    /// Amplitude scale of the main peak.
    pub snr: f64,
}

impl Default for ModulationSpec {
    fn default() -> Self {
        Self {
            frequency: 1.0,
            sidebands: 0,
            sideband_offset: 0.0,
            sigma: 0.0,
            snr: 1.0,
        }
    }
}

impl ModulationSpec {
    /// Checks the fields this modulation feeds into the synthesis loops.
    ///
    /// A non-positive frequency would keep the comb loop from terminating and
    /// a zero sigma divides by zero inside the Gaussian, so both are rejected
    /// here rather than surfacing as numeric faults mid-synthesis.
    pub fn validate(&self) -> Result<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(SpectrumError::invalid_spec(
                "frequency must be finite and positive",
            ));
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(SpectrumError::invalid_spec(
                "sigma must be finite and positive",
            ));
        }
        if !self.sideband_offset.is_finite() {
            return Err(SpectrumError::invalid_spec("sideband offset must be finite"));
        }
        if !self.snr.is_finite() {
            return Err(SpectrumError::invalid_spec("snr must be finite"));
        }
        if self.sidebands > MAX_SIDEBAND_ORDERS {
            return Err(SpectrumError::invalid_spec(format!(
                "sidebands must not exceed {MAX_SIDEBAND_ORDERS}"
            )));
        }
        Ok(())
    }
}

/// Top-level request for one spectrum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumSpec {
    /// Modulation sources, applied independently and additively in order.
    pub modulation: Vec<ModulationSpec>,
    /// Length of the output array in bins.
    pub points: usize,
    /// Resolution bandwidth. Accepted for interface compatibility; it has no
    /// effect on the generated spectrum.
    pub rbw: f64,
}

impl Default for SpectrumSpec {
    fn default() -> Self {
        Self {
            modulation: Vec::new(),
            points: 1,
            rbw: 1.0,
        }
    }
}

impl SpectrumSpec {
    /// Validates the whole request before any synthesis work begins.
    pub fn validate(&self) -> Result<()> {
        if self.points == 0 {
            return Err(SpectrumError::invalid_spec("points must be positive"));
        }
        for (index, modulation) in self.modulation.iter().enumerate() {
            modulation.validate().map_err(|err| match err {
                SpectrumError::InvalidSpec(msg) => {
                    SpectrumError::InvalidSpec(format!("modulation {index}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// Parses a specification from its JSON representation.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes the specification as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
