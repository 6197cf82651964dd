use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::{math, ModulationSpec, Result, SpectrumSpec};

/// Completed spectrum: one real amplitude sample per frequency bin.
pub type Spectrum = Vec<f64>;

/// Bin where every modulation's comb currently starts.
// TODO: randomise the comb phase per modulation (frequency * -uniform(0, 1))
// instead of starting every comb at the same fixed bin.
const START_BIN: f64 = 128.0;

/// Half-width of a peak's bin window, in sigmas. Three sigmas covers the
/// curve without dragging in too much tail.
const PEAK_WIDTH_SIGMAS: f64 = 3.0;

/// Synthesizes mock spectra from a [`SpectrumSpec`].
///
/// The engine owns its random source, so successive calls on an
/// entropy-seeded engine produce different noise floors while a seeded
/// engine replays the same output for the same spec. Tests that need exact
/// values construct it with [`SynthesisEngine::seeded`] and a zero noise
/// sigma.
#[derive(Debug)]
pub struct SynthesisEngine<R: Rng = StdRng> {
    rng: R,
    noise: Normal<f64>,
}

impl SynthesisEngine<StdRng> {
    /// Creates an engine seeded from system entropy with unit noise sigma.
    pub fn new() -> Self {
        Self::with_noise_sigma(1.0).expect("unit noise sigma is always valid")
    }

    /// Creates an entropy-seeded engine with the given noise sigma. A sigma
    /// of zero disables the noise floor entirely.
    pub fn with_noise_sigma(noise_sigma: f64) -> Result<Self> {
        Self::from_rng(StdRng::from_entropy(), noise_sigma)
    }

    /// Creates a deterministic engine from an explicit seed.
    pub fn seeded(seed: u64, noise_sigma: f64) -> Result<Self> {
        Self::from_rng(StdRng::seed_from_u64(seed), noise_sigma)
    }
}

impl Default for SynthesisEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SynthesisEngine<R> {
    /// Creates an engine from a caller-supplied random generator.
    pub fn from_rng(rng: R, noise_sigma: f64) -> Result<Self> {
        let noise = Normal::new(0.0, noise_sigma)?;
        Ok(Self { rng, noise })
    }

    /// Synthesizes one spectrum of exactly `spec.points` bins.
    ///
    /// The spec is validated up front; nothing is allocated for an invalid
    /// request. Each modulation paints its comb additively onto the shared
    /// buffer, then every bin receives one independent noise draw.
    ///
    /// Cost is dominated by the sideband tree: order `i` contributes `2^i`
    /// peaks, so one modulation performs on the order of
    /// `points / frequency * 2^(sidebands + 1)` window passes.
    pub fn synthesize(&mut self, spec: &SpectrumSpec) -> Result<Spectrum> {
        spec.validate()?;

        let mut spectrum = vec![0.0; spec.points];
        for modulation in &spec.modulation {
            paint_modulation(&mut spectrum, modulation);
        }
        for slot in &mut spectrum {
            *slot += self.noise.sample(&mut self.rng);
        }
        Ok(spectrum)
    }
}

/// Repeats one modulation's comb pattern across the buffer until the cursor
/// has swept at least one period past the end.
fn paint_modulation(spectrum: &mut [f64], modulation: &ModulationSpec) {
    let points = spectrum.len() as f64;
    let mut offset = START_BIN;
    while offset < points + modulation.frequency {
        for order in 0..=modulation.sidebands {
            let peaks = 1_u64 << order;
            let inv_peaks = 1.0 / peaks as f64;
            let power = modulation.snr * inv_peaks;
            let peak_width = modulation.sigma * PEAK_WIDTH_SIGMAS;
            // First sideband of this order, centred symmetrically around the
            // comb cursor as the order deepens.
            let mut local_offset = offset + modulation.sideband_offset * (inv_peaks - 1.0);
            for _ in 0..peaks {
                add_peak(spectrum, local_offset, peak_width, modulation.sigma, power);
                local_offset += modulation.sideband_offset * inv_peaks * 2.0;
            }
        }
        offset += modulation.frequency;
    }
}

/// Accumulates one Gaussian peak into the bins of its truncation window.
///
/// The window is clamped into `[0, len)`; a fully out-of-range window
/// degenerates to an empty slice and contributes nothing. The unnormalized
/// Gaussian is used deliberately so the peak's maximum contribution is
/// exactly `power`.
fn add_peak(spectrum: &mut [f64], center: f64, half_width: f64, sigma: f64, power: f64) {
    let len = spectrum.len() as i64;
    let lo = math::clamp((center - half_width) as i64, 0, len);
    let hi = math::clamp((center + half_width) as i64, lo, len);
    for (step, slot) in spectrum[lo as usize..hi as usize].iter_mut().enumerate() {
        let bin = (lo + step as i64) as f64;
        *slot += math::gaussian(bin, center, sigma) * power;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent_engine() -> SynthesisEngine {
        SynthesisEngine::seeded(42, 0.0).unwrap()
    }

    fn single_modulation(modulation: ModulationSpec, points: usize) -> SpectrumSpec {
        SpectrumSpec {
            modulation: vec![modulation],
            points,
            rbw: 1.0,
        }
    }

    fn comb_2e8() -> ModulationSpec {
        ModulationSpec {
            frequency: 512.0,
            sidebands: 0,
            sideband_offset: 0.0,
            sigma: 0.5,
            snr: 2e8,
        }
    }

    #[test]
    fn output_length_matches_points() {
        let mut engine = silent_engine();
        for points in [1, 7, 100, 4096] {
            let spec = single_modulation(comb_2e8(), points);
            assert_eq!(engine.synthesize(&spec).unwrap().len(), points);
        }
    }

    #[test]
    fn invalid_spec_is_rejected_before_synthesis() {
        let mut engine = silent_engine();
        let spec = SpectrumSpec {
            points: 0,
            ..Default::default()
        };
        assert!(engine.synthesize(&spec).is_err());
    }

    #[test]
    fn comb_peaks_reach_snr_at_each_repetition() {
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(comb_2e8(), 4096))
            .unwrap();

        // Peaks every 512 bins starting at the fixed start bin 128.
        for center in (128..4096).step_by(512) {
            assert!(
                (spectrum[center] - 2e8).abs() < 1.0,
                "bin {center} should carry the full peak height"
            );
        }
        // Between peaks the buffer stays untouched.
        assert_eq!(spectrum[300], 0.0);
        assert_eq!(spectrum[0], 0.0);
    }

    #[test]
    fn peak_window_spans_about_three_bins() {
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(comb_2e8(), 4096))
            .unwrap();

        // sigma 0.5 gives a 1.5-bin half-width, so bins 126..=128 are hit.
        assert!(spectrum[126] > 0.0);
        assert!(spectrum[127] > 0.0);
        assert!(spectrum[128] > 0.0);
        assert_eq!(spectrum[129], 0.0);
        assert_eq!(spectrum[125], 0.0);
    }

    #[test]
    fn first_order_sidebands_sit_at_half_height() {
        let modulation = ModulationSpec {
            sidebands: 1,
            sideband_offset: 8.0,
            ..comb_2e8()
        };
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(modulation, 4096))
            .unwrap();

        assert!((spectrum[128] - 2e8).abs() < 1.0);
        // First-order pair sits 4 bins either side of the main peak.
        assert!((spectrum[124] - 1e8).abs() < 1.0);
        assert!((spectrum[132] - 1e8).abs() < 1.0);
    }

    #[test]
    fn sideband_tree_doubles_peaks_and_halves_amplitude() {
        let snr = 1e6;
        let modulation = ModulationSpec {
            frequency: 1024.0,
            sidebands: 2,
            sideband_offset: 64.0,
            sigma: 0.5,
            snr,
        };
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(modulation, 512))
            .unwrap();

        // 2^(n+1) - 1 = 7 peaks: the fundamental, 2 at order one, 4 at
        // order two.
        let expected = [
            (128_usize, snr),
            (96, snr / 2.0),
            (160, snr / 2.0),
            (80, snr / 4.0),
            (112, snr / 4.0),
            (144, snr / 4.0),
            (176, snr / 4.0),
        ];
        for (bin, height) in expected {
            assert!(
                (spectrum[bin] - height).abs() < height * 1e-12,
                "bin {bin} should peak at {height}"
            );
        }
        // Exact halving between consecutive orders, independent of noise.
        assert!((spectrum[128] / spectrum[96] - 2.0).abs() < 1e-12);
        assert!((spectrum[96] / spectrum[80] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn modulations_accumulate_additively() {
        let first = ModulationSpec {
            frequency: 5000.0,
            sidebands: 1,
            sideband_offset: 8.0,
            sigma: 0.5,
            snr: 1e9,
        };
        let second = comb_2e8();
        let points = 4096;

        let mut engine = silent_engine();
        let combined = engine
            .synthesize(&SpectrumSpec {
                modulation: vec![first.clone(), second.clone()],
                points,
                rbw: 1.0,
            })
            .unwrap();
        let lone_first = engine.synthesize(&single_modulation(first, points)).unwrap();
        let lone_second = engine
            .synthesize(&single_modulation(second, points))
            .unwrap();

        for bin in 0..points {
            let summed = lone_first[bin] + lone_second[bin];
            let tolerance = combined[bin].abs().max(1.0) * 1e-12;
            assert!(
                (combined[bin] - summed).abs() <= tolerance,
                "bin {bin}: combined {} != summed {}",
                combined[bin],
                summed
            );
        }
    }

    #[test]
    fn window_past_the_end_contributes_nothing() {
        // The only comb position (128) lies beyond the 100-bin buffer.
        let modulation = ModulationSpec {
            frequency: 200.0,
            ..comb_2e8()
        };
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(modulation, 100))
            .unwrap();
        assert!(spectrum.iter().all(|&bin| bin == 0.0));
    }

    #[test]
    fn window_before_the_start_contributes_nothing() {
        // A negative sideband offset pushes the second first-order peak to
        // bin -22; its window must clamp to empty rather than wrap.
        let modulation = ModulationSpec {
            frequency: 8192.0,
            sidebands: 1,
            sideband_offset: -300.0,
            sigma: 0.5,
            snr: 1e6,
        };
        let mut engine = silent_engine();
        let spectrum = engine
            .synthesize(&single_modulation(modulation, 4096))
            .unwrap();

        assert!(spectrum[..10].iter().all(|&bin| bin == 0.0));
        assert!((spectrum[278] - 5e5).abs() < 1.0);
        assert!((spectrum[128] - 1e6).abs() < 1.0);
    }

    #[test]
    fn fixed_seed_replays_the_same_spectrum() {
        let spec = single_modulation(comb_2e8(), 256);
        let first = SynthesisEngine::seeded(7, 1.0)
            .unwrap()
            .synthesize(&spec)
            .unwrap();
        let second = SynthesisEngine::seeded(7, 1.0)
            .unwrap()
            .synthesize(&spec)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn noise_draws_are_independent_per_bin() {
        let mut engine = SynthesisEngine::seeded(11, 1.0).unwrap();
        let spec = SpectrumSpec {
            modulation: Vec::new(),
            points: 256,
            rbw: 1.0,
        };
        let spectrum = engine.synthesize(&spec).unwrap();
        let first = spectrum[0];
        assert!(spectrum.iter().any(|&bin| bin != first));
    }
}
