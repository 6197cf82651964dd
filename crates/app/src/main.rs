use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;
use spectrum_synth_core::{ModulationSpec, SpectrumSpec, SynthesisEngine};
use tracing_subscriber::EnvFilter;

fn main() -> spectrum_synth_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            spec,
            seed,
            noise_sigma,
        } => run_generate(spec.as_deref(), seed, noise_sigma),
        Commands::Preset { output } => run_preset(&output),
    }
}

fn run_generate(
    spec_path: Option<&std::path::Path>,
    seed: Option<u64>,
    noise_sigma: f64,
) -> spectrum_synth_core::Result<()> {
    let spec = match spec_path {
        Some(path) => SpectrumSpec::from_json(&fs::read_to_string(path)?)?,
        None => demo_spec(),
    };
    tracing::info!(
        points = spec.points,
        modulations = spec.modulation.len(),
        seed,
        "synthesizing spectrum"
    );

    let mut engine = match seed {
        Some(seed) => SynthesisEngine::seeded(seed, noise_sigma)?,
        None => SynthesisEngine::with_noise_sigma(noise_sigma)?,
    };
    let spectrum = engine.synthesize(&spec)?;
    let time_domain = centred_time_domain(&spectrum);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for value in &spectrum {
        writeln!(out, "{value}")?;
    }
    writeln!(out, "---")?;
    for sample in &time_domain {
        writeln!(out, "{sample}")?;
    }
    Ok(())
}

fn run_preset(output: &PathBuf) -> spectrum_synth_core::Result<()> {
    tracing::info!(?output, "writing demo preset");
    fs::write(output, demo_spec().to_json()?)?;
    Ok(())
}

/// The built-in two-modulation request: a strong tone with one sideband
/// order plus a weaker plain comb.
fn demo_spec() -> SpectrumSpec {
    SpectrumSpec {
        modulation: vec![
            ModulationSpec {
                frequency: 5000.0,
                sidebands: 1,
                sideband_offset: 8.0,
                sigma: 0.5,
                snr: 1e9,
            },
            ModulationSpec {
                frequency: 512.0,
                sidebands: 0,
                sideband_offset: 0.0,
                sigma: 0.5,
                snr: 2e8,
            },
        ],
        points: 4096,
        rbw: 1.0,
    }
}

/// Inverse transform of the spectrum with the zero-frequency sample rotated
/// to the centre of the sequence.
fn centred_time_domain(spectrum: &[f64]) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = spectrum
        .iter()
        .map(|&value| Complex64::new(value, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(buffer.len()).process(&mut buffer);

    let scale = 1.0 / buffer.len() as f64;
    for sample in &mut buffer {
        *sample *= scale;
    }

    let midpoint = buffer.len() / 2;
    buffer.rotate_left(midpoint);
    buffer
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic spectrum generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a spectrum and print it with its time-domain counterpart.
    Generate {
        /// Path to a JSON spectrum specification. Defaults to the demo preset.
        #[arg(short, long)]
        spec: Option<PathBuf>,
        /// Seed for the random source; omit for a fresh entropy seed.
        #[arg(long)]
        seed: Option<u64>,
        /// Standard deviation of the noise floor (0 disables noise).
        #[arg(long, default_value_t = 1.0)]
        noise_sigma: f64,
    },
    /// Write the built-in demo specification as JSON.
    Preset {
        /// Output path for the preset file.
        output: PathBuf,
    },
}
