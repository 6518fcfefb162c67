//! `modfilter` command line tool
//!
//! Inspect filter responses, render WAV files offline, or audition the
//! filter live on pink noise.

use clap::{Args, Parser, Subcommand, ValueEnum};

use modfilter::engine::{synced_frequency, ModFilter, ProcessSpec};
use modfilter::params::{FilterParams, CUTOFF_RANGE, LFO_DEPTH_RANGE, LFO_RATE_RANGE, RESONANCE_RANGE};
use modfilter::utils::init_logger;
use modfilter::{FilterType, Waveform};

#[derive(Parser)]
#[command(name = "modfilter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more detail (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print coefficients and magnitude response for a setting
    Inspect {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sample rate to design for
        #[arg(long, default_value_t = 48000.0)]
        sample_rate: f64,
    },

    /// Render a WAV file through the filter
    #[cfg(feature = "bounce")]
    Render {
        /// Input WAV file
        #[arg(short, long)]
        input: std::path::PathBuf,

        /// Output WAV file (32-bit float)
        #[arg(short, long)]
        output: std::path::PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Filter pink noise on the default output device
    #[cfg(feature = "native")]
    Play {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeArg {
    Lowpass,
    Highpass,
    Bandpass,
    Allpass,
}

impl From<TypeArg> for FilterType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Lowpass => FilterType::LowPass,
            TypeArg::Highpass => FilterType::HighPass,
            TypeArg::Bandpass => FilterType::BandPass,
            TypeArg::Allpass => FilterType::AllPass,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum WaveArg {
    Sine,
    RampUp,
    RampDown,
    Square,
}

impl From<WaveArg> for Waveform {
    fn from(arg: WaveArg) -> Self {
        match arg {
            WaveArg::Sine => Waveform::Sine,
            WaveArg::RampUp => Waveform::RampUp,
            WaveArg::RampDown => Waveform::RampDown,
            WaveArg::Square => Waveform::Square,
        }
    }
}

/// Filter settings shared by every subcommand
#[derive(Args)]
struct FilterArgs {
    /// Cutoff frequency in Hz
    #[arg(short, long, default_value_t = CUTOFF_RANGE.default)]
    cutoff: f32,

    /// Resonance (Q)
    #[arg(short, long, default_value_t = RESONANCE_RANGE.default)]
    q: f32,

    /// Response type
    #[arg(short = 't', long = "type", value_enum, default_value_t = TypeArg::Lowpass)]
    filter_type: TypeArg,

    /// Enable cutoff modulation
    #[arg(long)]
    lfo: bool,

    /// LFO waveform
    #[arg(long, value_enum, default_value_t = WaveArg::Sine)]
    wave: WaveArg,

    /// LFO depth in Hz
    #[arg(long, default_value_t = LFO_DEPTH_RANGE.default)]
    depth: f32,

    /// LFO rate in Hz
    #[arg(long, default_value_t = LFO_RATE_RANGE.default)]
    rate: f32,

    /// Lock the LFO to one cycle per bar at this tempo
    #[arg(long)]
    bpm: Option<f64>,
}

impl FilterArgs {
    fn params(&self) -> FilterParams {
        FilterParams {
            cutoff_hz: self.cutoff,
            resonance: self.q,
            filter_type: self.filter_type.into(),
            lfo_enabled: self.lfo,
            lfo_waveform: self.wave.into(),
            lfo_depth: self.depth,
            lfo_rate_hz: self.rate,
            lfo_sync: self.bpm.is_some(),
            host_bpm: self.bpm,
        }
        .clamped()
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    init_logger(level);

    match cli.command {
        Commands::Inspect {
            filter,
            sample_rate,
        } => inspect(&filter.params(), sample_rate),
        #[cfg(feature = "bounce")]
        Commands::Render {
            input,
            output,
            filter,
        } => {
            let stats = modfilter::bounce::render_wav(&input, &output, &filter.params())?;
            println!(
                "{} frames, {} channel(s), peak {:.3}",
                stats.frames, stats.channels, stats.peak
            );
            Ok(())
        }
        #[cfg(feature = "native")]
        Commands::Play { filter } => play(&filter.params()),
    }
}

fn inspect(params: &FilterParams, sample_rate: f64) -> anyhow::Result<()> {
    let spec = ProcessSpec::new(sample_rate, 512, 1);
    let mut processor = ModFilter::with_params(spec, *params);
    processor.prepare(spec)?;

    let biquad = processor.filter();
    let c = biquad.coefficients();
    println!(
        "{} @ {:.1} Hz, Q {:.2}, fs {} Hz",
        biquad.filter_type().name(),
        biquad.cutoff(),
        biquad.resonance(),
        sample_rate
    );
    println!("b: [{:.6}, {:.6}, {:.6}]", c.b0, c.b1, c.b2);
    println!("a: [{:.6}, {:.6}, {:.6}]", c.a0, c.a1, c.a2);

    println!("{:>10}  {:>8}", "Hz", "dB");
    for hz in [20.0f32, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0, 10000.0, 20000.0] {
        if f64::from(hz) >= sample_rate / 2.0 {
            break;
        }
        let db = 20.0 * biquad.magnitude_at(hz).max(1e-9).log10();
        println!("{:>10.0}  {:>8.2}", hz, db);
    }

    if params.lfo_enabled {
        let rate = if params.lfo_sync {
            synced_frequency(params.host_bpm).unwrap_or(params.lfo_rate_hz)
        } else {
            params.lfo_rate_hz
        };
        println!(
            "lfo: {:?} at {:.3} Hz, cutoff swings {:.1}..{:.1} Hz",
            params.lfo_waveform,
            rate,
            modfilter::engine::modulated_cutoff(-1.0, params.lfo_depth, params.cutoff_hz),
            modfilter::engine::modulated_cutoff(1.0, params.lfo_depth, params.cutoff_hz),
        );
    }
    Ok(())
}

#[cfg(feature = "native")]
fn play(params: &FilterParams) -> anyhow::Result<()> {
    use modfilter::engine::EngineOutput;
    use std::io::{self, BufRead, Write};
    use std::sync::{Arc, Mutex};

    let processor = Arc::new(Mutex::new(ModFilter::with_params(
        ProcessSpec::default(),
        *params,
    )));

    let mut output = EngineOutput::new();
    output.initialize()?;
    output.create_stream(processor.clone())?;
    output.start()?;

    println!("Commands: c <hz>, q <value>, l (toggle lfo), r (reset), x (quit)");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let value = parts.next().and_then(|v| v.parse::<f32>().ok());

        let mut processor = processor
            .lock()
            .map_err(|_| anyhow::anyhow!("processor lock poisoned"))?;
        match (command, value) {
            ("c", Some(hz)) => processor.set_cutoff(hz),
            ("q", Some(q)) => processor.set_resonance(q),
            ("l", _) => {
                let enabled = !processor.lfo_enabled();
                processor.set_lfo_enabled(enabled);
            }
            ("r", _) => processor.reset(),
            ("x", _) => break,
            _ => println!("Commands: c <hz>, q <value>, l (toggle lfo), r (reset), x (quit)"),
        }
    }

    output.stop()?;
    Ok(())
}
