//! VocoderGal CLI - offline and live vocoding from the command line
//!
//! This binary renders WAV files through the vocoder engine, prints the
//! effective configuration and band table, and (with the `cpal` feature)
//! runs the engine on the default audio devices.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocodergal_cli::commands;
use vocodergal_cli::commands::render::{RenderJob, RenderParams};

/// VocoderGal - 20-band realtime vocoder
#[derive(Parser)]
#[command(name = "vocodergal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Live parameter flags shared by `render` and `live`.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Carrier pitch in Hz (50-400)
    #[arg(long)]
    pitch: Option<f32>,

    /// Output intensity (0.2-4.0)
    #[arg(long)]
    intensity: Option<f32>,

    /// Carrier selector: 0 saw, 1 square, 2 triangle, 3 sine, 4 external
    #[arg(long)]
    waveform: Option<i32>,

    /// Vibrato amount (0-1)
    #[arg(long)]
    vibrato: Option<f32>,

    /// Echo amount (0-0.7)
    #[arg(long)]
    echo: Option<f32>,

    /// Tremolo amount (0-1)
    #[arg(long)]
    tremolo: Option<f32>,

    /// Noise gate threshold (0.005-0.2)
    #[arg(long)]
    noise_threshold: Option<f32>,
}

impl From<ParamArgs> for RenderParams {
    fn from(args: ParamArgs) -> Self {
        Self {
            pitch: args.pitch,
            intensity: args.intensity,
            waveform: args.waveform,
            vibrato: args.vibrato,
            echo: args.echo,
            tremolo: args.tremolo,
            noise_threshold: args.noise_threshold,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Vocode a WAV file and write the result
    Render {
        /// Modulator WAV file (usually a voice)
        #[arg(short, long)]
        modulator: PathBuf,

        /// External carrier WAV file; selects the external carrier
        #[arg(short, long)]
        carrier: Option<PathBuf>,

        /// Output WAV file (default: <modulator>.vocoded.wav)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Engine config JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Frames per render cycle (default: the configured callback size)
        #[arg(long)]
        frames: Option<usize>,

        /// Seconds to keep rendering after the modulator ends
        #[arg(long, default_value_t = 0.5)]
        tail: f32,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Print the effective engine configuration as JSON
    Config {
        /// Engine config JSON file to validate and complete
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the vocoder band table
    Bands {
        /// Engine config JSON file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the engine on the default audio devices
    #[cfg(feature = "cpal")]
    Live {
        /// Session length in seconds
        #[arg(short, long, default_value_t = 10.0)]
        seconds: f32,

        /// Loop this WAV file as the modulator instead of the microphone
        #[arg(short, long)]
        modulator: Option<PathBuf>,

        /// Record the microphone and save the take to this WAV file
        #[arg(long)]
        record: Option<PathBuf>,

        /// Engine config JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        params: ParamArgs,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render {
            modulator,
            carrier,
            output,
            config,
            frames,
            tail,
            params,
        } => {
            let output =
                output.unwrap_or_else(|| commands::render::default_output_for(&modulator));
            commands::render::run(&RenderJob {
                modulator,
                carrier,
                output,
                config,
                params: params.into(),
                frames,
                tail_seconds: tail,
            })
        }
        Commands::Config { config } => commands::config::run(config.as_deref()),
        Commands::Bands { config } => commands::bands::run(config.as_deref()),
        #[cfg(feature = "cpal")]
        Commands::Live {
            seconds,
            modulator,
            record,
            config,
            params,
        } => commands::live::run(&commands::live::LiveSession {
            config,
            seconds,
            modulator,
            record,
            params: params.into(),
        }),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
