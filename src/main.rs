use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;

use bandrec::audio::{DeviceSource, FileSource, RawPcmDecoder, WavDecoder};
use bandrec::config::RecorderConfig;
use bandrec::session::RecordingSession;

#[derive(Parser, Debug)]
#[command(name = "bandrec")]
#[command(about = "Record audio through a bandpass filter and export 16 kHz WAV", long_about = None)]
struct Args {
    /// Capture duration in seconds (live capture mode)
    #[arg(short, long, default_value = "5.0", conflicts_with = "input")]
    duration: f32,

    /// Process an existing WAV file instead of capturing live
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output path (defaults to the configured suggested filename)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Load configuration from a TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Filter centre frequency in Hz
    #[arg(long)]
    center: Option<f32>,

    /// Filter quality factor
    #[arg(long)]
    q: Option<f32>,

    /// Target sample rate in Hz
    #[arg(long)]
    rate: Option<u32>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &args.config {
        Some(path) => RecorderConfig::load(path)?,
        None => RecorderConfig::default(),
    };
    if let Some(center) = args.center {
        config.filter.center_hz = center;
    }
    if let Some(q) = args.q {
        config.filter.q = q;
    }
    if let Some(rate) = args.rate {
        config.render.target_sample_rate = rate;
    }

    println!("=== bandrec ===");
    println!(
        "Bandpass: {} Hz centre, Q = {}",
        config.filter.center_hz, config.filter.q
    );
    println!("Target rate: {} Hz", config.render.target_sample_rate);

    let mut session = match &args.input {
        Some(path) => {
            println!("Source: {}", path.display());
            RecordingSession::new(
                config,
                Box::new(FileSource::new(path.clone())),
                Box::new(WavDecoder),
            )
        }
        None => {
            println!(
                "Source: default input device ({} Hz, {} channels)",
                config.capture.sample_rate, config.capture.channels
            );
            let decoder = RawPcmDecoder {
                sample_rate: config.capture.sample_rate,
                channels: config.capture.channels,
            };
            RecordingSession::new(
                config.clone(),
                Box::new(DeviceSource::new(config.capture.clone())),
                Box::new(decoder),
            )
        }
    };

    session.start()?;

    if args.input.is_none() {
        println!("Recording for {:.1} s...", args.duration);
        thread::sleep(Duration::from_secs_f32(args.duration));
    }

    session.stop()?;

    let artifact = session
        .take_artifact()
        .ok_or_else(|| anyhow::anyhow!("no artifact produced"))?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&artifact.filename));
    std::fs::write(&output, &artifact.bytes)?;
    println!("Wrote {} bytes to {}", artifact.bytes.len(), output.display());

    Ok(())
}
