//! Replay a recorded detection log through the reaction pipeline.
//!
//! Usage:
//!   meme-face session.jsonl                    # Key changes, human-readable
//!   meme-face session.jsonl --json             # Every cycle as JSON
//!   meme-face session.jsonl --json --debug     # ...with debug records
//!   meme-face session.jsonl -o outputs.json    # Save to file
//!
//! Each log line is one cycle:
//!   {"t_ms": 80.0, "video_time_ms": 80.0, "landmarks": [...], "blendshapes": {"jawOpen": 0.4}}

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use meme_face::{
    Blendshapes, CaptureStatus, Config, DetectionResult, FrameAccess, FrameOutput, Landmarks,
    ReactionPipeline, RgbFrame,
};
use serde::Deserialize;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "meme-face")]
#[command(author, version, about = "Replay recorded face detections and print the chosen reactions", long_about = None)]
struct Args {
    /// Detection log, one JSON object per line
    #[arg(required = true)]
    log: PathBuf,

    /// Pipeline config (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Still image supplying pixels for the tongue colour check
    #[arg(long)]
    frame: Option<PathBuf>,

    /// Output every cycle as JSON
    #[arg(short, long)]
    json: bool,

    /// Include debug records in JSON output
    #[arg(long)]
    debug: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// One recorded detection cycle.
#[derive(Debug, Deserialize)]
struct RecordedCycle {
    t_ms: f64,
    #[serde(default)]
    video_time_ms: Option<f64>,
    #[serde(default)]
    landmarks: Option<Landmarks>,
    #[serde(default)]
    blendshapes: Option<Blendshapes>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    config.debug |= args.debug;

    let frame = args.frame.as_deref().map(load_frame).transpose()?;
    let cycles = read_log(&args.log)?;
    info!(cycles = cycles.len(), "replaying {}", args.log.display());

    let mut pipeline = ReactionPipeline::new(config);
    let outputs: Vec<FrameOutput> = cycles
        .iter()
        .map(|cycle| {
            let capture = CaptureStatus::live(cycle.video_time_ms.unwrap_or(cycle.t_ms));
            let detection = DetectionResult {
                landmarks: cycle.landmarks.clone(),
                blendshapes: cycle.blendshapes.clone(),
            };
            pipeline.process(
                cycle.t_ms,
                &capture,
                &detection,
                frame.as_ref().map(|f| f as &dyn FrameAccess),
            )
        })
        .collect();
    pipeline.set_stopped();

    let output_str = if args.json {
        serde_json::to_string_pretty(&outputs)?
    } else {
        format_human_readable(&outputs)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str).with_context(|| format!("writing {}", path.display()))?;
        debug!("output written to {}", path.display());
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn read_log(path: &Path) -> Result<Vec<RecordedCycle>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut cycles = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let cycle: RecordedCycle =
            serde_json::from_str(&line).with_context(|| format!("{}:{}", path.display(), n + 1))?;
        cycles.push(cycle);
    }
    if cycles.is_empty() {
        bail!("{} contains no cycles", path.display());
    }
    Ok(cycles)
}

fn load_frame(path: &Path) -> Result<RgbFrame> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    debug!(width, height, "loaded still frame");
    Ok(RgbFrame::new(img.into_raw(), width, height))
}

/// One line per change of displayed key.
fn format_human_readable(outputs: &[FrameOutput]) -> String {
    let mut s = String::new();
    let mut shown: Option<&str> = None;

    for out in outputs {
        if shown == Some(out.key.as_str()) {
            continue;
        }
        s.push_str(&format!(
            "{:>9.0} ms  {:<10} ({})\n",
            out.timestamp_ms, out.key, out.label
        ));
        shown = Some(&out.key);
    }

    if let Some(last) = outputs.last() {
        s.push_str(&format!("\nCycles: {}\nFinal: {}\n", outputs.len(), last.key));
    }
    s
}
