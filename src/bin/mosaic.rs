use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use mosaic::{
    ByteSink, CodedSource, FileSink, Fps, FrameChunkSource, KNOWN_CODECS, LaneConfig, Pipeline,
    PipelineConfig, PipelineContext, RateControlMode,
};

#[derive(Parser, Debug)]
#[command(name = "mosaic", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite raw NV12 input files into one stream.
    Run(RunArgs),
    /// List registered engine backends.
    Backends,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Job JSON (inputs, output and pipeline config). Flags override its values.
    #[arg(long)]
    job: Option<PathBuf>,

    /// Raw input file, one per lane. Repeat for more lanes.
    #[arg(long = "input", short = 'i')]
    inputs: Vec<PathBuf>,

    /// Output file for the encoded stream.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Decoder tag for every lane.
    #[arg(long)]
    decoder: Option<String>,

    /// Width of every input picture.
    #[arg(long)]
    lane_width: Option<u32>,

    /// Height of every input picture.
    #[arg(long)]
    lane_height: Option<u32>,

    /// Compositor output width.
    #[arg(long)]
    width: Option<u32>,

    /// Compositor output height.
    #[arg(long)]
    height: Option<u32>,

    /// Target rate, `N` or `NUM/DEN`.
    #[arg(long, value_parser = parse_fps)]
    fps: Option<Fps>,

    /// Compositor output ring depth.
    #[arg(long)]
    buffers: Option<usize>,

    /// Decoded pictures each lane's decoder may hold before its feed waits.
    #[arg(long)]
    decoder_queue: Option<usize>,

    /// Throttle each lane's feed at this many undrained units.
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Encoder rate control.
    #[arg(long, value_enum)]
    rc_mode: Option<RcModeChoice>,

    /// Encoder target bitrate in bits per second.
    #[arg(long)]
    bps: Option<u32>,

    /// Encoder keyframe interval in frames.
    #[arg(long)]
    gop: Option<u32>,

    /// Display backend tag; registered backends are tried in order when omitted.
    #[arg(long)]
    display: Option<String>,

    /// Do not present output.
    #[arg(long, conflicts_with = "display")]
    no_display: bool,

    /// Write the last presented picture to this PNG (snapshot display).
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write the run report as JSON.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RcModeChoice {
    Vbr,
    Cbr,
    Fixqp,
    Avbr,
}

impl From<RcModeChoice> for RateControlMode {
    fn from(value: RcModeChoice) -> Self {
        match value {
            RcModeChoice::Vbr => Self::Vbr,
            RcModeChoice::Cbr => Self::Cbr,
            RcModeChoice::Fixqp => Self::FixQp,
            RcModeChoice::Avbr => Self::Avbr,
        }
    }
}

/// On-disk job description.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct JobConfig {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
    pipeline: PipelineConfig,
}

impl JobConfig {
    fn from_path(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job '{}'", path.display()))?;
        let mut job: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse job JSON '{}'", path.display()))?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        for input in &mut job.inputs {
            *input = resolve(root, input);
        }
        job.output = job.output.map(|p| resolve(root, &p));
        job.report = job.report.map(|p| resolve(root, &p));
        Ok(job)
    }
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn parse_fps(s: &str) -> Result<Fps, String> {
    let (num, den) = match s.split_once('/') {
        Some((n, d)) => (n.trim(), d.trim()),
        None => (s.trim(), "1"),
    };
    let num: u32 = num.parse().map_err(|e| format!("bad fps numerator '{num}': {e}"))?;
    let den: u32 = den.parse().map_err(|e| format!("bad fps denominator '{den}': {e}"))?;
    Fps::new(num, den).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Backends => cmd_backends(),
    }
}

fn cmd_backends() -> anyhow::Result<()> {
    let ctx = PipelineContext::default();
    let list = |tags: Vec<&str>| tags.join(", ");
    println!("decoders:    {}", list(ctx.decoders.tags().collect()));
    println!("encoders:    {}", list(ctx.encoders.tags().collect()));
    println!("compositors: {}", list(ctx.compositors.tags().collect()));
    println!("displays:    {}", list(ctx.displays.tags().collect()));
    let unavailable: Vec<&str> = KNOWN_CODECS
        .iter()
        .copied()
        .filter(|c| !ctx.decoders.contains(c))
        .collect();
    if !unavailable.is_empty() {
        println!("known codecs without an engine: {}", unavailable.join(", "));
    }
    Ok(())
}

fn build_config(args: &RunArgs, job: &JobConfig, inputs: usize) -> PipelineConfig {
    let mut cfg = job.pipeline.clone();
    if cfg.lanes.len() != inputs {
        let template = cfg.lanes.first().cloned().unwrap_or_else(LaneConfig::default);
        cfg.lanes = vec![template; inputs];
    }
    for lane in &mut cfg.lanes {
        if let Some(decoder) = &args.decoder {
            lane.decoder = decoder.clone();
        }
        if let Some(w) = args.lane_width {
            lane.width = w;
        }
        if let Some(h) = args.lane_height {
            lane.height = h;
        }
        if let Some(depth) = args.decoder_queue {
            lane.decoder_queue = depth;
        }
        if args.max_in_flight.is_some() {
            lane.max_in_flight = args.max_in_flight;
        }
    }

    if let Some(w) = args.width {
        cfg.compositor.width = w;
    }
    if let Some(h) = args.height {
        cfg.compositor.height = h;
    }
    if let Some(fps) = args.fps {
        cfg.compositor.fps = fps;
    }
    if let Some(n) = args.buffers {
        cfg.compositor.buffer_count = n;
    }

    if let Some(mode) = args.rc_mode {
        cfg.encoder.params.rc_mode = mode.into();
    }
    if let Some(bps) = args.bps {
        cfg.encoder.params.bitrate_bps = bps;
    }
    if let Some(gop) = args.gop {
        cfg.encoder.params.gop = gop;
    }

    if args.no_display {
        cfg.display.enabled = false;
    }
    if let Some(tag) = &args.display {
        cfg.display.enabled = true;
        cfg.display.backend = Some(tag.clone());
    }
    if let Some(path) = &args.snapshot {
        cfg.display.snapshot_path = Some(path.clone());
    }
    cfg
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let job = match &args.job {
        Some(path) => JobConfig::from_path(path)?,
        None => JobConfig::default(),
    };
    let inputs = if args.inputs.is_empty() {
        job.inputs.clone()
    } else {
        args.inputs.clone()
    };
    anyhow::ensure!(!inputs.is_empty(), "no inputs given (use --input or a job file)");
    let output = args
        .output
        .clone()
        .or_else(|| job.output.clone())
        .context("no output given (use --output or a job file)")?;
    let report_path = args.report.clone().or_else(|| job.report.clone());

    let cfg = build_config(&args, &job, inputs.len());
    let pipeline = Pipeline::new(cfg, PipelineContext::default()).context("invalid pipeline")?;

    let mut sources: Vec<Box<dyn CodedSource>> = Vec::with_capacity(inputs.len());
    for (lane, path) in inputs.iter().enumerate() {
        let chunk = pipeline.config().lanes[lane].frame_bytes();
        let source = FrameChunkSource::open(path, chunk)
            .with_context(|| format!("open lane {lane} input"))?;
        sources.push(Box::new(source));
    }
    let mut sink = FileSink::create(&output)
        .with_context(|| format!("create output '{}'", output.display()))?;

    let report = pipeline
        .run(sources, &mut sink as &mut dyn ByteSink)
        .context("pipeline run failed")?;

    eprintln!(
        "composed {} cycles ({} behind), {} packets, {} bytes -> {}",
        report.cycles,
        report.falling_behind,
        report.packets,
        report.bytes_written,
        output.display()
    );
    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json_pretty())
            .with_context(|| format!("write report '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
