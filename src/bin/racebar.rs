use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use racebar::{
    Chart, Clock as _, DrawSurface, Generation, MonotonicClock, Player, StepPlan, SvgSurface,
    TransitionHandle,
};

#[derive(Parser, Debug)]
#[command(name = "racebar", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the keyframe timeline and its prev/next links as JSON.
    Keyframes(KeyframesArgs),
    /// Render one interpolated frame as SVG or PNG.
    Frame(FrameArgs),
    /// Play the timeline in real time, printing each caption as it settles.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct KeyframesArgs {
    /// Input chart JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write to a file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input chart JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Keyframe index (0-based) the frame's step lands on.
    #[arg(long)]
    keyframe: usize,

    /// Step progress in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    progress: f64,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Output format. Inferred from the `--out` extension when omitted.
    #[arg(long, value_enum)]
    format: Option<FrameFormat>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input chart JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the per-keyframe duration.
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Write an SVG snapshot of every settled keyframe into this directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FrameFormat {
    Svg,
    Png,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Keyframes(args) => cmd_keyframes(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_input_json(path: &Path) -> anyhow::Result<racebar::ChartInput> {
    let f = File::open(path).with_context(|| format!("open chart input '{}'", path.display()))?;
    let input = racebar::ChartInput::from_reader(BufReader::new(f))
        .with_context(|| format!("parse chart input '{}'", path.display()))?;
    Ok(input)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_keyframes(args: KeyframesArgs) -> anyhow::Result<()> {
    let input = read_input_json(&args.in_path)?;
    let chart = input.chart();
    let json = serde_json::to_string_pretty(&chart.summary()).context("serialize timeline")?;

    match args.out {
        Some(out) => {
            create_parent_dir(&out)?;
            std::fs::write(&out, json.as_bytes())
                .with_context(|| format!("write timeline '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({} keyframes, n = {})",
                out.display(),
                chart.len(),
                chart.n()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&args.progress) {
        anyhow::bail!("--progress must be within [0, 1]");
    }
    let format = match args.format {
        Some(f) => f,
        None => infer_format(&args.out)?,
    };

    let input = read_input_json(&args.in_path)?;
    let chart = input.chart();
    let plan = StepPlan::for_keyframe(&chart, args.keyframe, args.keyframe.checked_sub(1))?;
    let sample = plan.sample(args.progress, input.playback.ease);

    // The caption only moves on once the step has settled.
    let caption_index = if args.progress >= 1.0 {
        args.keyframe
    } else {
        args.keyframe.saturating_sub(1)
    };
    let caption = chart.caption(caption_index);
    let svg = racebar::frame_svg(&chart, &sample, caption.as_deref())?;

    create_parent_dir(&args.out)?;
    match format {
        FrameFormat::Svg => std::fs::write(&args.out, svg.as_bytes())
            .with_context(|| format!("write svg '{}'", args.out.display()))?,
        FrameFormat::Png => {
            let frame = racebar::rasterize_svg(&svg)?;
            racebar::write_png(&args.out, &frame)?;
        }
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn infer_format(out: &Path) -> anyhow::Result<FrameFormat> {
    let ext = out
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("svg") => Ok(FrameFormat::Svg),
        Some("png") => Ok(FrameFormat::Png),
        _ => anyhow::bail!(
            "cannot infer frame format from '{}'; pass --format",
            out.display()
        ),
    }
}

/// Records every caption that settles a step, with a snapshot of the settled frame.
struct SettleLog {
    svg: SvgSurface,
    snapshots: bool,
    settled: Vec<(String, Option<String>)>,
    error: Option<racebar::RacebarError>,
}

impl DrawSurface for SettleLog {
    fn begin(&mut self, chart: &Arc<Chart>, generation: Generation) {
        self.svg.begin(chart, generation);
    }

    fn update_axis(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.svg.update_axis(plan, transition);
    }

    fn update_bars(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.svg.update_bars(plan, transition);
    }

    fn update_labels(&mut self, plan: &Arc<StepPlan>, transition: &TransitionHandle) {
        self.svg.update_labels(plan, transition);
    }

    fn set_caption(&mut self, text: &str) {
        self.svg.set_caption(text);
        // The caption shown when a sequence begins precedes any step.
        let Some(settled_at) = self.svg.step().map(|(_, t)| t.ends_at()) else {
            return;
        };
        let snapshot = if self.snapshots {
            match self.svg.snapshot(settled_at) {
                Ok(svg) => svg,
                Err(e) => {
                    if self.error.is_none() {
                        self.error = Some(e);
                    }
                    None
                }
            }
        } else {
            None
        };
        self.settled.push((text.to_owned(), snapshot));
    }
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let input = read_input_json(&args.in_path)?;
    let mut opts = input.playback;
    if let Some(ms) = args.duration_ms {
        opts.duration_ms = ms;
    }

    let chart = input.chart();
    if chart.is_empty() {
        eprintln!("timeline is empty; nothing to play");
        return Ok(());
    }
    eprintln!(
        "playing {} keyframes ({} names, n = {}) at {} ms per keyframe",
        chart.len(),
        chart.names().len(),
        chart.n(),
        opts.duration_ms
    );

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
    }

    let surface = SettleLog {
        svg: SvgSurface::new(),
        snapshots: args.out_dir.is_some(),
        settled: Vec::new(),
        error: None,
    };
    let mut player = Player::new(surface, MonotonicClock::new(), opts)?;
    player.bind(chart);
    player.start_iter();

    let mut written = 0usize;
    loop {
        player.pump();

        let log = player.surface_mut();
        if let Some(e) = log.error.take() {
            return Err(e.into());
        }
        for (caption, snapshot) in log.settled.drain(..) {
            println!("{caption}");
            if let (Some(dir), Some(svg)) = (&args.out_dir, snapshot) {
                let path = dir.join(format!("keyframe_{written:04}.svg"));
                std::fs::write(&path, svg.as_bytes())
                    .with_context(|| format!("write svg '{}'", path.display()))?;
            }
            written += 1;
        }

        if player.is_settled() {
            break;
        }
        let Some(deadline) = player.next_deadline() else {
            break;
        };
        let now = player.clock().now();
        std::thread::sleep(deadline.saturating_sub(now).max(Duration::from_millis(1)));
    }

    eprintln!("done");
    Ok(())
}
