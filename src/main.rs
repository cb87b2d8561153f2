//! Demo window: a ring fed by a simulated background task.
//!
//! Space/Enter starts the task, Escape cancels it, `m` toggles the marquee,
//! `+`/`-` nudge the value by one step.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use ring_progress::config::load_font_data;
use ring_progress::{
    BackgroundWorker, Color, ProgressRing, ProgressRingConfig, ProgressRingWindow, ProgressStyle,
    RingController, WorkerConfig, WorkerEvent,
};
use tracing::{info, warn};
use winit::keyboard::{Key, NamedKey};

/// Fonts tried when `--font` is not given
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

#[derive(Parser)]
#[command(name = "ring-progress")]
#[command(about = "Circular progress ring driven by a simulated background task", long_about = None)]
struct Cli {
    /// Window title
    #[arg(long, default_value = "Ring Progress")]
    title: String,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 300)]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 300)]
    height: u32,

    /// TrueType/OpenType font for the percentage label
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Label size in pixels
    #[arg(long, default_value_t = 24.0)]
    font_size: f32,

    /// Progress color as RRGGBB
    #[arg(long, value_name = "RRGGBB", value_parser = parse_color)]
    color: Option<Color>,

    /// Start in marquee (indeterminate) style
    #[arg(long)]
    marquee: bool,

    /// Marquee animation speed in milliseconds per tick
    #[arg(long, value_name = "MS", default_value_t = 100)]
    speed: u64,

    /// Keep the height/width ratio fixed while resizing
    #[arg(long)]
    lock_ratio: bool,

    /// Delay of each simulated work step in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    step_delay: u64,

    /// Random extra delay per step, up to this many milliseconds
    #[arg(long, value_name = "MS", default_value_t = 0)]
    jitter: u64,

    /// Start the simulated task as soon as the window opens
    #[arg(long)]
    autostart: bool,
}

/// Stands in for the Start/Stop buttons of a form
struct DemoController {
    worker_config: WorkerConfig,
    worker: Option<BackgroundWorker>,
    sender: Sender<WorkerEvent>,
    receiver: Receiver<WorkerEvent>,
    autostart: bool,
}

impl DemoController {
    fn new(worker_config: WorkerConfig, autostart: bool) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            worker_config,
            worker: None,
            sender,
            receiver,
            autostart,
        }
    }

    fn start(&mut self, ring: &mut ProgressRing) {
        if self.worker.is_some() {
            return;
        }
        ring.set_value(0);
        self.worker = Some(BackgroundWorker::spawn(
            self.worker_config.clone(),
            self.sender.clone(),
        ));
    }

    fn stop(&mut self) {
        if let Some(worker) = &self.worker {
            info!("cancelling worker");
            worker.cancel();
        }
    }
}

impl RingController for DemoController {
    fn on_key(&mut self, ring: &mut ProgressRing, key: &Key) {
        match key {
            Key::Named(NamedKey::Space | NamedKey::Enter) => self.start(ring),
            Key::Named(NamedKey::Escape) => self.stop(),
            Key::Character(c) => match c.as_str() {
                "m" | "M" => {
                    let style = if ring.style() == ProgressStyle::Marquee {
                        ProgressStyle::Continuous
                    } else {
                        ProgressStyle::Marquee
                    };
                    ring.set_style(style);
                }
                "+" | "=" => ring.perform_step(),
                "-" => ring.decrement(ring.step()),
                _ => {}
            },
            _ => {}
        }
    }

    fn on_idle(&mut self, ring: &mut ProgressRing) {
        if std::mem::take(&mut self.autostart) {
            self.start(ring);
        }
        while let Ok(event) = self.receiver.try_recv() {
            match event {
                WorkerEvent::Progress(value) => ring.set_value(value),
                WorkerEvent::Completed { cancelled } => {
                    info!(cancelled, value = ring.value(), "task completed");
                    self.worker = None;
                }
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.autostart || self.worker.is_some()
    }
}

fn parse_color(s: &str) -> Result<Color, String> {
    s.parse::<Color>().map_err(|err| err.to_string())
}

fn resolve_font(explicit: Option<&Path>) -> Result<Option<Vec<u8>>> {
    if let Some(path) = explicit {
        let data = load_font_data(path)
            .with_context(|| format!("failed to load font {}", path.display()))?;
        return Ok(Some(data));
    }
    for candidate in FALLBACK_FONTS.iter().map(Path::new) {
        if let Ok(data) = load_font_data(candidate) {
            info!(font = %candidate.display(), "using fallback font");
            return Ok(Some(data));
        }
    }
    warn!("no font found, the percentage label will not be drawn (use --font)");
    Ok(None)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let style = if cli.marquee {
        ProgressStyle::Marquee
    } else {
        ProgressStyle::Continuous
    };
    let config = ProgressRingConfig::builder()
        .title(cli.title)
        .window_width(cli.width)
        .window_height(cli.height)
        .style(style)
        .marquee_speed_ms(cli.speed)
        .lock_aspect_ratio(cli.lock_ratio)
        .maybe_progress_color(cli.color)
        .maybe_font_data(resolve_font(cli.font.as_deref())?)
        .font_size(cli.font_size)
        .build();

    let worker_config = WorkerConfig {
        step_delay: Duration::from_millis(cli.step_delay),
        jitter: Duration::from_millis(cli.jitter),
        ..WorkerConfig::default()
    };

    let window = ProgressRingWindow::new(config).context("failed to create progress ring")?;
    window
        .run(DemoController::new(worker_config, cli.autostart))
        .context("event loop failed")
}
