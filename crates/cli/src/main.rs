#![deny(unsafe_code)]
//! CLI binary for the mesh-gradient backdrop.
//!
//! Subcommands:
//! - `render`: seed one field, optionally blend to a palette, simulate, write PNG
//! - `run`: drive the full orchestrator on a virtual clock
//! - `palette <image>`: print the palette extracted from an image

mod error;
mod extract;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand};
use error::CliError;
use extract::{palette_from_file, ImagePaletteSource};
use meshglow_core::{
    cycle_progress, FramePacer, FrameStatus, GradientField, MeshConfig, Notice, Orchestrator,
    Palette, PaletteSource, Rgb, Xorshift64,
};
use meshglow_raster::snapshot::{write_png, write_png_over};
use meshglow_raster::Pixmap;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Display refresh rate the virtual clock of `run` ticks at.
const DISPLAY_HZ: f64 = 60.0;

#[derive(Parser)]
#[command(name = "meshglow", about = "Animated mesh-gradient backdrop renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Load configuration from a JSON file; missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Canvas options shared by `render` and `run`; each overrides the config file.
#[derive(Args)]
struct CanvasArgs {
    /// Canvas width in pixels.
    #[arg(short = 'W', long, default_value_t = 640)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(short = 'H', long, default_value_t = 360)]
    height: u32,

    /// PRNG seed for deterministic output.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of blob points.
    #[arg(long)]
    points: Option<usize>,

    /// Glow radius in pixels.
    #[arg(long)]
    blur: Option<f64>,

    /// Page color behind the canvas, as hex.
    #[arg(long, default_value = "#000000")]
    background: String,

    /// Keep transparency instead of flattening over the background.
    #[arg(long)]
    transparent: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Seed a field, optionally blend it to a palette, and write a PNG.
    Render {
        #[command(flatten)]
        canvas: CanvasArgs,

        /// Comma-separated hex colors to blend to (e.g. "#ff8800,#223344").
        #[arg(short, long, conflicts_with = "image")]
        palette: Option<String>,

        /// Image file to extract the palette from.
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Simulated time in milliseconds; frames are stepped at the configured fps.
        #[arg(long, default_value_t = 1000.0)]
        at: f64,

        /// Output file path.
        #[arg(short, long, default_value = "mesh.png")]
        output: PathBuf,
    },
    /// Run the backdrop on a virtual clock, answering palette requests from image files.
    Run {
        #[command(flatten)]
        canvas: CanvasArgs,

        /// Simulated duration in seconds.
        #[arg(short, long, default_value_t = 180.0)]
        duration: f64,

        /// Coarse timer period in milliseconds.
        #[arg(long, default_value_t = 100.0)]
        tick_ms: f64,

        /// Directory holding cover images, matched by the last segment of each track URL.
        #[arg(long)]
        covers: Option<PathBuf>,

        /// Write every Nth rendered frame into this directory.
        #[arg(long)]
        frames_dir: Option<PathBuf>,

        /// Frame interval for --frames-dir.
        #[arg(long, default_value_t = 30)]
        every: u64,

        /// Suppress the continuous loop; colors settle once per track change.
        #[arg(long)]
        reduced_motion: bool,

        /// Write the final frame here.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the palette extracted from an image.
    Palette {
        /// Image file path.
        image: PathBuf,

        /// Number of colors to extract.
        #[arg(short, long, default_value_t = 7)]
        count: usize,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<MeshConfig, CliError> {
    let Some(path) = path else {
        return Ok(MeshConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    MeshConfig::from_json(&text).map_err(|e| CliError::Input(format!("{}: {e}", path.display())))
}

fn parse_palette(list: &str) -> Result<Palette, CliError> {
    let hexes: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    Palette::from_hex(&hexes).map_err(|e| CliError::Input(format!("invalid --palette: {e}")))
}

fn parse_background(hex: &str) -> Result<Rgb, CliError> {
    Rgb::from_hex(hex).map_err(|e| CliError::Input(format!("invalid --background: {e}")))
}

fn apply_canvas(config: &mut MeshConfig, canvas: &CanvasArgs) -> Result<(), CliError> {
    if let Some(seed) = canvas.seed {
        config.seed = seed;
    }
    if let Some(points) = canvas.points {
        config.point_count = points;
    }
    if let Some(blur) = canvas.blur {
        config.blur_amount = blur;
    }
    config.validate()?;
    Ok(())
}

fn save(pixmap: &Pixmap, canvas: &CanvasArgs, background: Rgb, path: &Path) -> Result<(), CliError> {
    if canvas.transparent {
        write_png(pixmap, path)?;
    } else {
        write_png_over(pixmap, background, path)?;
    }
    Ok(())
}

fn render(
    mut config: MeshConfig,
    canvas: &CanvasArgs,
    palette: Option<Palette>,
    at: f64,
    output: &Path,
) -> Result<usize, CliError> {
    apply_canvas(&mut config, canvas)?;
    let background = parse_background(&canvas.background)?;
    let mut pixmap = Pixmap::new(canvas.width, canvas.height)?;
    let mut rng = Xorshift64::new(config.seed);
    let mut field = GradientField::from_config(
        &config,
        f64::from(canvas.width),
        f64::from(canvas.height),
        &mut rng,
    )?;
    if let Some(palette) = &palette {
        field.update_colors(palette.colors(), 0.0);
    }

    let step = FramePacer::new(config.fps).interval();
    let mut frames = 0;
    let mut now = 0.0;
    while now <= at {
        let progress = cycle_progress(now, config.cycle_ms, config.cycle_ease);
        field.animate(progress, now);
        frames += 1;
        now += step;
    }
    debug!(frames, at, "simulation finished");

    field.render(&mut pixmap);
    save(&pixmap, canvas, background, output)?;
    Ok(frames)
}

struct RunOptions {
    duration_ms: f64,
    tick_ms: f64,
    covers: Option<PathBuf>,
    frames_dir: Option<PathBuf>,
    every: u64,
    output: Option<PathBuf>,
}

struct RunSummary {
    frames_rendered: u64,
    frames_written: u64,
    notices: usize,
    cover: Option<String>,
}

/// Answers every queued palette request; resolving can queue more notices.
fn pump_notices(
    orch: &mut Orchestrator<Pixmap>,
    source: &mut dyn PaletteSource,
    now: f64,
    json: bool,
    summary: &mut RunSummary,
) -> Result<(), CliError> {
    loop {
        let notices = orch.drain_notices();
        if notices.is_empty() {
            return Ok(());
        }
        for notice in notices {
            summary.notices += 1;
            if json {
                println!("{}", serde_json::to_string(&serde_json::json!({ "at": now, "notice": &notice }))?);
            } else {
                info!(at = now, notice = %serde_json::to_string(&notice)?, "notice");
            }
            match notice {
                Notice::PaletteRequested {
                    ticket,
                    image_url,
                    count,
                } => {
                    let result = source.extract(&image_url, count);
                    orch.resolve_palette(ticket, result, now);
                }
                Notice::CoverChanged { url } => summary.cover = Some(url),
                _ => {}
            }
        }
    }
}

fn run_backdrop(
    mut config: MeshConfig,
    canvas: &CanvasArgs,
    reduced_motion: bool,
    opts: RunOptions,
    json: bool,
) -> Result<RunSummary, CliError> {
    apply_canvas(&mut config, canvas)?;
    config.reduced_motion |= reduced_motion;
    if !(opts.tick_ms.is_finite() && opts.tick_ms > 0.0) {
        return Err(CliError::Input("--tick-ms must be positive".into()));
    }
    let background = parse_background(&canvas.background)?;
    if let Some(dir) = &opts.frames_dir {
        fs::create_dir_all(dir)?;
    }

    let pixmap = Pixmap::new(canvas.width, canvas.height)?;
    let mut orch = Orchestrator::new(config, pixmap)?;
    let mut source = ImagePaletteSource::new(opts.covers);
    let mut summary = RunSummary {
        frames_rendered: 0,
        frames_written: 0,
        notices: 0,
        cover: None,
    };

    let frame_ms = 1000.0 / DISPLAY_HZ;
    let mut now = 0.0;
    let mut next_tick = 0.0;
    orch.start(now);
    pump_notices(&mut orch, &mut source, now, json, &mut summary)?;

    while now <= opts.duration_ms {
        if now >= next_tick {
            orch.tick(now);
            next_tick += opts.tick_ms;
            pump_notices(&mut orch, &mut source, now, json, &mut summary)?;
        }
        if orch.on_frame(now) == FrameStatus::Rendered {
            summary.frames_rendered += 1;
            if let Some(dir) = &opts.frames_dir {
                if opts.every > 0 && summary.frames_rendered % opts.every == 0 {
                    let path = dir.join(format!("frame-{:06}.png", summary.frames_rendered));
                    save(orch.surface(), canvas, background, &path)?;
                    summary.frames_written += 1;
                }
            }
        }
        now += frame_ms;
    }

    if let Some(path) = &opts.output {
        save(orch.surface(), canvas, background, path)?;
    }
    orch.teardown();
    Ok(summary)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Render {
            canvas,
            palette,
            image,
            at,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let palette = match (palette, image) {
                (Some(list), _) => Some(parse_palette(&list)?),
                (None, Some(path)) => Some(
                    palette_from_file(&path, config.palette_size)
                        .map_err(|e| CliError::Input(e.to_string()))?,
                ),
                (None, None) => None,
            };
            let hexes: Option<Vec<String>> = palette
                .as_ref()
                .map(|p| p.colors().iter().map(|c| c.to_hex()).collect());
            let frames = render(config, &canvas, palette, at, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "width": canvas.width,
                    "height": canvas.height,
                    "at": at,
                    "frames": frames,
                    "palette": hexes,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {}x{} mesh at {at} ms ({frames} frames) -> {}",
                    canvas.width,
                    canvas.height,
                    output.display()
                );
            }
        }
        Command::Run {
            canvas,
            duration,
            tick_ms,
            covers,
            frames_dir,
            every,
            reduced_motion,
            output,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let opts = RunOptions {
                duration_ms: duration * 1000.0,
                tick_ms,
                covers,
                frames_dir,
                every,
                output,
            };
            let summary = run_backdrop(config, &canvas, reduced_motion, opts, cli.json)?;

            if cli.json {
                let info = serde_json::json!({
                    "duration_s": duration,
                    "frames_rendered": summary.frames_rendered,
                    "frames_written": summary.frames_written,
                    "notices": summary.notices,
                    "cover": summary.cover,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "ran {duration} s: {} frames rendered, {} written, {} notices",
                    summary.frames_rendered, summary.frames_written, summary.notices
                );
            }
        }
        Command::Palette { image, count } => {
            let palette =
                palette_from_file(&image, count).map_err(|e| CliError::Input(e.to_string()))?;
            let hexes: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
            if cli.json {
                let info = serde_json::json!({
                    "image": image.display().to_string(),
                    "colors": hexes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for hex in hexes {
                    println!("{hex}");
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
