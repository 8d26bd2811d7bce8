//! Chaos Turtle - distorted polygon fractals
//!
//! CLI commands:
//! - draw: Generate a fractal and render it to SVG or PNG
//! - trace: Stream the raw turtle instructions as JSON lines
//! - check: Validate a configuration and summarize the run
//! - defaults: Print the default configuration as YAML

mod config;
mod generator;
mod logging;
mod render;

use clap::{Args, Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use config::{Config, FractalConfig, Settings};
use generator::{emit_polygon, ChaosSampling, ChaoticState, DrawingInstruction, FractalDriver};
use rand::rngs::StdRng;
use render::{Bounds, OutputFormat, Turtle};

#[derive(Parser)]
#[command(name = "chaos_turtle")]
#[command(about = "Polygon fractals distorted by a Lorenz attractor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to fractal.yaml config
    #[arg(short, long, default_value = "fractal.yaml", global = true)]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fractal and render it to a file
    Draw {
        /// Output file (.svg or .png); defaults to OUTPUT_DIR/fractal.svg
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format, overrides the file extension
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Skip the JSON metadata written next to the drawing
        #[arg(long)]
        no_meta: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the instruction stream as JSON lines
    Trace {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Validate the configuration and summarize the run
    Check {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the default configuration
    Defaults,
}

/// Options shared by every command that generates a run
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Seed for polygon colors
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many instructions
    #[arg(long)]
    limit: Option<usize>,

    #[command(flatten)]
    overrides: Overrides,
}

/// Per-parameter overrides of the config file
#[derive(Args, Debug, Default)]
struct Overrides {
    #[arg(long)]
    side_length: Option<f64>,
    #[arg(long)]
    sides_min: Option<u32>,
    #[arg(long)]
    sides_max: Option<u32>,
    #[arg(long)]
    grouping: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    angle1: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    angle2: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    move_length: Option<f64>,
    #[arg(long)]
    iterations: Option<u32>,
    #[arg(long, allow_negative_numbers = true)]
    increment_amount: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    modulation_strength: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    golden_ratio_divisor: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    chaos_multiplier: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    start_x: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    start_y: Option<f64>,
    /// Reuse each polygon's first Lorenz derivative for all its sides
    #[arg(long)]
    polygon_start_sampling: bool,
}

impl Overrides {
    fn apply(&self, fractal: &mut FractalConfig) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        set(&mut fractal.side_length, self.side_length);
        set(&mut fractal.sides_min, self.sides_min);
        set(&mut fractal.sides_max, self.sides_max);
        set(&mut fractal.grouping, self.grouping);
        set(&mut fractal.angle1, self.angle1);
        set(&mut fractal.angle2, self.angle2);
        set(&mut fractal.move_length, self.move_length);
        set(&mut fractal.iterations, self.iterations);
        set(&mut fractal.increment_amount, self.increment_amount);
        set(&mut fractal.modulation_strength, self.modulation_strength);
        set(&mut fractal.golden_ratio_divisor, self.golden_ratio_divisor);
        set(&mut fractal.chaos_multiplier, self.chaos_multiplier);
        set(&mut fractal.start_x, self.start_x);
        set(&mut fractal.start_y, self.start_y);
        if self.polygon_start_sampling {
            fractal.chaos_sampling = ChaosSampling::PolygonStart;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load();

    // Initialize logging first
    logging::init_logging(&settings.log_dir)?;
    tracing::info!("Chaos Turtle starting up");

    let cli = Cli::parse();
    tracing::debug!("CLI args parsed: config={:?}", cli.config);

    match cli.command {
        Commands::Draw {
            output,
            format,
            no_meta,
            run,
        } => {
            let output = output.unwrap_or_else(|| settings.output_dir.join("fractal.svg"));
            draw_command(&cli.config, &run, &settings, &output, format, !no_meta)?;
        }

        Commands::Trace { run } => {
            let config = prepare(&cli.config, &run)?;
            trace(&config, &run, &settings)?;
        }

        Commands::Check { run } => {
            let config = prepare(&cli.config, &run)?;
            check(&config, &run, &settings);
        }

        Commands::Defaults => {
            print!("{}", Config::default().to_yaml()?);
        }
    }

    Ok(())
}

/// Load config, apply CLI overrides and validate.
///
/// Any failure here aborts before output files are touched.
fn prepare(path: &Path, run: &RunArgs) -> anyhow::Result<Config> {
    let mut config = if path.exists() {
        tracing::info!("Loading config from {:?}", path);
        Config::load(path)?
    } else {
        tracing::warn!("Config file not found: {:?}, using defaults", path);
        Config::default()
    };
    run.overrides.apply(&mut config.fractal);

    for warning in config.validate()? {
        tracing::warn!("{}", warning);
    }
    Ok(config)
}

/// CLI seed, then config file, then FRACTAL_SEED, then random
fn resolve_seed(config: &Config, run: &RunArgs, settings: &Settings) -> u64 {
    let seed = run
        .seed
        .or(config.seed)
        .or(settings.seed)
        .unwrap_or_else(rand::random);
    tracing::info!(seed, "Color seed");
    seed
}

/// Seeded driver; callers cut it short with `limit`
fn driver(config: &Config, run: &RunArgs, settings: &Settings) -> (u64, FractalDriver) {
    let seed = resolve_seed(config, run, settings);
    let driver = FractalDriver::seeded(config.fractal.clone(), seed);
    tracing::info!(
        instructions = ?FractalDriver::<StdRng>::expected_len(&config.fractal),
        iterations = config.fractal.iterations,
        "Generating fractal"
    );
    (seed, driver)
}

fn limit(run: &RunArgs) -> usize {
    run.limit.unwrap_or(usize::MAX)
}

/// Full-run value, or a note that it does not fit in a u64
fn count_or_overflow(count: Option<u64>) -> String {
    count.map_or_else(|| "more than u64::MAX".to_string(), |n| n.to_string())
}

/// Prepare and draw; a bad config fails before `output` is touched
fn draw_command(
    config_path: &Path,
    run: &RunArgs,
    settings: &Settings,
    output: &Path,
    format: Option<OutputFormat>,
    write_meta: bool,
) -> anyhow::Result<()> {
    let config = prepare(config_path, run)?;
    draw(&config, run, settings, output, format, write_meta)
}

/// Generate and render to a file
fn draw(
    config: &Config,
    run: &RunArgs,
    settings: &Settings,
    output: &Path,
    format: Option<OutputFormat>,
    write_meta: bool,
) -> anyhow::Result<()> {
    let format = match format {
        Some(f) => f,
        None => OutputFormat::from_path(output)?,
    };
    let (seed, mut driver) = driver(config, run, settings);

    let mut emitted = 0usize;
    let mut turtle = Turtle::new(config.fractal.start());
    let segments = turtle.trace(driver.by_ref().take(limit(run)).inspect(|_| emitted += 1));
    tracing::info!(
        instructions = emitted,
        segments = segments.len(),
        repetitions = driver.repetition(),
        polygons = driver.polygons_drawn(),
        "Traced"
    );

    let bytes = format.encode(&segments, &config.render)?;
    render::write_atomic(output, &bytes)?;
    println!("Wrote {} ({} segments)", output.display(), segments.len());

    if write_meta {
        let meta = serde_json::json!({
            "generated": chrono::Local::now().to_rfc3339(),
            "seed": seed,
            "instructions": emitted,
            "segments": segments.len(),
            "fractal": config.fractal,
            "render": config.render,
        });
        let meta_path = output.with_extension("json");
        render::write_atomic(&meta_path, serde_json::to_string_pretty(&meta)?.as_bytes())?;
        tracing::info!("Wrote {}", meta_path.display());
    }

    Ok(())
}

/// Stream instructions to stdout
fn trace(config: &Config, run: &RunArgs, settings: &Settings) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let (_, driver) = driver(config, run, settings);
    for instruction in driver.take(limit(run)) {
        serde_json::to_writer(&mut out, &instruction)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Print a summary of what a run would produce
fn check(config: &Config, run: &RunArgs, settings: &Settings) {
    print!("{}", summarize(config, run, settings));
}

/// Summary text for `check`; counts reflect what `--limit` lets through
fn summarize(config: &Config, run: &RunArgs, settings: &Settings) -> String {
    let fractal = &config.fractal;
    let (_, mut driver) = driver(config, run, settings);

    let mut pulled = 0u64;
    let mut turns = 0u64;
    let segments = Turtle::new(fractal.start()).trace(driver.by_ref().take(limit(run)).inspect(|i| {
        pulled += 1;
        if i.is_turn() {
            turns += 1;
        }
    }));
    let state = driver.state();

    let mut out = String::from("Configuration OK\n");
    out += &format!("  instructions: {}\n", pulled);
    out += &format!("  turns:        {}\n", turns);
    out += &format!("  polygons:     {}\n", driver.polygons_drawn());
    out += &format!("  repetitions:  {}\n", driver.repetition());
    out += &format!("  segments:     {}\n", segments.len());
    out += &format!(
        "  full run:     {} instructions, {} polygons\n",
        count_or_overflow(FractalDriver::<StdRng>::expected_len(fractal)),
        count_or_overflow(fractal.polygon_count())
    );
    out += &format!("  angle step:   {}\n", driver.angle_increment());
    out += &format!(
        "  chaos state:  ({:.4}, {:.4}, {:.4})\n",
        state.x, state.y, state.z
    );
    match Bounds::of(&segments) {
        Some(b) => {
            out += &format!(
                "  extent:       ({:.1}, {:.1}) .. ({:.1}, {:.1})\n",
                b.min.0, b.min.1, b.max.0, b.max.1
            )
        }
        None => out += "  extent:       empty\n",
    }
    if fractal.polygon_count() != Some(0) {
        // Turn angles of the very first polygon of the run
        let mut state = ChaoticState::new();
        let first: Vec<String> = emit_polygon(
            fractal.sides_min,
            fractal.side_length,
            &mut state,
            0.0,
            &fractal.distortion(),
        )
        .iter()
        .filter_map(|instruction| match instruction {
            DrawingInstruction::Turn { degrees, .. } => Some(format!("{:.4}", degrees)),
            _ => None,
        })
        .collect();
        out += &format!("  first angles: {}\n", first.join(", "));
    }
    out
}
