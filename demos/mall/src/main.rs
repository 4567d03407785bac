//! mall — command-line demo for the mallsim pedestrian simulator.
//!
//! ```text
//! mall [--config run.json] [--out DIR] [path/to/venue_map.txt]
//! ```
//!
//! Without a map path a small built-in venue is used: a walled hall with
//! entrances on both short sides, a social-force plaza in the middle and
//! two rows of shops along the long walls.  `--config` reads a JSON
//! `SimConfig`; omitted fields keep their defaults.  Set `RUST_LOG=info`
//! (or `debug`) to see the scheduler's events.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;

use ms_grid::{Board, Terrain, load_map_files, load_map_reader};
use ms_output::{CsvFrameWriter, CsvRunLog, SimOutputObserver};
use ms_sim::{SimBuilder, SimConfig};

// ── Constants ─────────────────────────────────────────────────────────────────

const DEFAULT_OUT_DIR:      &str = "output/mall";
const DEFAULT_TICKS:        u64  = 1_000;
const FRAME_INTERVAL_TICKS: u64  = 50;

// ── Built-in venue ────────────────────────────────────────────────────────────

const HALL_MAP: &str = "\
########################################\n\
#......................................#\n\
#..................##..................#\n\
#......................................#\n\
............~~~~~~~~~~~~~~~~............\n\
............~~~~~~~~~~~~~~~~............\n\
............~~~~~~~~~~~~~~~~............\n\
............~~~~~~~~~~~~~~~~............\n\
#......................................#\n\
#..................##..................#\n\
#......................................#\n\
########################################\n\
";

const HALL_FEATURES: &str = "\
........................................\n\
......A.......A.......A.......A.........\n\
........................................\n\
........................................\n\
S......................................S\n\
S......................................S\n\
S......................................S\n\
S......................................S\n\
........................................\n\
........................................\n\
......B.......B.......B.......B.........\n\
........................................\n\
";

// A: quick stops, B: anchor stores that pull harder and hold longer.
const HALL_LEGEND: &str = "\
code,kind,pull,hold_time\n\
S,spawner,,\n\
A,attractor,110,2\n\
B,attractor,90,5\n\
";

// ── Command line ──────────────────────────────────────────────────────────────

struct Args {
    config:  Option<PathBuf>,
    out_dir: PathBuf,
    map:     Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { config: None, out_dir: PathBuf::from(DEFAULT_OUT_DIR), map: None };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().context("--config needs a path")?.into()),
            "--out" => args.out_dir = it.next().context("--out needs a directory")?.into(),
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ if args.map.is_some() => bail!("more than one map path given"),
            _ => args.map = Some(arg.into()),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            total_ticks:          DEFAULT_TICKS,
            frame_interval_ticks: FRAME_INTERVAL_TICKS,
            ..SimConfig::default()
        });
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn load_terrain(map: Option<&Path>) -> Result<Terrain> {
    match map {
        Some(path) => load_map_files(path).with_context(|| format!("loading map {}", path.display())),
        None => Ok(load_map_reader(
            Cursor::new(HALL_MAP),
            Cursor::new(HALL_FEATURES),
            Cursor::new(HALL_LEGEND),
        )?),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let args = parse_args()?;

    // 1. Venue and run parameters.
    let terrain = load_terrain(args.map.as_deref())?;
    let config = load_config(args.config.as_deref())?;
    println!("=== mall — pedestrian flow ===");
    println!(
        "Venue: {}×{}  |  accessible cells: {}  |  entrances: {}  |  shops: {}",
        terrain.width(),
        terrain.height(),
        terrain.accessible_field_count(),
        terrain.io_points().len(),
        terrain.attractor_points().len(),
    );
    println!(
        "Ticks: {}  |  arrival rate: {}/tick  |  crowd cap: {:.0}%  |  seed: {}",
        config.total_ticks,
        config.arrival_rate,
        config.max_crowd_factor * 100.0,
        config.seed,
    );
    println!();

    // 2. Build the simulation.
    let mut sim = SimBuilder::new(config, Board::new(Arc::new(terrain))).build()?;

    // 3. Output.
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let writer = (CsvRunLog::new(&args.out_dir)?, CsvFrameWriter::new(&args.out_dir)?);
    let mut obs = SimOutputObserver::new(writer);

    // 4. Run.
    let t0 = Instant::now();
    let summary = sim.run(&mut obs)?;
    let elapsed = t0.elapsed();
    info!(secs = elapsed.as_secs_f64(), "run finished");

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    let frames = obs.into_writer().1.frame_count();

    // 5. Summary.
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), summary.ticks);
    println!("  agents seen      : {}", summary.total_agents);
    println!("  reached target   : {}", summary.successes);
    println!("  left via exit    : {}", summary.absorbed);
    println!("  unroutable       : {}", summary.unroutable);
    println!("  still on floor   : {}", summary.remaining);
    println!("  lane formation   : {:.1}% (mean)", summary.lane_percentage);
    println!("  coherence        : {:.2} (mean)", summary.coherence);
    println!("  lost agents      : {:.2} (mean)", summary.lost);
    println!("  progress ratio   : {:.3} (mean)", summary.average_progress);
    println!();
    println!("Output written to {}", args.out_dir.display());
    println!("  run_log.csv : {} rows", summary.ticks);
    println!("  frames.csv  : {frames} frames");

    Ok(())
}
