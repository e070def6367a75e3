//! TimingGate CLI: evaluate timing signals from CSV price files.
//!
//! Commands:
//! - `signal`: evaluate the last bar of one ticker
//! - `batch`: evaluate every ticker of a universe file
//! - `walk`: replay the engine over every prefix of a table
//! - `config show` / `config normalize`: inspect or clean a config file
//! - `synth`: write a synthetic price series
//!
//! JSON goes to stdout; logs go to stderr (`RUST_LOG` overrides the `info` default).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use timinggate_core::{evaluate, EngineConfig, EngineKind, Horizon};
use timinggate_runner::synthetic::{flat_then_ramp, random_walk, sine_wave};
use timinggate_runner::{
    dataset_hash, evaluate_batch, export_bars, export_signals, load_engine_config,
    load_price_csv, load_universe_csv, save_engine_config, walk_forward, write_signals_jsonl,
    BatchSummary, LoadedConfig,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "timinggate",
    about = "TimingGate CLI: multi-gate BUY/WAIT/SELL timing signals"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the last bar of a single-ticker CSV.
    Signal {
        /// CSV with date,open,high,low,close,volume columns.
        #[arg(long)]
        csv: PathBuf,

        /// Horizon: 1D, 3D or 1W.
        #[arg(long, default_value = "1D")]
        horizon: String,

        /// Engine config file (.json or .toml). Defaults are used when absent.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured engine: simple_ma_v1 or simple_ma_v2_gate3.
        #[arg(long)]
        engine: Option<String>,
    },
    /// Evaluate every ticker of a universe CSV (adds a ticker column).
    Batch {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long, default_value = "1D")]
        horizon: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file (.csv or .jsonl). JSONL on stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replay the engine bar by bar and report the wait rate.
    Walk {
        #[arg(long)]
        csv: PathBuf,

        #[arg(long, default_value = "1D")]
        horizon: String,

        /// First bar index to evaluate.
        #[arg(long, default_value_t = 30)]
        start: usize,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Include the per-bar points in the output.
        #[arg(long, default_value_t = false)]
        points: bool,
    },
    /// Engine configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Write a deterministic synthetic price series as CSV.
    Synth {
        #[arg(long, value_enum, default_value_t = SynthKind::Walk)]
        kind: SynthKind,

        #[arg(long, default_value_t = 300)]
        bars: usize,

        /// Seed symbol for the random walk.
        #[arg(long, default_value = "SYNTH")]
        symbol: String,

        /// First date (YYYY-MM-DD).
        #[arg(long, default_value = "2024-01-01")]
        start: String,

        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active (normalized) config with its mode and hash.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Normalize a config file and write the result.
    Normalize {
        #[arg(long)]
        input: PathBuf,

        /// Output file; the extension picks JSON or TOML.
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SynthKind {
    /// Trendless sine wave.
    Sine,
    /// Flat stretch then a rising ramp on raised volume.
    Ramp,
    /// Random walk seeded from the symbol.
    Walk,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Signal {
            csv,
            horizon,
            config,
            engine,
        } => run_signal(&csv, &horizon, config.as_deref(), engine.as_deref()),
        Commands::Batch {
            csv,
            horizon,
            config,
            out,
        } => run_batch(&csv, &horizon, config.as_deref(), out.as_deref()),
        Commands::Walk {
            csv,
            horizon,
            start,
            config,
            points,
        } => run_walk(&csv, &horizon, start, config.as_deref(), points),
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => run_config_show(config.as_deref()),
            ConfigAction::Normalize { input, output } => run_config_normalize(&input, &output),
        },
        Commands::Synth {
            kind,
            bars,
            symbol,
            start,
            out,
        } => run_synth(kind, bars, &symbol, &start, &out),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>, engine: Option<&str>) -> Result<LoadedConfig> {
    let mut loaded = load_engine_config(path)?;
    if let Some(name) = engine {
        loaded.config.engine = name.parse::<EngineKind>()?;
        loaded.hash = loaded.config.config_hash();
    }
    Ok(loaded)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")?;
    Ok(())
}

// ─── Commands ────────────────────────────────────────────────────────

fn run_signal(
    csv: &Path,
    horizon: &str,
    config: Option<&Path>,
    engine: Option<&str>,
) -> Result<()> {
    let horizon: Horizon = horizon.parse()?;
    let loaded = load_config(config, engine)?;
    let table = load_price_csv(csv).with_context(|| format!("loading {}", csv.display()))?;

    let result = evaluate(&table, horizon, &loaded.config);
    let rule = loaded.config.rule(horizon);
    if table.len() < rule.recommended_lookback() {
        tracing::warn!(
            bars = table.len(),
            recommended = rule.recommended_lookback(),
            "table is shorter than the recommended lookback"
        );
    }

    print_json(&serde_json::json!({
        "as_of": table.last_date(),
        "horizon": horizon,
        "engine": loaded.config.engine,
        "config_mode": loaded.mode,
        "config_hash": loaded.hash,
        "dataset_hash": dataset_hash(&table),
        "result": result,
    }))
}

fn run_batch(
    csv: &Path,
    horizon: &str,
    config: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let horizon: Horizon = horizon.parse()?;
    let loaded = load_config(config, None)?;
    let universe =
        load_universe_csv(csv).with_context(|| format!("loading {}", csv.display()))?;

    let signals = evaluate_batch(&universe, horizon, &loaded.config, &BTreeMap::new());
    let summary = BatchSummary::from_signals(&signals);

    match out {
        Some(path) => {
            export_signals(path, &signals)?;
            print_json(&summary)
        }
        None => {
            write_signals_jsonl(std::io::stdout().lock(), &signals)?;
            Ok(())
        }
    }
}

fn run_walk(
    csv: &Path,
    horizon: &str,
    start: usize,
    config: Option<&Path>,
    points: bool,
) -> Result<()> {
    let horizon: Horizon = horizon.parse()?;
    let loaded = load_config(config, None)?;
    let table = load_price_csv(csv).with_context(|| format!("loading {}", csv.display()))?;

    let mut report = walk_forward(&table, horizon, &loaded.config, start);
    let (wait_rate, flips) = (report.wait_rate(), report.flips());
    if !points {
        report.points.clear();
    }

    print_json(&serde_json::json!({
        "wait_rate": wait_rate,
        "flips": flips,
        "report": report,
    }))
}

fn run_config_show(config: Option<&Path>) -> Result<()> {
    let loaded = load_config(config, None)?;
    print_json(&loaded)
}

fn run_config_normalize(input: &Path, output: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("config file not found: {}", input.display());
    }
    let loaded = load_engine_config(Some(input))?;
    save_engine_config(output, &loaded.config)?;
    print_json(&serde_json::json!({
        "output": output.display().to_string(),
        "hash": loaded.hash,
    }))
}

fn run_synth(kind: SynthKind, bars: usize, symbol: &str, start: &str, out: &Path) -> Result<()> {
    let start = NaiveDate::parse_from_str(start, "%Y-%m-%d")
        .with_context(|| format!("invalid start date '{start}'"))?;

    let series = match kind {
        SynthKind::Sine => sine_wave(start, bars, (bars as f64 / 16.0).max(1.0), 1.0),
        SynthKind::Ramp => {
            let ramp = (bars / 6).max(1).min(bars);
            flat_then_ramp(start, bars - ramp, ramp, 100.0, 140.0)
        }
        SynthKind::Walk => random_walk(symbol, start, bars),
    };
    export_bars(out, &series)?;
    Ok(())
}
