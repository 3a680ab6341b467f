//! Hybrid cache model CLI.
//!
//! This binary provides a single entry point for replaying traces. It performs:
//! 1. **Trace run:** Replay a trace file and optionally compare against observed counters.
//! 2. **Scenario run:** Replay one of the built-in verification-program scenarios phase by phase.
//! 3. **Comparison:** Replay one trace or scenario under every regression preset.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use hybridsim_core::cache::CacheGeometry;
use hybridsim_core::config::{Config, Preset};
use hybridsim_core::sim::harness::{comparison_json, render_comparison};
use hybridsim_core::sim::{
    ObservedCounters, Scenario, Trace, TraceHarness, Verdict, compare_presets, scenarios,
};
use hybridsim_core::{CacheError, CacheModel};

#[derive(Parser, Debug)]
#[command(
    name = "hybridsim",
    author,
    version,
    about = "Hybrid set-associative / fully-associative cache model",
    long_about = "Replay address traces against a deterministic cache model and compare the predicted miss count with hardware performance counters.\n\nExamples:\n  hybridsim run -t loop.trace --expect-misses 42\n  hybridsim run -t loop.trace --preset WT_HYB --json\n  hybridsim scenario fa-subset --preset WT_HYB_FORCE_FULL_ASS\n  hybridsim compare --scenario fa-overflow --json"
)]
struct Cli {
    /// JSON configuration file (defaults to the built-in geometry).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Regression preset applied on top of the configuration (e.g. WT_HYB).
    #[arg(short, long, global = true)]
    preset: Option<String>,

    /// Print counters as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Only print these stats sections (summary, breakdown, sets).
    #[arg(long, global = true, value_delimiter = ',')]
    sections: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace file.
    Run {
        /// Trace file (`[R|W] <address>` per line).
        #[arg(short, long)]
        trace: PathBuf,

        /// Observed miss-counter delta to compare against.
        #[arg(long)]
        expect_misses: Option<u64>,

        /// Observed access-counter delta to compare against.
        #[arg(long, requires = "expect_misses")]
        expect_accesses: Option<u64>,
    },

    /// Replay a built-in verification scenario, one counter window per phase.
    Scenario {
        /// Which program's access pattern to replay.
        #[arg(value_enum)]
        name: ScenarioName,

        /// Iterations for the array loop scenario.
        #[arg(long, default_value_t = 10)]
        iterations: u64,
    },

    /// Replay a trace or scenario under every preset and tabulate the counters.
    #[command(group(ArgGroup::new("input").required(true).args(["trace", "scenario"])))]
    Compare {
        /// Trace file to replay.
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// Built-in scenario to replay, all phases back to back.
        #[arg(short, long, value_enum)]
        scenario: Option<ScenarioName>,

        /// Iterations for the array loop scenario.
        #[arg(long, default_value_t = 10)]
        iterations: u64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ScenarioName {
    /// The overflow-subset program: 8 lines, then 16 at a 64-byte stride.
    FaSubset,
    /// Fill the fully-associative table, then revisit it after 8 new lines.
    FaOverflow,
    /// One line in every set.
    SetSweep,
    /// The three-sweep block exercise.
    BlockSweep,
    /// Forward/strided/backward array loop.
    Loop,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("[!] {e}");
            ExitCode::from(2)
        }
    }
}

/// Loads the configuration, applies the preset, and dispatches the subcommand.
///
/// Returns `Ok(false)` when a counter comparison fails.
fn run(cli: &Cli) -> Result<bool, CacheError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(name) = &cli.preset {
        name.parse::<Preset>()?.apply(&mut config.cache);
    }
    let model = CacheModel::new(&config.cache)?;
    let mut harness = TraceHarness::new(model);

    match &cli.command {
        Commands::Run {
            trace,
            expect_misses,
            expect_accesses,
        } => {
            let trace = Trace::from_file(trace)?;
            println!("[*] Replaying {} accesses ({})", trace.len(), config.cache.mode);
            let report = harness.replay(&trace)?;
            print_stats(cli, &harness)?;

            let Some(misses) = *expect_misses else {
                return Ok(true);
            };
            let verdict = Verdict::compare(
                &report,
                &ObservedCounters {
                    misses,
                    accesses: *expect_accesses,
                },
            );
            println!("[*] {verdict}");
            Ok(verdict.passed())
        }
        Commands::Scenario { name, iterations } => {
            let scenario = build_scenario(
                *name,
                config.scenario.base_address,
                harness.model().geometry(),
                *iterations,
            );
            println!("[*] Scenario {} ({})", scenario.name, config.cache.mode);
            for phase in harness.run_phases(&scenario)? {
                println!(
                    "    {:<14} accesses: {:<8} | hits: {:<8} | misses: {:<8} | overflow_hits: {}",
                    phase.name,
                    phase.report.accesses,
                    phase.report.hits,
                    phase.report.misses,
                    phase.report.overflow_hits
                );
            }
            print_stats(cli, &harness)?;
            Ok(true)
        }
        Commands::Compare {
            trace,
            scenario,
            iterations,
        } => {
            let trace = match (trace, scenario) {
                (Some(path), _) => Trace::from_file(path)?,
                (None, Some(name)) => build_scenario(
                    *name,
                    config.scenario.base_address,
                    harness.model().geometry(),
                    *iterations,
                )
                .flatten(),
                (None, None) => Trace::new(),
            };
            println!("[*] Comparing presets over {} accesses", trace.len());
            let rows = compare_presets(&config.cache, &trace)?;
            if cli.json {
                println!("{}", comparison_json(&rows)?);
            } else {
                print!("{}", render_comparison(&rows));
            }
            Ok(true)
        }
    }
}

fn build_scenario(
    name: ScenarioName,
    base: u64,
    geometry: &CacheGeometry,
    iterations: u64,
) -> Scenario {
    match name {
        ScenarioName::FaSubset => scenarios::fa_subset(base),
        ScenarioName::FaOverflow => scenarios::fa_overflow(base, geometry.line_bytes()),
        ScenarioName::SetSweep => {
            scenarios::set_sweep(base, geometry.line_bytes(), geometry.sets())
        }
        ScenarioName::BlockSweep => scenarios::block_sweep(base),
        ScenarioName::Loop => scenarios::sequential_loop(base, 256, iterations),
    }
}

fn print_stats(cli: &Cli, harness: &TraceHarness) -> Result<(), CacheError> {
    let stats = harness.model().stats();
    if cli.json {
        println!("{}", stats.to_json()?);
    } else {
        stats.print_sections(&cli.sections);
    }
    Ok(())
}
