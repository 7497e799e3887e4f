use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod runner;
mod scenario;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "overlay_cli", about = "Crew portrait overlay scenario driver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log per-pass detail (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print the portraits the overlay shows.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: PathBuf,
        /// Print a status line every N ticks when nothing changed. 0 disables.
        #[arg(long, default_value_t = 0)]
        print_every: u64,
        /// Write the run summary as JSON to this path.
        #[arg(long)]
        summary: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn run(scenario_path: &Path, print_every: u64, summary_path: Option<&Path>) -> Result<()> {
    let scenario = scenario::load_scenario(scenario_path)?;
    let summary = {
        let mut out = std::io::stdout().lock();
        runner::run_scenario(&scenario, print_every, &mut out)?
    };

    println!("{}", "-".repeat(80));
    println!(
        "Done. passes={} clean={} rebuilds={} built={} released={} cached={}",
        summary.stats.passes,
        summary.stats.clean_passes,
        summary.stats.rebuilds,
        summary.stats.views_built,
        summary.stats.views_released,
        summary.cached,
    );

    if let Some(path) = summary_path {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Run {
            scenario,
            print_every,
            summary,
        } => run(&scenario, print_every, summary.as_deref())?,
    }
    Ok(())
}
