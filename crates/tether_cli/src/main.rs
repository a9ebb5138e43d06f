use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tether_cli::{evaluate_file, load_scene, run_simulation, SimulationConfig};

#[derive(Parser)]
#[command(name = "tether", about = "Spatial relationship engine scene driver", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a scene file once and print the response JSON
    Evaluate {
        /// Scene request file (JSON)
        scene: PathBuf,
        /// Pretty-print the response
        #[arg(long)]
        pretty: bool,
    },
    /// Random-walk the scene's entities and report status transitions
    Simulate {
        /// Scene request file (JSON)
        scene: PathBuf,
        /// Number of ticks to run
        #[arg(long, default_value_t = 100)]
        ticks: u32,
        /// RNG seed; same seed reproduces the same walk
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Per-axis jitter bound in meters per tick
        #[arg(long, default_value_t = 0.25)]
        step: f64,
    },
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Evaluate { scene, pretty } => {
            let response = evaluate_file(&scene, pretty)?;
            println!("{}", response);
        }
        Command::Simulate { scene, ticks, seed, step } => {
            let request = load_scene(&scene)?;
            let config = SimulationConfig { ticks, seed, step };
            let summary = run_simulation(&request, &config)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
