use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dispatch_cli::sources::{
    load_distance_table, load_orders, write_distance_table, write_orders,
};
use dispatch_cli::{init_tracing, load_drone_config, write_comparison_csv, Config, PlanReport};
use dispatch_core::{
    compare, deliver, sweep, Drone, DroneConfig, Strategy, StrategyComparison, SyntheticBacklog,
    TripPlanner,
};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Pack delivery orders into drone trips", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pack a backlog into trips
    Plan {
        #[command(flatten)]
        inputs: Inputs,

        #[arg(long, value_enum, default_value_t = StrategyArg::Priority)]
        strategy: StrategyArg,

        /// Fly the packed trips after planning
        #[arg(long)]
        deliver: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run every strategy on one or more backlogs
    Compare {
        #[command(flatten)]
        inputs: Inputs,

        /// Further order CSVs to compare against the same distance table
        #[arg(long = "also")]
        extra_orders: Vec<PathBuf>,

        /// Compare generated backlogs of these sizes instead of order files
        #[arg(long, value_delimiter = ',')]
        synthetic_sizes: Vec<usize>,

        /// Zone count for generated backlogs
        #[arg(long, default_value_t = 12)]
        zones: usize,

        /// Seed for generated backlogs
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Write comparison rows to this CSV file
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },
    /// Write a seeded synthetic dataset
    Generate {
        #[arg(long, default_value_t = 12)]
        zones: usize,

        #[arg(long, default_value_t = 100)]
        orders: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Directory for distances.csv and deliveries.csv
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Inputs {
    /// Distance matrix CSV (defaults to DISPATCH_DISTANCES or distances.csv)
    #[arg(long)]
    distances: Option<PathBuf>,

    /// Order backlog CSV (defaults to DISPATCH_ORDERS or deliveries.csv)
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Drone configuration JSON
    #[arg(long)]
    drone_config: Option<PathBuf>,

    /// Override battery capacity
    #[arg(long)]
    battery: Option<f64>,

    /// Override payload capacity in grams
    #[arg(long)]
    payload: Option<f64>,

    /// Charge the return leg to the home zone
    #[arg(long)]
    return_to_home: bool,
}

impl Inputs {
    fn drone_config(&self) -> Result<DroneConfig> {
        let mut drone = match &self.drone_config {
            Some(path) => load_drone_config(path)?,
            None => DroneConfig::default(),
        };
        if let Some(battery) = self.battery {
            drone.battery_capacity = battery;
        }
        if let Some(payload) = self.payload {
            drone.payload_capacity = payload;
        }
        if self.return_to_home {
            drone.return_to_home = true;
        }
        Ok(drone)
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Oldest orders first, one zone at a time
    Zone,
    /// Most urgent orders first
    Priority,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Zone => Strategy::ZoneBatched,
            StrategyArg::Priority => Strategy::PriorityBatched,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_tracing(&config)?;

    match cli.command {
        Command::Plan {
            inputs,
            strategy,
            deliver: fly,
            json,
        } => run_plan(&config, &inputs, strategy.into(), fly, json),
        Command::Compare {
            inputs,
            extra_orders,
            synthetic_sizes,
            zones,
            seed,
            csv_out,
        } => {
            let comparisons = if synthetic_sizes.is_empty() {
                compare_files(&config, &inputs, &extra_orders)?
            } else {
                compare_synthetic(&inputs, &synthetic_sizes, zones, seed)?
            };
            write_comparisons(&comparisons, csv_out)
        }
        Command::Generate {
            zones,
            orders,
            seed,
            out_dir,
        } => run_generate(zones, orders, seed, out_dir),
    }
}

fn run_plan(
    config: &Config,
    inputs: &Inputs,
    strategy: Strategy,
    fly: bool,
    json: bool,
) -> Result<()> {
    let table = load_distance_table(inputs.distances.as_ref().unwrap_or(&config.distances_path))?;
    let backlog = load_orders(inputs.orders.as_ref().unwrap_or(&config.orders_path))?;
    let drone_config = inputs.drone_config()?;
    let drone = Drone::new(drone_config.clone(), &table)?;

    let plan = TripPlanner::new(&drone).plan(strategy, &backlog)?;
    let deliveries = if fly {
        Some(deliver(&drone, &plan)?)
    } else {
        None
    };

    let report = PlanReport::new(&drone_config, &plan, deliveries);
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn compare_files(
    config: &Config,
    inputs: &Inputs,
    extra_orders: &[PathBuf],
) -> Result<Vec<StrategyComparison>> {
    let table = load_distance_table(inputs.distances.as_ref().unwrap_or(&config.distances_path))?;
    let drone = Drone::new(inputs.drone_config()?, &table)?;

    let first = inputs.orders.as_ref().unwrap_or(&config.orders_path);
    let mut comparisons = Vec::with_capacity(1 + extra_orders.len());
    for path in std::iter::once(first).chain(extra_orders) {
        let backlog = load_orders(path)?;
        comparisons.push(compare(&drone, &dataset_label(path), &backlog)?);
    }
    Ok(comparisons)
}

fn compare_synthetic(
    inputs: &Inputs,
    sizes: &[usize],
    zones: usize,
    seed: u64,
) -> Result<Vec<StrategyComparison>> {
    let datasets: Vec<SyntheticBacklog> = sizes
        .iter()
        .map(|&orders| SyntheticBacklog {
            zones,
            orders,
            seed,
            ..SyntheticBacklog::default()
        })
        .collect();
    Ok(sweep(&inputs.drone_config()?, &datasets)?)
}

/// Orders file stem, e.g. `deliveries` for `data/deliveries.csv`.
fn dataset_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn write_comparisons(comparisons: &[StrategyComparison], csv_out: Option<PathBuf>) -> Result<()> {
    match csv_out {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            write_comparison_csv(file, comparisons)?;
            tracing::info!("Results exported to {}", path.display());
        }
        None => write_comparison_csv(io::stdout().lock(), comparisons)?,
    }
    Ok(())
}

fn run_generate(zones: usize, orders: usize, seed: u64, out_dir: PathBuf) -> Result<()> {
    let params = SyntheticBacklog {
        zones,
        orders,
        seed,
        ..SyntheticBacklog::default()
    };
    let (table, backlog) = params.generate()?;

    fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let distances_path = out_dir.join("distances.csv");
    let orders_path = out_dir.join("deliveries.csv");
    write_distance_table(File::create(&distances_path)?, &table)?;
    write_orders(File::create(&orders_path)?, &backlog)?;

    tracing::info!(
        zones,
        orders,
        seed,
        "Wrote {} and {}",
        distances_path.display(),
        orders_path.display()
    );
    Ok(())
}
