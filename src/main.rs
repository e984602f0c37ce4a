use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info};

use signal_sim::simulation::{scenarios, RoadNetwork, SimConfig, SimWorld};

/// Reference road networks selectable from the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Network {
    /// Two signalled approaches merging into one road
    Simple,
    /// Two entries, two signalled approaches, one long exit
    Extended,
}

impl Network {
    fn build(self) -> Result<RoadNetwork> {
        match self {
            Network::Simple => scenarios::simple_y_merge(),
            Network::Extended => scenarios::extended_two_entry(),
        }
    }
}

#[derive(Parser)]
#[command(name = "signal_sim")]
#[command(about = "Headless signalized traffic simulation")]
struct Cli {
    /// Road network to simulate
    #[arg(long, value_enum, default_value = "extended")]
    network: Network,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u64,

    /// Time delta per tick
    #[arg(long, default_value_t = signal_sim::simulation::DT)]
    dt: f32,

    /// Velocity of a moving vehicle
    #[arg(long, default_value_t = signal_sim::simulation::MAX_VELOCITY)]
    max_velocity: f32,

    /// Gap kept to the vehicle ahead
    #[arg(long, default_value_t = signal_sim::simulation::SAFETY_DISTANCE)]
    safety_distance: f32,

    /// Chance per tick of a new driver entering the network
    #[arg(long, default_value_t = signal_sim::simulation::SPAWN_PROBABILITY)]
    spawn_probability: f32,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log a summary every this many ticks (0 disables)
    #[arg(long, default_value = "100")]
    report_every: u64,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            dt: self.dt,
            max_velocity: self.max_velocity,
            safety_distance: self.safety_distance,
            spawn_probability: self.spawn_probability,
            seed: self.seed,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run_headless(&cli) {
        error!("Simulation aborted: {:#}", e);
        std::process::exit(1);
    }
}

/// Run the simulation without graphics for the requested number of ticks
fn run_headless(cli: &Cli) -> Result<()> {
    let network = cli
        .network
        .build()
        .with_context(|| format!("failed to build {:?} network", cli.network))?;
    let mut world = SimWorld::new(network, cli.config())?;

    info!("Running {:?} network for {} ticks", cli.network, cli.ticks);
    world.log_summary();

    for tick in 1..=cli.ticks {
        world.step().with_context(|| format!("tick {} failed", tick))?;

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            world.log_summary();
        }
    }

    let stats = world.stats();
    info!("=== SIMULATION COMPLETE ===");
    info!("Simulated time: {:.1}", world.time());
    info!("Total ticks: {}", stats.ticks);
    info!("Total drivers spawned: {}", stats.total_drivers_spawned);
    info!("Total drivers completed: {}", stats.total_drivers_completed);
    info!("Active drivers: {}", world.driver_count());
    info!("Completion rate: {:.1}%", stats.completion_rate());

    Ok(())
}
