use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};
use youbot_kinematics::Integrator;
use youbot_sim::{Overrides, load_config};

/// Simulate a youBot mobile manipulator under a constant velocity command
/// and write the trajectory as CSV.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file (defaults to config/default.toml when present)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Output CSV path
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Timestep in seconds
    #[arg(long)]
    dt: Option<f64>,
    /// Maximum absolute joint and wheel speed (rad/s)
    #[arg(long)]
    speed_limit: Option<f64>,
    /// Simulated duration in seconds
    #[arg(long)]
    horizon: Option<f64>,
    /// Odometry integration: `euler` or `exact`
    #[arg(long)]
    integrator: Option<Integrator>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            output: self.output.clone(),
            dt: self.dt,
            speed_limit: self.speed_limit,
            horizon: self.horizon,
            integrator: self.integrator,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    info!("youBot trajectory simulator started");

    let config = load_config(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;

    match youbot_sim::run(&config) {
        Ok(trajectory) => {
            info!(final_configuration = %trajectory.last(), "Done");
            Ok(())
        }
        Err(e) => {
            error!("Simulation aborted: {:#}", e);
            Err(e)
        }
    }
}
