//! Trajectory simulation for a four-mecanum-wheel mobile manipulator.
//!
//! Repeatedly applies [`youbot_kinematics::KinematicModel::step`] over a fixed
//! horizon and hands the resulting trajectory to a CSV sink.

pub mod config;
pub mod simulator;
pub mod trajectory;

use anyhow::Context;
use tracing::info;
use youbot_kinematics::KinematicModel;

pub use crate::config::{Overrides, SimConfig, load_config};
pub use simulator::TrajectorySimulator;
pub use trajectory::{CsvWriter, Trajectory, TrajectorySink};

/// Builds the model described by `config` and simulates the configured run.
pub fn simulate(config: &SimConfig) -> anyhow::Result<Trajectory> {
    let model = KinematicModel::new(config.geometry, config.integrator)
        .context("invalid chassis geometry")?;
    let initial = config
        .initial_configuration()
        .context("invalid initial configuration")?;
    let command = config.command().context("invalid command")?;

    TrajectorySimulator::new(model)
        .simulate(&initial, &command, config.dt, config.speed_limit, config.horizon)
        .context("simulation failed")
}

/// Simulates the configured run and writes the trajectory to `config.output`.
///
/// The output file is only created once the whole run has succeeded.
pub fn run(config: &SimConfig) -> anyhow::Result<Trajectory> {
    let trajectory = simulate(config)?;

    let mut sink = CsvWriter::create(&config.output)?;
    sink.write_trajectory(&trajectory)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    info!(
        rows = trajectory.len(),
        output = %config.output.display(),
        "Trajectory saved"
    );
    Ok(trajectory)
}
