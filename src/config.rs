use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use youbot_kinematics::{
    CONFIGURATION_LEN, ChassisGeometry, Command, Configuration, Integrator,
    KinematicsError,
};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "YOUBOT";

/// Settings for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Timestep (s).
    pub dt: f64,
    /// Bound on the absolute value of every command component (rad/s).
    pub speed_limit: f64,
    /// Simulated duration (s).
    pub horizon: f64,
    /// Odometry integration scheme for the chassis pose.
    pub integrator: Integrator,
    /// Where the trajectory CSV is written.
    pub output: PathBuf,
    /// Flat 12-element starting configuration.
    pub initial_configuration: Vec<f64>,
    /// Flat 9-element command held for the whole run.
    pub command: Vec<f64>,
    /// Chassis dimensions used to build the wheel-to-twist mapping.
    pub geometry: ChassisGeometry,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            dt: 0.01,
            speed_limit: 5.0,
            horizon: 1.0,
            integrator: Integrator::Exact,
            output: PathBuf::from("nextstate.csv"),
            initial_configuration: vec![0.0; CONFIGURATION_LEN],
            command: vec![0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0],
            geometry: ChassisGeometry::YOUBOT,
        }
    }
}

impl SimConfig {
    /// The starting configuration, arity checked.
    pub fn initial_configuration(&self) -> Result<Configuration, KinematicsError> {
        Configuration::from_slice(&self.initial_configuration)
    }

    /// The command, arity checked.
    pub fn command(&self) -> Result<Command, KinematicsError> {
        Command::from_slice(&self.command)
    }
}

/// Values supplied on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces [`SimConfig::output`].
    pub output: Option<PathBuf>,
    /// Replaces [`SimConfig::dt`].
    pub dt: Option<f64>,
    /// Replaces [`SimConfig::speed_limit`].
    pub speed_limit: Option<f64>,
    /// Replaces [`SimConfig::horizon`].
    pub horizon: Option<f64>,
    /// Replaces [`SimConfig::integrator`].
    pub integrator: Option<Integrator>,
}

/// Loads the simulation settings.
///
/// Sources, lowest precedence first: built-in defaults, the TOML file (`path`, or
/// [`DEFAULT_CONFIG_PATH`] if present), `YOUBOT_*` environment variables, `overrides`.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<SimConfig, ConfigError> {
    match path {
        Some(p) => load_layered(p, true, overrides),
        None => load_layered(Path::new(DEFAULT_CONFIG_PATH), false, overrides),
    }
}

fn load_layered(file: &Path, required: bool, overrides: &Overrides) -> Result<SimConfig, ConfigError> {
    info!("Attempting to load configuration from {}", file.display());
    if !required && !file.exists() {
        warn!("{} not found, using built-in defaults", file.display());
    }

    let settings = Config::builder()
        .add_source(Config::try_from(&SimConfig::default())?)
        .add_source(File::from(file).format(FileFormat::Toml).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("initial_configuration")
                .with_list_parse_key("command"),
        )
        .set_override_option("output", overrides.output.as_ref().map(|p| p.display().to_string()))?
        .set_override_option("dt", overrides.dt)?
        .set_override_option("speed_limit", overrides.speed_limit)?
        .set_override_option("horizon", overrides.horizon)?
        .set_override_option("integrator", overrides.integrator.map(|i| i.to_string()))?
        .build()
        .and_then(|c| c.try_deserialize::<SimConfig>());

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration: {:?}", config);
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}
