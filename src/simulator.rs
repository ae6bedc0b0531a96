use tracing::{debug, info};
use youbot_kinematics::{Command, Configuration, KinematicModel, KinematicsError, validate_step_parameters};

use crate::trajectory::Trajectory;

/// Relative slack so that float noise in `horizon / dt` (e.g. `1.1 / 0.1`) does
/// not add a step.
const STEP_SLACK: f64 = 1e-9;

/// Upper bound on the number of steps a single run may take.
pub const MAX_STEPS: usize = 10_000_000;

/// Drives a [`KinematicModel`] over a fixed horizon with a constant command.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySimulator {
    model: KinematicModel,
}

impl TrajectorySimulator {
    pub fn new(model: KinematicModel) -> Self {
        TrajectorySimulator { model }
    }

    pub fn model(&self) -> &KinematicModel {
        &self.model
    }

    /// Number of steps needed to cover `horizon` seconds: `ceil(horizon / dt)`.
    pub fn step_count(dt: f64, horizon: f64) -> Result<usize, KinematicsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(KinematicsError::InvalidParameter("timestep must be positive"));
        }
        if !(horizon.is_finite() && horizon >= 0.0) {
            return Err(KinematicsError::InvalidParameter("horizon must be non-negative"));
        }
        let steps = (horizon / dt * (1.0 - STEP_SLACK)).ceil();
        if steps > MAX_STEPS as f64 {
            return Err(KinematicsError::InvalidParameter("horizon needs too many steps"));
        }
        Ok(steps as usize)
    }

    /// Runs `step` `ceil(horizon / dt)` times from `initial`, holding `command`.
    ///
    /// All parameters are validated before the first step; the first failing step
    /// aborts the run and no trajectory is returned.
    pub fn simulate(
        &self,
        initial: &Configuration,
        command: &Command,
        dt: f64,
        limit: f64,
        horizon: f64,
    ) -> Result<Trajectory, KinematicsError> {
        validate_step_parameters(dt, limit)?;
        let steps = Self::step_count(dt, horizon)?;
        info!(steps, dt, limit, horizon, integrator = %self.model.integrator(), "Simulating");

        let mut trajectory = Trajectory::new(*initial, steps);
        let mut current = *initial;
        for i in 0..steps {
            current = self.model.step(&current, command, dt, limit)?;
            debug!(step = i + 1, chassis = %current.chassis);
            trajectory.push(current);
        }

        info!(final_pose = %trajectory.last().chassis, "Simulation complete");
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> TrajectorySimulator {
        TrajectorySimulator::new(KinematicModel::youbot().unwrap())
    }

    #[test]
    fn test_step_count() {
        assert_eq!(TrajectorySimulator::step_count(0.01, 1.0), Ok(100));
        assert_eq!(TrajectorySimulator::step_count(0.1, 1.1), Ok(11));
        assert_eq!(TrajectorySimulator::step_count(0.3, 1.0), Ok(4));
        assert_eq!(TrajectorySimulator::step_count(0.01, 0.0), Ok(0));
    }

    #[test]
    fn test_step_count_rejects_bad_input() {
        assert!(matches!(
            TrajectorySimulator::step_count(0.01, -1.0),
            Err(KinematicsError::InvalidParameter("horizon must be non-negative"))
        ));
        assert!(matches!(
            TrajectorySimulator::step_count(0.0, 1.0),
            Err(KinematicsError::InvalidParameter("timestep must be positive"))
        ));
        assert!(matches!(
            TrajectorySimulator::step_count(1e-12, 1e3),
            Err(KinematicsError::InvalidParameter("horizon needs too many steps"))
        ));
    }

    #[test]
    fn test_zero_horizon_keeps_only_initial() {
        let q = Configuration::from([1.0; 12]);
        let trajectory = simulator()
            .simulate(&q, &Command::default(), 0.01, 5.0, 0.0)
            .unwrap();
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.initial(), &q);
    }

    #[test]
    fn test_each_entry_is_one_step_of_the_previous() {
        let sim = simulator();
        let u = Command::from([0.1, 0.2, 0.3, 0.4, 0.5, -1.0, 2.0, 3.0, -4.0]);
        let trajectory = sim
            .simulate(&Configuration::default(), &u, 0.05, 2.5, 0.5)
            .unwrap();
        assert_eq!(trajectory.len(), 11);
        for pair in trajectory.as_slice().windows(2) {
            let expected = sim.model().step(&pair[0], &u, 0.05, 2.5).unwrap();
            assert_eq!(pair[1], expected);
        }
    }

    #[test]
    fn test_invalid_limit_is_rejected_up_front() {
        let result = simulator().simulate(&Configuration::default(), &Command::default(), 0.01, 0.0, 1.0);
        assert!(matches!(
            result,
            Err(KinematicsError::InvalidParameter("speed limit must be positive"))
        ));
    }
}
