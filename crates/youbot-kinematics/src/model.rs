//! One-step forward kinematic update of the mobile manipulator.

use crate::error::KinematicsError;
use crate::mecanum::{ChassisGeometry, Integrator, MecanumDrive, is_positive};
use crate::state::{CONFIGURATION_LEN, Command, Configuration};

/// State transition of a four-mecanum-wheel mobile manipulator.
///
/// The model is stateless apart from its fixed geometry; [`KinematicModel::step`]
/// never allocates and can be called concurrently on independent inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicModel {
    geometry: ChassisGeometry,
    drive: MecanumDrive,
    integrator: Integrator,
}

impl KinematicModel {
    /// Construct a model for the given geometry and odometry integration scheme.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` for an invalid geometry and
    /// `Err(KinematicsError::NumericDegeneracy)` if the wheel-to-twist mapping is
    /// rank deficient.
    pub fn new(geometry: ChassisGeometry, integrator: Integrator) -> Result<Self, KinematicsError> {
        let drive = MecanumDrive::new(geometry)?;
        Ok(KinematicModel {
            geometry,
            drive,
            integrator,
        })
    }

    /// The youBot model with exact odometry integration.
    pub fn youbot() -> Result<Self, KinematicsError> {
        Self::new(ChassisGeometry::YOUBOT, Integrator::Exact)
    }

    /// Returns the chassis geometry.
    pub fn geometry(&self) -> ChassisGeometry {
        self.geometry
    }

    /// Returns the odometry model.
    pub fn drive(&self) -> &MecanumDrive {
        &self.drive
    }

    /// Returns the odometry integration scheme.
    pub fn integrator(&self) -> Integrator {
        self.integrator
    }

    /// Computes the configuration `dt` seconds after `config` under `command`.
    ///
    /// Every command component is first clamped to `[-limit, limit]`. Arm joints
    /// and wheel angles advance by a first-order Euler step; the chassis pose
    /// advances by the body twist estimated from the clamped wheel speeds.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if `dt` or `limit` is not
    /// a positive finite number.
    pub fn step(
        &self,
        config: &Configuration,
        command: &Command,
        dt: f64,
        limit: f64,
    ) -> Result<Configuration, KinematicsError> {
        validate_step_parameters(dt, limit)?;

        let command = command.saturate(limit)?;

        let mut arm = config.arm;
        for (theta, speed) in arm.iter_mut().zip(command.arm_speeds.0) {
            *theta += speed * dt;
        }

        let mut wheels = config.wheels;
        for (angle, speed) in wheels.iter_mut().zip(command.wheel_speeds.to_array()) {
            *angle += speed * dt;
        }

        let chassis = self.drive.update_pose_from_wheel_speeds(
            config.chassis,
            command.wheel_speeds,
            dt,
            self.integrator,
        )?;

        Ok(Configuration::new(chassis, arm, wheels))
    }

    /// [`Self::step`] on the flat vector layouts.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` if `config` does not have 12
    /// elements or `command` does not have 9, before any computation, plus the
    /// errors of [`Self::step`].
    pub fn step_slices(
        &self,
        config: &[f64],
        command: &[f64],
        dt: f64,
        limit: f64,
    ) -> Result<[f64; CONFIGURATION_LEN], KinematicsError> {
        let config = Configuration::from_slice(config)?;
        let command = Command::from_slice(command)?;
        Ok(self.step(&config, &command, dt, limit)?.to_array())
    }
}

/// Checks the scalar inputs of [`KinematicModel::step`].
pub fn validate_step_parameters(dt: f64, limit: f64) -> Result<(), KinematicsError> {
    if !is_positive(dt) {
        return Err(KinematicsError::InvalidParameter("timestep must be positive"));
    }
    if !is_positive(limit) {
        return Err(KinematicsError::InvalidParameter("speed limit must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ARM_JOINTS, ArmJoints, Pose, WheelSpeeds};
    const EPSILON: f64 = 1e-9;

    fn model() -> KinematicModel {
        KinematicModel::youbot().unwrap()
    }

    #[test]
    fn test_zero_command_leaves_configuration_unchanged() {
        let configs = [
            Configuration::default(),
            Configuration::from([4.0, -1.5, 2.25, 0.1, -0.2, 0.3, -0.4, 0.5, 10.0, -10.0, 3.0, 0.0]),
        ];
        for integrator in [Integrator::Euler, Integrator::Exact] {
            let m = KinematicModel::new(ChassisGeometry::YOUBOT, integrator).unwrap();
            for q in configs {
                for (dt, limit) in [(0.01, 5.0), (1.0, 0.1), (0.5, 100.0)] {
                    let next = m.step(&q, &Command::default(), dt, limit).unwrap();
                    assert_eq!(next, q);
                }
            }
        }
    }

    #[test]
    fn test_saturated_wheels_single_step() {
        let q = Configuration::default();
        let u = Command::from([0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0]);
        let next = model().step(&q, &u, 0.01, 5.0).unwrap();

        assert_eq!(next.arm, [0.0; 5]);
        for angle in next.wheels {
            assert!((angle - 0.05).abs() < EPSILON);
        }
        // Vb = pinv(H) * [5, 5, 5, 5] = (0, r * 5, 0)
        assert!(next.chassis.phi.abs() < EPSILON);
        assert!((next.chassis.x - 0.0475 * 5.0 * 0.01).abs() < EPSILON);
        assert!(next.chassis.y.abs() < EPSILON);
    }

    #[test]
    fn test_arm_joints_integrate_linearly() {
        let m = model();
        let u = Command::from([0.5, -1.0, 2.0, 7.0, -3.0, 0.0, 0.0, 0.0, 0.0]);
        let initial = Configuration::from([0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.0, 0.0, 0.0, 0.0]);
        let (dt, limit, n) = (0.02, 5.0, 50);

        let mut q = initial;
        for _ in 0..n {
            q = m.step(&q, &u, dt, limit).unwrap();
        }

        let clamped = u.saturate(limit).unwrap().arm_speeds;
        for i in 0..ARM_JOINTS {
            let expected = initial.arm[i] + n as f64 * clamped[i] * dt;
            assert!((q.arm[i] - expected).abs() < 1e-9);
        }
        assert_eq!(q.chassis, Pose::default());
        assert_eq!(q.wheels, [0.0; 4]);
    }

    #[test]
    fn test_pure_spin_changes_only_heading() {
        let m = model();
        let q = Configuration::default();
        let u = Command::new(ArmJoints::default(), WheelSpeeds::new(-2.0, 2.0, 2.0, -2.0));
        let next = m.step(&q, &u, 0.1, 5.0).unwrap();
        let expected_phi = 0.0475 / 0.385 * 2.0 * 0.1;
        assert!((next.chassis.phi - expected_phi).abs() < EPSILON);
        assert!(next.chassis.x.abs() < EPSILON);
        assert!(next.chassis.y.abs() < EPSILON);
    }

    #[test]
    fn test_pure_translation_keeps_heading() {
        let m = model();
        let q = Configuration::from([0.7, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let u = Command::new(ArmJoints::default(), WheelSpeeds::new(-3.0, 3.0, -3.0, 3.0));
        let next = m.step(&q, &u, 0.1, 5.0).unwrap();
        // Sideways in the body frame, rotated by the old heading.
        let d = 0.0475 * 3.0 * 0.1;
        assert!((next.chassis.phi - 0.7).abs() < EPSILON);
        assert!((next.chassis.x - (1.0 - 0.7_f64.sin() * d)).abs() < EPSILON);
        assert!((next.chassis.y - (1.0 + 0.7_f64.cos() * d)).abs() < EPSILON);
    }

    #[test]
    fn test_step_does_not_modify_inputs() {
        let q = Configuration::default();
        let u = Command::from([9.0; 9]);
        let _ = model().step(&q, &u, 0.01, 1.0).unwrap();
        assert_eq!(u.to_array(), [9.0; 9]);
        assert_eq!(q, Configuration::default());
    }

    #[test]
    fn test_step_slices_dimension_contract() {
        let m = model();
        let u = [0.0; 9];
        assert_eq!(
            m.step_slices(&[0.0; 11], &u, 0.01, 5.0),
            Err(KinematicsError::InvalidDimension { expected: 12, actual: 11 })
        );
        assert_eq!(
            m.step_slices(&[0.0; 13], &u, 0.01, 5.0),
            Err(KinematicsError::InvalidDimension { expected: 12, actual: 13 })
        );
        assert_eq!(
            m.step_slices(&[0.0; 12], &[0.0; 10], 0.01, 5.0),
            Err(KinematicsError::InvalidDimension { expected: 9, actual: 10 })
        );
        assert_eq!(m.step_slices(&[0.0; 12], &u, 0.01, 5.0), Ok([0.0; 12]));
    }

    #[test]
    fn test_step_rejects_invalid_parameters() {
        let m = model();
        let q = Configuration::default();
        let u = Command::default();
        assert!(matches!(
            m.step(&q, &u, 0.0, 5.0),
            Err(KinematicsError::InvalidParameter("timestep must be positive"))
        ));
        assert!(matches!(
            m.step(&q, &u, 0.01, -1.0),
            Err(KinematicsError::InvalidParameter("speed limit must be positive"))
        ));
        assert!(matches!(
            m.step(&q, &u, 0.01, f64::NAN),
            Err(KinematicsError::InvalidParameter("speed limit must be positive"))
        ));
    }
}
