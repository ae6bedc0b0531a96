//! Value types describing the robot state and its actuator commands.
//!
//! The flat orderings are fixed:
//! configuration = `[phi, x, y, arm_1..5, wheel_1..4]`,
//! command = `[arm_speed_1..5, wheel_speed_1..4]`.

use core::fmt;
use core::ops::{Deref, DerefMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;
use crate::mecanum::is_positive;

/// Number of arm joints.
pub const ARM_JOINTS: usize = 5;
/// Number of mecanum wheels.
pub const WHEELS: usize = 4;
/// Length of the flat configuration vector.
pub const CONFIGURATION_LEN: usize = 3 + ARM_JOINTS + WHEELS;
/// Length of the flat command vector.
pub const COMMAND_LEN: usize = ARM_JOINTS + WHEELS;

/// A planar chassis pose `(phi, x, y)` in radians and meters, world frame.
///
/// The heading is kept as integrated and never wrapped.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Heading (rad), counter-clockwise from the world x-axis.
    pub phi: f64,
    /// World-frame x position (m).
    pub x: f64,
    /// World-frame y position (m).
    pub y: f64,
}

impl Pose {
    /// Construct a new pose.
    pub const fn new(phi: f64, x: f64, y: f64) -> Self {
        Pose { phi, x, y }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(φ: {:.2} rad, x: {:.2}, y: {:.2})", self.phi, self.x, self.y)
    }
}

/// A planar body twist: angular rate about the body z-axis plus the two
/// linear velocity components, all expressed in the chassis frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Twist {
    /// Angular z velocity (rad/s).
    pub wz: f64,
    /// Linear x velocity (m/s).
    pub vx: f64,
    /// Linear y velocity (m/s).
    pub vy: f64,
}

impl Twist {
    /// Construct a new twist.
    pub const fn new(wz: f64, vx: f64, vy: f64) -> Self {
        Twist { wz, vx, vy }
    }
}

impl fmt::Display for Twist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(ωz: {:.2} rad/s, vx: {:.2} m/s, vy: {:.2} m/s)",
            self.wz, self.vx, self.vy
        )
    }
}

/// Angular velocities of the four mecanum wheels (rad/s).
///
/// Field order matches the wheel numbering used by the flat vectors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    /// Front-left wheel.
    pub front_left: f64,
    /// Front-right wheel.
    pub front_right: f64,
    /// Rear-right wheel.
    pub rear_right: f64,
    /// Rear-left wheel.
    pub rear_left: f64,
}

impl WheelSpeeds {
    /// Construct wheel speeds in the order front-left, front-right, rear-right, rear-left.
    pub const fn new(front_left: f64, front_right: f64, rear_right: f64, rear_left: f64) -> Self {
        WheelSpeeds {
            front_left,
            front_right,
            rear_right,
            rear_left,
        }
    }

    /// The speeds as an array in wheel order.
    pub const fn to_array(self) -> [f64; WHEELS] {
        [self.front_left, self.front_right, self.rear_right, self.rear_left]
    }
}

impl From<[f64; WHEELS]> for WheelSpeeds {
    fn from(u: [f64; WHEELS]) -> Self {
        WheelSpeeds::new(u[0], u[1], u[2], u[3])
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(FL: {:.2}, FR: {:.2}, RR: {:.2}, RL: {:.2} rad/s)",
            self.front_left, self.front_right, self.rear_right, self.rear_left
        )
    }
}

/// One value per arm joint: angles (rad) in a [`Configuration`], speeds
/// (rad/s) in a [`Command`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmJoints(pub [f64; ARM_JOINTS]);

impl ArmJoints {
    /// Construct from joint values in order `1..=5`.
    pub const fn new(joints: [f64; ARM_JOINTS]) -> Self {
        ArmJoints(joints)
    }

    /// The joint values as an array.
    pub const fn to_array(self) -> [f64; ARM_JOINTS] {
        self.0
    }
}

impl From<[f64; ARM_JOINTS]> for ArmJoints {
    fn from(joints: [f64; ARM_JOINTS]) -> Self {
        ArmJoints(joints)
    }
}

impl Deref for ArmJoints {
    type Target = [f64; ARM_JOINTS];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ArmJoints {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl PartialEq<[f64; ARM_JOINTS]> for ArmJoints {
    fn eq(&self, other: &[f64; ARM_JOINTS]) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ArmJoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2}", value)?;
        }
        write!(f, "]")
    }
}

/// Full robot configuration: chassis pose, arm joint angles and wheel angles.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Configuration {
    /// Chassis pose in the world frame.
    pub chassis: Pose,
    /// Arm joint angles (rad).
    pub arm: ArmJoints,
    /// Wheel angles (rad), same order as [`WheelSpeeds`].
    pub wheels: [f64; WHEELS],
}

impl Configuration {
    /// Construct a configuration from its parts.
    pub const fn new(chassis: Pose, arm: ArmJoints, wheels: [f64; WHEELS]) -> Self {
        Configuration { chassis, arm, wheels }
    }

    /// Build a configuration from the flat 12-element layout.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` if `values` does not have
    /// exactly [`CONFIGURATION_LEN`] elements.
    pub fn from_slice(values: &[f64]) -> Result<Self, KinematicsError> {
        let flat: &[f64; CONFIGURATION_LEN] =
            values.try_into().map_err(|_| KinematicsError::InvalidDimension {
                expected: CONFIGURATION_LEN,
                actual: values.len(),
            })?;
        Ok(Self::from(*flat))
    }

    /// The configuration in the flat 12-element layout.
    pub fn to_array(&self) -> [f64; CONFIGURATION_LEN] {
        let mut out = [0.0; CONFIGURATION_LEN];
        out[0] = self.chassis.phi;
        out[1] = self.chassis.x;
        out[2] = self.chassis.y;
        out[3..3 + ARM_JOINTS].copy_from_slice(&self.arm.0);
        out[3 + ARM_JOINTS..].copy_from_slice(&self.wheels);
        out
    }
}

impl From<[f64; CONFIGURATION_LEN]> for Configuration {
    fn from(q: [f64; CONFIGURATION_LEN]) -> Self {
        let mut arm = [0.0; ARM_JOINTS];
        let mut wheels = [0.0; WHEELS];
        arm.copy_from_slice(&q[3..3 + ARM_JOINTS]);
        wheels.copy_from_slice(&q[3 + ARM_JOINTS..]);
        Configuration::new(Pose::new(q[0], q[1], q[2]), ArmJoints(arm), wheels)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chassis {} arm {} wheels [", self.chassis, self.arm)?;
        for (i, angle) in self.wheels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.2}", angle)?;
        }
        write!(f, "]")
    }
}

/// Actuator velocity command: arm joint speeds followed by wheel speeds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Command {
    /// Arm joint speeds (rad/s).
    pub arm_speeds: ArmJoints,
    /// Wheel speeds (rad/s).
    pub wheel_speeds: WheelSpeeds,
}

impl Command {
    /// Construct a command from its parts.
    pub const fn new(arm_speeds: ArmJoints, wheel_speeds: WheelSpeeds) -> Self {
        Command {
            arm_speeds,
            wheel_speeds,
        }
    }

    /// Build a command from the flat 9-element layout.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidDimension)` if `values` does not have
    /// exactly [`COMMAND_LEN`] elements.
    pub fn from_slice(values: &[f64]) -> Result<Self, KinematicsError> {
        let flat: &[f64; COMMAND_LEN] =
            values.try_into().map_err(|_| KinematicsError::InvalidDimension {
                expected: COMMAND_LEN,
                actual: values.len(),
            })?;
        Ok(Self::from(*flat))
    }

    /// The command in the flat 9-element layout.
    pub fn to_array(&self) -> [f64; COMMAND_LEN] {
        let mut out = [0.0; COMMAND_LEN];
        out[..ARM_JOINTS].copy_from_slice(&self.arm_speeds.0);
        out[ARM_JOINTS..].copy_from_slice(&self.wheel_speeds.to_array());
        out
    }

    /// Returns a copy with every component clamped to `[-limit, limit]`.
    ///
    /// Components already in range are returned untouched.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if `limit` is not a
    /// positive finite number.
    pub fn saturate(&self, limit: f64) -> Result<Command, KinematicsError> {
        if !is_positive(limit) {
            return Err(KinematicsError::InvalidParameter("speed limit must be positive"));
        }
        let mut flat = self.to_array();
        for u in flat.iter_mut() {
            *u = u.clamp(-limit, limit);
        }
        Ok(Command::from(flat))
    }
}

impl From<[f64; COMMAND_LEN]> for Command {
    fn from(u: [f64; COMMAND_LEN]) -> Self {
        let mut arm_speeds = [0.0; ARM_JOINTS];
        let mut wheels = [0.0; WHEELS];
        arm_speeds.copy_from_slice(&u[..ARM_JOINTS]);
        wheels.copy_from_slice(&u[ARM_JOINTS..]);
        Command::new(ArmJoints(arm_speeds), WheelSpeeds::from(wheels))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arm {} rad/s wheels {}", self.arm_speeds, self.wheel_speeds)
    }
}
