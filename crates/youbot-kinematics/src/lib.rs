#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for four-mecanum-wheel mobile manipulator kinematics."]
#![doc = ""]
#![doc = "This crate provides the robot configuration and command types, the mecanum"]
#![doc = "odometry model (wheel speeds to body twist through the pseudo-inverse of `H(0)`),"]
#![doc = "and the one-step state transition used to simulate a youBot-style robot."]

pub mod error;
pub mod mecanum;
pub mod model;
pub mod state;

pub use error::KinematicsError;
pub use mecanum::{ChassisGeometry, Integrator, MecanumDrive};
pub use model::{KinematicModel, validate_step_parameters};
pub use state::{
    ARM_JOINTS, ArmJoints, COMMAND_LEN, CONFIGURATION_LEN, Command, Configuration, Pose, Twist,
    WHEELS, WheelSpeeds,
};
