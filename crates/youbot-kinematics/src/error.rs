#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! Every error here is a defect in caller-supplied input (or in the chassis
//! geometry); nothing is recovered internally.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// A configuration or command vector does not have the required fixed length.
    InvalidDimension {
        /// Length the vector must have.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
    /// A scalar parameter is out of its domain.
    /// Returned for non-positive timesteps, speed limits or geometry lengths,
    /// negative horizons, and non-finite values.
    InvalidParameter(&'static str),
    /// The wheel-to-twist mapping built from the geometry is rank deficient.
    NumericDegeneracy(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidDimension { expected, actual } => {
                write!(f, "Invalid dimension: expected {} elements, got {}", expected, actual)
            }
            KinematicsError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            KinematicsError::NumericDegeneracy(msg) => write!(f, "Numeric degeneracy: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
