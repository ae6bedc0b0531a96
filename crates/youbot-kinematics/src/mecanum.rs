//! Four-wheel mecanum odometry.
//!
//! Wheel speeds `u` relate to the chassis body twist `Vb = (ωz, vx, vy)` through
//! the fixed matrix `H(0)`: `u = H · Vb`. Four wheels over-determine three twist
//! components, so odometry recovers the twist with the Moore–Penrose
//! pseudo-inverse `F = pinv(H)`, computed once from an SVD when the drive is built.

use core::fmt;
use core::str::FromStr;

use libm::{cos, fabs, sin};
use nalgebra::{Matrix3x4, Matrix4x3, Vector3, Vector4};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;
use crate::state::{Pose, Twist, WheelSpeeds};

/// Relative singular value threshold below which `H` is considered rank deficient.
const RANK_TOLERANCE: f64 = 1e-9;

/// Angular rates smaller than this are integrated as pure translation.
const MIN_ANGULAR_RATE: f64 = 1e-12;

/// Fixed chassis dimensions of a four-mecanum-wheel base.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChassisGeometry {
    /// Half the distance between front and rear axles (m).
    pub half_length: f64,
    /// Half the distance between left and right wheels (m).
    pub half_width: f64,
    /// Wheel radius (m).
    pub wheel_radius: f64,
}

impl ChassisGeometry {
    /// KUKA youBot base: `l = 0.47 / 2`, `w = 0.3 / 2`, `r = 0.0475`.
    pub const YOUBOT: ChassisGeometry = ChassisGeometry {
        half_length: 0.235,
        half_width: 0.15,
        wheel_radius: 0.0475,
    };

    /// Construct a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if any dimension is not
    /// a positive finite number.
    pub fn new(half_length: f64, half_width: f64, wheel_radius: f64) -> Result<Self, KinematicsError> {
        let geometry = ChassisGeometry {
            half_length,
            half_width,
            wheel_radius,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Check that every dimension is a positive finite number.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        if !is_positive(self.half_length) {
            return Err(KinematicsError::InvalidParameter("half length must be positive"));
        }
        if !is_positive(self.half_width) {
            return Err(KinematicsError::InvalidParameter("half width must be positive"));
        }
        if !is_positive(self.wheel_radius) {
            return Err(KinematicsError::InvalidParameter("wheel radius must be positive"));
        }
        Ok(())
    }

    /// The wheel-to-twist matrix `H(0)`.
    ///
    /// Rows are the wheels (front-left, front-right, rear-right, rear-left),
    /// columns are `[ωz, vx, vy]`.
    pub fn wheel_matrix(&self) -> Matrix4x3<f64> {
        let lw = self.half_length + self.half_width;
        Matrix4x3::new(
            -lw, 1.0, -1.0, //
            lw, 1.0, 1.0, //
            lw, 1.0, -1.0, //
            -lw, 1.0, 1.0,
        ) / self.wheel_radius
    }
}

impl Default for ChassisGeometry {
    fn default() -> Self {
        ChassisGeometry::YOUBOT
    }
}

impl fmt::Display for ChassisGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ChassisGeometry (l: {:.3} m, w: {:.3} m, r: {:.4} m)",
            self.half_length, self.half_width, self.wheel_radius
        )
    }
}

/// Scheme used to turn a constant body twist into a pose displacement over `dt`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrator {
    /// First-order step `Δq_b = Vb · dt`.
    Euler,
    /// Exponential-coordinates integration of the planar twist.
    #[default]
    Exact,
}

impl FromStr for Integrator {
    type Err = KinematicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("euler") {
            Ok(Integrator::Euler)
        } else if s.eq_ignore_ascii_case("exact") {
            Ok(Integrator::Exact)
        } else {
            Err(KinematicsError::InvalidParameter(
                "integrator must be `euler` or `exact`",
            ))
        }
    }
}

impl fmt::Display for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integrator::Euler => write!(f, "euler"),
            Integrator::Exact => write!(f, "exact"),
        }
    }
}

/// Mecanum-drive kinematics helper.
///
/// Holds `H(0)` and its pseudo-inverse; both are fixed after construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MecanumDrive {
    h: Matrix4x3<f64>,
    f: Matrix3x4<f64>,
}

impl MecanumDrive {
    /// Build the odometry model for the given chassis geometry.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` for an invalid geometry and
    /// `Err(KinematicsError::NumericDegeneracy)` if `H(0)` is rank deficient.
    pub fn new(geometry: ChassisGeometry) -> Result<Self, KinematicsError> {
        geometry.validate()?;
        Self::from_wheel_matrix(geometry.wheel_matrix())
    }

    /// Build the odometry model from an explicit wheel-to-twist matrix.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NumericDegeneracy)` if `h` does not have
    /// full column rank or contains non-finite entries.
    pub fn from_wheel_matrix(h: Matrix4x3<f64>) -> Result<Self, KinematicsError> {
        if h.iter().any(|v| !v.is_finite()) {
            return Err(KinematicsError::NumericDegeneracy(
                "wheel matrix has non-finite entries",
            ));
        }

        let svd = h.svd(true, true);
        let eps = RANK_TOLERANCE * svd.singular_values.max();
        if svd.rank(eps) < 3 {
            return Err(KinematicsError::NumericDegeneracy(
                "wheel matrix is rank deficient",
            ));
        }
        let f = svd
            .pseudo_inverse(eps)
            .map_err(KinematicsError::NumericDegeneracy)?;

        Ok(MecanumDrive { h, f })
    }

    /// The wheel-to-twist matrix `H(0)`.
    pub fn wheel_matrix(&self) -> &Matrix4x3<f64> {
        &self.h
    }

    /// The pseudo-inverse `F = pinv(H(0))` used for odometry.
    pub fn odometry_matrix(&self) -> &Matrix3x4<f64> {
        &self.f
    }

    /// Body twist estimated from wheel speeds: `Vb = F · u`.
    ///
    /// Wheel speeds that are not consistent with a single rigid twist yield the
    /// least-squares twist.
    pub fn forward_kinematics(&self, wheel_speeds: WheelSpeeds) -> Twist {
        let u = Vector4::from(wheel_speeds.to_array());
        let vb = self.f * u;
        Twist::new(vb[0], vb[1], vb[2])
    }

    /// Wheel speeds that realise a body twist: `u = H · Vb`.
    pub fn inverse_kinematics(&self, twist: Twist) -> WheelSpeeds {
        let vb = Vector3::new(twist.wz, twist.vx, twist.vy);
        let u = self.h * vb;
        WheelSpeeds::new(u[0], u[1], u[2], u[3])
    }

    /// Chassis displacement `(Δphi, Δx, Δy)` in the body frame produced by holding
    /// `twist` constant for `dt` seconds.
    pub fn body_displacement(&self, twist: Twist, dt: f64, integrator: Integrator) -> Pose {
        let dphi = twist.wz * dt;
        match integrator {
            Integrator::Euler => Pose::new(dphi, twist.vx * dt, twist.vy * dt),
            Integrator::Exact if fabs(twist.wz) < MIN_ANGULAR_RATE => {
                Pose::new(dphi, twist.vx * dt, twist.vy * dt)
            }
            Integrator::Exact => {
                let (s, c) = (sin(dphi), cos(dphi));
                let dx = (twist.vx * s + twist.vy * (c - 1.0)) / twist.wz;
                let dy = (twist.vy * s + twist.vx * (1.0 - c)) / twist.wz;
                Pose::new(dphi, dx, dy)
            }
        }
    }

    /// Updates the chassis pose given a body twist held for `dt` seconds.
    ///
    /// The body-frame displacement is rotated into the world frame by the
    /// heading at the start of the interval.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidParameter)` if `dt` is not a positive
    /// finite number.
    pub fn update_pose(
        &self,
        current_pose: Pose,
        twist: Twist,
        dt: f64,
        integrator: Integrator,
    ) -> Result<Pose, KinematicsError> {
        if !is_positive(dt) {
            return Err(KinematicsError::InvalidParameter("timestep must be positive"));
        }

        let db = self.body_displacement(twist, dt, integrator);
        let (s, c) = (sin(current_pose.phi), cos(current_pose.phi));

        Ok(Pose {
            phi: current_pose.phi + db.phi,
            x: current_pose.x + c * db.x - s * db.y,
            y: current_pose.y + s * db.x + c * db.y,
        })
    }

    /// Convenience wrapper: odometry from wheel speeds followed by [`Self::update_pose`].
    pub fn update_pose_from_wheel_speeds(
        &self,
        current_pose: Pose,
        wheel_speeds: WheelSpeeds,
        dt: f64,
        integrator: Integrator,
    ) -> Result<Pose, KinematicsError> {
        let twist = self.forward_kinematics(wheel_speeds);
        self.update_pose(current_pose, twist, dt, integrator)
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
