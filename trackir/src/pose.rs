//! # Raw samples and normalized poses

use crate::config::ScaleFactors;
use crate::device::Axis;
use nalgebra as na;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Degrees to radians, halved.
const DEG_TO_RAD_DIV2: f64 = 0.00872664625997165;

/// One reading of the vector engine.
///
/// Positions are in device-native distance units, angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl RawSample {
    pub fn new(x: f64, y: f64, z: f64, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            x,
            y,
            z,
            yaw,
            pitch,
            roll,
        }
    }

    /// Express the sample relative to `zero`, with every axis multiplied by its scale factor.
    pub fn relative_to(&self, zero: &RawSample, scale: &ScaleFactors) -> RawSample {
        let mut out = RawSample::default();
        for axis in Axis::ALL {
            out[axis] = (self[axis] - zero[axis]) * scale[axis];
        }
        out
    }
}

impl Index<Axis> for RawSample {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::Yaw => &self.yaw,
            Axis::Pitch => &self.pitch,
            Axis::Roll => &self.roll,
        }
    }
}

impl IndexMut<Axis> for RawSample {
    fn index_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::Yaw => &mut self.yaw,
            Axis::Pitch => &mut self.pitch,
            Axis::Roll => &mut self.roll,
        }
    }
}

/// Convert yaw, pitch and roll (in degrees) to a unit quaternion.
///
/// Rotations are composed in yaw-pitch-roll order, with the half-angle terms combined exactly as
/// consumers of the tracker expect. Do not replace this with
/// `UnitQuaternion::from_euler_angles`, its axis assignment differs.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// use trackir::pose::euler_to_quaternion;
///
/// let q = euler_to_quaternion(90.0, 0.0, 0.0);
///
/// assert_approx_eq!(q.w, 0.5f64.sqrt(), 1e-9);
/// assert_approx_eq!(q.j, 0.5f64.sqrt(), 1e-9);
/// ```
pub fn euler_to_quaternion(yaw: f64, pitch: f64, roll: f64) -> na::UnitQuaternion<f64> {
    let c1 = (yaw * DEG_TO_RAD_DIV2).cos();
    let s1 = (yaw * DEG_TO_RAD_DIV2).sin();
    let c2 = (pitch * DEG_TO_RAD_DIV2).cos();
    let s2 = (pitch * DEG_TO_RAD_DIV2).sin();
    let c3 = (roll * DEG_TO_RAD_DIV2).cos();
    let s3 = (roll * DEG_TO_RAD_DIV2).sin();
    let c1c2 = c1 * c2;
    let s1s2 = s1 * s2;

    na::UnitQuaternion::new_unchecked(na::Quaternion::new(
        c1c2 * c3 - s1s2 * s3,
        c1c2 * s3 + s1s2 * c3,
        s1 * c2 * c3 + c1 * s2 * s3,
        c1 * s2 * c3 - s1 * c2 * s3,
    ))
}

/// Pose reported to the consumer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub translation: na::Vector3<f64>,
    pub rotation: na::UnitQuaternion<f64>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::centered()
    }
}

impl Pose {
    /// Zero translation, identity rotation.
    pub fn centered() -> Self {
        Self {
            translation: na::Vector3::zeros(),
            rotation: na::UnitQuaternion::identity(),
        }
    }

    /// Build a pose out of already scaled, zero-relative axis values.
    pub fn from_axes(axes: &RawSample) -> Self {
        Self {
            translation: na::Vector3::new(axes.x, axes.y, axes.z),
            rotation: euler_to_quaternion(axes.yaw, axes.pitch, axes.roll),
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let t = &self.translation;
        let q = self.rotation.quaternion();
        write!(
            f,
            "t = ({:.3}, {:.3}, {:.3}) q = ({:.4}, {:.4}, {:.4}, {:.4})",
            t.x, t.y, t.z, q.w, q.i, q.j, q.k
        )
    }
}
