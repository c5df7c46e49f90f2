//! # Device capabilities
//!
//! These traits describe the vendor SDK boundary. A backend hands out a camera collection and a
//! vector engine, and everything else (session bring-up, frame pumping, calibration) is built on
//! top of them.
//!
//! All calls are synchronous, and none of them is expected to block, with the exception of
//! whatever the backend does internally.

use crate::config::LedChannel;
use crate::prelude::v1::*;

/// One of the six degrees of freedom reported by the vector engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    Yaw,
    Pitch,
    Roll,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Self::X,
        Self::Y,
        Self::Z,
        Self::Yaw,
        Self::Pitch,
        Self::Roll,
    ];
}

/// Factory for the capability objects.
pub trait DeviceProvider {
    /// Create a camera collection, the entry point to camera enumeration.
    fn create_camera_collection(&mut self) -> Result<Box<dyn CameraCollection>>;

    /// Create a vector engine for a three-point marker.
    fn create_vector(&mut self) -> Result<Box<dyn VectorEngine>>;
}

impl<T: DeviceProvider + ?Sized> DeviceProvider for Box<T> {
    fn create_camera_collection(&mut self) -> Result<Box<dyn CameraCollection>> {
        (**self).create_camera_collection()
    }

    fn create_vector(&mut self) -> Result<Box<dyn VectorEngine>> {
        (**self).create_vector()
    }
}

/// Collection of attached cameras.
pub trait CameraCollection {
    /// Rescan attached cameras.
    fn enumerate(&mut self) -> Result<()>;

    /// Number of cameras found by the last [`enumerate`](Self::enumerate).
    fn count(&self) -> Result<usize>;

    /// Get a camera by its enumeration index.
    fn item(&mut self, index: usize) -> Result<Box<dyn Camera>>;
}

/// Single camera.
///
/// Dropping the object releases the camera.
pub trait Camera {
    fn set_led(&mut self, channel: LedChannel, on: bool) -> Result<()>;

    fn open(&mut self) -> Result<()>;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    /// Poll for the next frame.
    ///
    /// This never waits. If there is no frame buffered, `Ok(None)` is returned.
    fn get_frame(&mut self) -> Result<Option<Box<dyn Frame>>>;
}

/// Camera frame handle.
///
/// Frames must be released exactly once, before the next one is requested. Use
/// [`FrameGuard`](crate::pump::FrameGuard) instead of calling [`release`](Self::release)
/// manually.
pub trait Frame {
    fn release(&mut self) -> Result<()>;
}

/// Computes a 6DOF marker pose out of camera frames.
pub trait VectorEngine {
    /// Configure the distances between the three marker points.
    ///
    /// # Arguments
    ///
    /// * `dist01` - distance between points 0 and 1.
    /// * `dist02` - distance between points 0 and 2.
    /// * `dist12` - distance between points 1 and 2.
    fn set_distances(&mut self, dist01: f64, dist02: f64, dist12: f64) -> Result<()>;

    /// Reset internal tracking state.
    fn reset(&mut self) -> Result<()>;

    /// Compute the pose from a frame of the given camera.
    fn update(&mut self, camera: &dyn Camera, frame: &dyn Frame) -> Result<()>;

    /// Read one axis of the last computed pose.
    ///
    /// Positions are in native distance units, angles are in degrees.
    fn get(&self, axis: Axis) -> Result<f64>;
}
