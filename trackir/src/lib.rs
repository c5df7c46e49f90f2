//! # TrackIR Pose Bridge
//!
//! This library drives an optical vector-marker camera and turns its raw 6DOF readings into
//! normalized poses (translation and a unit quaternion) that a polling tracking framework can
//! consume.
//!
//! The pipeline consists of a device session, a frame pump, zero-reference calibration and a pose
//! converter, all composed into a single [`TrackerBridge`](bridge::TrackerBridge).
//!
//! The easiest way to use the library is to import its prelude:
//!
//! ```
//! use trackir::prelude::v1::*;
//! ```
//!
//! Hardware access goes through the traits in [`device`], so any backend providing a camera
//! collection and a vector engine can be plugged in.

pub mod bridge;
pub mod calibration;
pub mod config;
pub mod device;
pub mod error;
pub mod pose;
pub mod properties;
pub mod pump;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude {
    pub mod v1 {
        pub use crate::{
            bridge::{PoseSink, TrackerBridge},
            calibration::ZeroReference,
            config::{LedChannel, MarkerGeometry, ScaleFactors, SessionConfig},
            device::{Axis, Camera, CameraCollection, DeviceProvider, Frame, VectorEngine},
            error::{Capability, DeviceError, Stage},
            pose::{euler_to_quaternion, Pose, RawSample},
            properties::{Properties, PropertyMut},
            session::{DeviceSession, SessionState},
        };
        pub use anyhow::{anyhow, Error, Result};
    }
}
