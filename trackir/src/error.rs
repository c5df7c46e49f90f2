//! # Device session errors

use std::fmt;

/// Capability objects the session has to create before touching the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    CameraCollection,
    Vector,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CameraCollection => f.write_str("camera collection"),
            Self::Vector => f.write_str("vector"),
        }
    }
}

/// Individual steps of bringing up (or sampling) the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Enumerate,
    Count,
    SelectCamera,
    SetLed(crate::config::LedChannel),
    OpenCamera,
    StartCamera,
    ResetVector,
    AcquireFrame,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Enumerate => f.write_str("cameras enumeration"),
            Self::Count => f.write_str("get count of camera collection"),
            Self::SelectCamera => f.write_str("get first camera"),
            Self::SetLed(channel) => write!(f, "set LED {channel}"),
            Self::OpenCamera => f.write_str("open camera"),
            Self::StartCamera => f.write_str("start camera"),
            Self::ResetVector => f.write_str("reset vector"),
            Self::AcquireFrame => f.write_str("acquire frame"),
        }
    }
}

/// Errors reported by session bring-up and calibration.
///
/// None of these are fatal to the process. The caller may retry later, and the bridge does so
/// implicitly whenever it is used while uninitialized.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to create {0}")]
    CapabilityUnavailable(Capability),

    #[error("camera collection contains no cameras")]
    NoCameraFound,

    #[error("{0} failed")]
    StageFailed(Stage),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedChannel;

    #[test]
    fn messages_name_the_stage() {
        assert_eq!(
            DeviceError::StageFailed(Stage::SetLed(LedChannel::Four)).to_string(),
            "set LED four failed"
        );
        assert_eq!(
            DeviceError::CapabilityUnavailable(Capability::Vector).to_string(),
            "failed to create vector"
        );
    }
}
