//! # Session configuration

use crate::device::Axis;
use crate::properties::{Properties, PropertyMut};
use std::fmt;
use std::ops::Index;
use std::path::PathBuf;

/// Illumination output on the camera.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LedChannel {
    One,
    Two,
    Three,
    Four,
}

impl LedChannel {
    pub const ALL: [LedChannel; 4] = [Self::One, Self::Two, Self::Three, Self::Four];
}

/// Channel four drives the blue LEDs. The TrackClip Pro is self-lit, so the IR illuminator stays
/// off.
impl Default for LedChannel {
    fn default() -> Self {
        Self::Four
    }
}

impl fmt::Display for LedChannel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::One => "one",
            Self::Two => "two",
            Self::Three => "three",
            Self::Four => "four",
        })
    }
}

/// Inter-point distances of the three-point marker, in native distance units.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkerGeometry {
    pub dist01: f64,
    pub dist02: f64,
    pub dist12: f64,
}

/// TrackClip Pro layout.
impl Default for MarkerGeometry {
    fn default() -> Self {
        Self {
            dist01: 50.8,
            dist02: 190.5,
            dist12: 114.3,
        }
    }
}

/// Per-axis multipliers applied to zero-relative readings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl ScaleFactors {
    /// Create scale factors with every axis set to `k`.
    pub fn uniform(k: f64) -> Self {
        Self {
            x: k,
            y: k,
            z: k,
            yaw: k,
            pitch: k,
            roll: k,
        }
    }

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
}

impl Index<Axis> for ScaleFactors {
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

impl Properties for ScaleFactors {
    fn props_mut(&mut self) -> Vec<(&str, PropertyMut)> {
        vec![
            ("x_scale", PropertyMut::new(&mut self.x, -100.0, 100.0)),
            ("y_scale", PropertyMut::new(&mut self.y, -100.0, 100.0)),
            ("z_scale", PropertyMut::new(&mut self.z, -100.0, 100.0)),
            ("yaw_scale", PropertyMut::new(&mut self.yaw, -100.0, 100.0)),
            ("pitch_scale", PropertyMut::new(&mut self.pitch, -100.0, 100.0)),
            ("roll_scale", PropertyMut::new(&mut self.roll, -100.0, 100.0)),
        ]
    }
}

/// Everything needed to bring up a device session.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    pub scale: ScaleFactors,
    /// The single LED channel switched on while the session is open.
    pub led: LedChannel,
    pub geometry: MarkerGeometry,
}

impl SessionConfig {
    /// Same hardware setup, but with unit scale factors.
    ///
    /// This is what implicit re-initialization opens the device with.
    pub fn with_default_scale(&self) -> Self {
        Self {
            scale: ScaleFactors::default(),
            ..*self
        }
    }

    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trackir").join("config.json"))
    }
}

#[cfg(feature = "serde")]
impl SessionConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        serde_json::from_reader(std::io::BufReader::new(file)).map_err(Into::into)
    }

    /// Load configuration from `path`, or from [`default_path`](Self::default_path) if it exists.
    ///
    /// Falls back to defaults when no file is given and none exists at the default location.
    pub fn load_or_default(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => {
                    log::debug!("Loading configuration from {}", path.display());
                    Self::load(path)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Write configuration out as pretty JSON.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, self).map_err(Into::into)
    }
}
