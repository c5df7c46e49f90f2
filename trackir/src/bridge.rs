//! # Tracker bridge
//!
//! Ties the device session, frame pump, calibration and pose conversion together behind the
//! interface a polling host expects: construct once, call [`tick`](TrackerBridge::tick) on every
//! host update, drop on unload.

use crate::prelude::v1::*;
use crate::session::SessionState;
use log::*;

/// Receiver of reported poses.
pub trait PoseSink {
    fn send_pose(&mut self, pose: &Pose);
}

impl<F: FnMut(&Pose)> PoseSink for F {
    fn send_pose(&mut self, pose: &Pose) {
        self(pose)
    }
}

impl PoseSink for Vec<Pose> {
    fn send_pose(&mut self, pose: &Pose) {
        self.push(*pose)
    }
}

/// Mutable tracking state.
#[derive(Default)]
struct Tracking {
    zero: ZeroReference,
    /// Latest raw readings, kept across frames for lenient axis reads.
    raw: RawSample,
    /// Scaled, zero-relative axes last reported.
    axes: RawSample,
}

/// Head tracker publishing normalized poses to a [`PoseSink`].
///
/// The bridge is not reentrant. The host must serialize all calls, which any single-threaded
/// polling loop does.
pub struct TrackerBridge<P: DeviceProvider, S: PoseSink> {
    session: DeviceSession<P>,
    sink: S,
    tracking: Tracking,
}

impl<P: DeviceProvider, S: PoseSink> TrackerBridge<P, S> {
    /// Create a bridge without touching the device.
    ///
    /// # Arguments
    ///
    /// * `provider` - device backend.
    /// * `config` - session configuration used by [`start`](Self::start).
    /// * `sink` - receiver of every reported pose.
    pub fn new(provider: P, config: SessionConfig, sink: S) -> Self {
        Self {
            session: DeviceSession::new(provider, config),
            sink,
            tracking: Default::default(),
        }
    }

    /// Open the session, drop stale frames and calibrate.
    ///
    /// This is the usual load-time sequence. A failure here is not fatal, ticking a bridge that
    /// failed to start keeps retrying initialization.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        self.session.open(*self.session.config())?;
        self.flush();
        self.zero()
    }

    /// Open the session with the given scale factors.
    ///
    /// LED and marker settings come from the configuration the bridge was created with.
    pub fn open(&mut self, scale: ScaleFactors) -> Result<(), DeviceError> {
        let config = SessionConfig {
            scale,
            ..*self.session.config()
        };
        self.session.open(config)
    }

    pub fn close(&mut self) {
        self.session.close()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &DeviceSession<P> {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn zero_reference(&self) -> &ZeroReference {
        &self.tracking.zero
    }

    /// Pump one frame, re-initializing the session first if needed.
    ///
    /// Returns `None` when there is no frame, or when the session could not be opened.
    pub fn pump_one(&mut self) -> Option<RawSample> {
        if let Err(e) = self.session.ensure_open() {
            debug!("Cannot pump frame: {e}");
            return None;
        }

        let raw = &mut self.tracking.raw;
        self.session.device_mut()?.pump_one(raw)
    }

    /// Discard all frames buffered by the camera.
    ///
    /// Returns the number of frames discarded.
    pub fn flush(&mut self) -> usize {
        if let Err(e) = self.session.ensure_open() {
            debug!("Cannot flush frames: {e}");
            return 0;
        }

        self.session.device_mut().map(|d| d.flush()).unwrap_or(0)
    }

    /// Capture the current raw sample as the new zero reference.
    ///
    /// Blocks until the camera produces a frame.
    pub fn zero(&mut self) -> Result<(), DeviceError> {
        self.session.ensure_open()?;

        let device = match self.session.device_mut() {
            Some(device) => device,
            None => return Err(DeviceError::StageFailed(Stage::AcquireFrame)),
        };

        self.tracking.zero = ZeroReference::capture(device, &mut self.tracking.raw)?;

        info!("Zero reference set");

        Ok(())
    }

    /// Produce and publish the pose for this host tick.
    ///
    /// Exactly one pose is sent to the sink per call:
    ///
    /// * with a frame, the scaled delta from the zero reference;
    /// * without a frame, the centered pose;
    /// * while uninitialized, initialization is retried and the previously held pose is reported.
    pub fn tick(&mut self) -> Pose {
        if self.session.is_open() {
            self.tracking.axes = match self.pump_one() {
                Some(raw) => raw.relative_to(&self.tracking.zero, &self.session.config().scale),
                None => RawSample::default(),
            };
        } else if let Err(e) = self.session.ensure_open() {
            trace!("Tracker still unavailable: {e}");
        }

        let pose = Pose::from_axes(&self.tracking.axes);
        self.sink.send_pose(&pose);
        pose
    }
}
