//! # Frame pump
//!
//! Pulls frames out of the camera and turns them into raw samples.

use crate::prelude::v1::*;
use crate::session::OpenDevice;
use log::*;
use std::ops::Deref;

/// Frame that is released once it goes out of scope.
pub struct FrameGuard {
    frame: Box<dyn Frame>,
}

impl FrameGuard {
    pub fn new(frame: Box<dyn Frame>) -> Self {
        Self { frame }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if let Err(e) = self.frame.release() {
            warn!("Failed to release frame: {e}");
        }
    }
}

impl Deref for FrameGuard {
    type Target = dyn Frame;

    fn deref(&self) -> &Self::Target {
        &*self.frame
    }
}

impl OpenDevice {
    /// Poll the camera for a frame without waiting.
    pub fn poll_frame(&mut self) -> Result<Option<FrameGuard>> {
        Ok(self.camera.get_frame()?.map(FrameGuard::new))
    }

    /// Run the vector engine on `frame` and read the resulting axes into `sample`.
    ///
    /// This is lenient. If the update or an individual axis read fails, the affected axes keep
    /// the values already in `sample`.
    pub fn read_sample(&mut self, frame: &FrameGuard, sample: &mut RawSample) {
        if let Err(e) = self.vector.update(&*self.camera, &**frame) {
            trace!("Vector update failed: {e}");
        }

        for axis in Axis::ALL {
            match self.vector.get(axis) {
                Ok(v) => sample[axis] = v,
                Err(e) => trace!("Failed to read {axis:?}: {e}"),
            }
        }
    }

    /// Pump a single frame.
    ///
    /// `last` holds the previous readings, which are kept for any axis that fails to read. It is
    /// updated in place and returned.
    ///
    /// Returns `None` if the camera has no frame for us, including when polling fails.
    pub fn pump_one(&mut self, last: &mut RawSample) -> Option<RawSample> {
        let frame = match self.poll_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) => {
                debug!("Failed to get frame: {e}");
                return None;
            }
        };

        self.read_sample(&frame, last);

        Some(*last)
    }

    /// Discard all buffered frames.
    ///
    /// Returns the number of frames discarded. There is no upper bound, this stops as soon as the
    /// camera reports no frame.
    pub fn flush(&mut self) -> usize {
        let mut flushed = 0;

        while let Ok(Some(_)) = self.poll_frame() {
            flushed += 1;
        }

        debug!("Flushed {flushed} frames");

        flushed
    }
}
