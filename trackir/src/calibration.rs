//! # Zero-reference calibration

use crate::prelude::v1::*;
use crate::session::OpenDevice;
use log::*;
use std::ops::Deref;

/// Raw sample all subsequent readings are reported relative to.
///
/// Until the first calibration this is the all-zero sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ZeroReference(RawSample);

impl ZeroReference {
    /// Wait for the next frame and capture it as the zero reference.
    ///
    /// This spins on the camera until a frame arrives, with no timeout. If the very first poll
    /// fails the calibration is aborted, later failures are treated as no frame.
    ///
    /// # Arguments
    ///
    /// * `device` - open device to sample.
    /// * `last` - previous readings, kept for axes that fail to read. Updated in place.
    pub fn capture(device: &mut OpenDevice, last: &mut RawSample) -> Result<Self, DeviceError> {
        let mut spins = 0usize;

        let frame = loop {
            match device.poll_frame() {
                Ok(Some(frame)) => break frame,
                Ok(None) => {}
                Err(e) if spins == 0 => {
                    error!("Failed to get frame for zeroing: {e}");
                    return Err(DeviceError::StageFailed(Stage::AcquireFrame));
                }
                Err(e) => trace!("Frame poll failed while zeroing: {e}"),
            }

            spins += 1;
            std::hint::spin_loop();
        };

        device.read_sample(&frame, last);

        debug!("Captured zero reference after {spins} polls: {last:?}");

        Ok(Self(*last))
    }

    pub fn sample(&self) -> &RawSample {
        &self.0
    }
}

impl Deref for ZeroReference {
    type Target = RawSample;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DeviceSession;
    use crate::testing::stub;

    #[test]
    fn waits_for_frame() {
        let (provider, state) = stub(1);
        let mut session = DeviceSession::new(provider, Default::default());
        session.open(Default::default()).unwrap();
        {
            let mut state = state.borrow_mut();
            state.empty_polls = 100;
            state
                .frames
                .push_back(RawSample::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        }

        let mut last = RawSample::default();
        let zero = ZeroReference::capture(session.device_mut().unwrap(), &mut last).unwrap();

        assert_eq!(zero.x, 10.0);
        let state = state.borrow();
        assert_eq!(state.polls, 101);
        assert_eq!(state.frames_outstanding(), 0);
    }

    #[test]
    fn poll_failure_aborts() {
        let (provider, state) = stub(1);
        let mut session = DeviceSession::new(provider, Default::default());
        session.open(Default::default()).unwrap();
        state.borrow_mut().fail = Some("camera.get_frame");

        let mut last = RawSample::default();
        assert!(matches!(
            ZeroReference::capture(session.device_mut().unwrap(), &mut last),
            Err(DeviceError::StageFailed(Stage::AcquireFrame))
        ));
        assert_eq!(state.borrow().polls, 1);
    }

    #[test]
    fn failure_while_waiting_keeps_spinning() {
        let (provider, state) = stub(1);
        let mut session = DeviceSession::new(provider, Default::default());
        session.open(Default::default()).unwrap();
        {
            let mut state = state.borrow_mut();
            state.empty_polls = 2;
            state.failing_polls = vec![3];
            state
                .frames
                .push_back(RawSample::new(10.0, 0.0, 0.0, 0.0, 0.0, 0.0));
        }

        let mut last = RawSample::default();
        let zero = ZeroReference::capture(session.device_mut().unwrap(), &mut last).unwrap();

        assert_eq!(zero.x, 10.0);
        let state = state.borrow();
        assert_eq!(state.polls, 4);
        assert_eq!(state.frames_outstanding(), 0);
    }
}
