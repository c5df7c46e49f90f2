//! Scripted in-memory device used by unit tests.

use crate::prelude::v1::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Default)]
pub struct StubState {
    pub camera_count: usize,
    /// Samples handed out as frames, one per poll.
    pub frames: VecDeque<RawSample>,
    /// Number of polls that report no frame before `frames` are served.
    pub empty_polls: usize,
    /// Samples that only show up once the camera has reported an empty buffer.
    pub after_empty: VecDeque<RawSample>,
    /// Call name that should fail, such as `"camera.open"`.
    pub fail: Option<&'static str>,
    /// Frame polls (counted from 1) that fail once.
    pub failing_polls: Vec<usize>,
    pub failing_axes: Vec<Axis>,
    pub fail_update: bool,
    /// Sample carried by the frame last handed out.
    pub current: Option<RawSample>,
    pub engine: RawSample,
    pub leds: [bool; 4],
    pub distances: Option<(f64, f64, f64)>,
    pub calls: Vec<&'static str>,
    pub polls: usize,
    pub frames_acquired: usize,
    pub frames_released: usize,
}

impl StubState {
    fn call(&mut self, name: &'static str) -> Result<()> {
        self.calls.push(name);
        if self.fail == Some(name) {
            Err(anyhow!("{name} failed"))
        } else {
            Ok(())
        }
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| **c == name).count()
    }

    pub fn frames_outstanding(&self) -> usize {
        self.frames_acquired - self.frames_released
    }
}

pub type Shared = Rc<RefCell<StubState>>;

pub struct StubProvider(pub Shared);

/// Create a stub device with `camera_count` attached cameras.
pub fn stub(camera_count: usize) -> (StubProvider, Shared) {
    let state = Rc::new(RefCell::new(StubState {
        camera_count,
        ..Default::default()
    }));
    (StubProvider(state.clone()), state)
}

impl DeviceProvider for StubProvider {
    fn create_camera_collection(&mut self) -> Result<Box<dyn CameraCollection>> {
        self.0.borrow_mut().call("collection.create")?;
        Ok(Box::new(StubCollection(self.0.clone())))
    }

    fn create_vector(&mut self) -> Result<Box<dyn VectorEngine>> {
        self.0.borrow_mut().call("vector.create")?;
        Ok(Box::new(StubVector(self.0.clone())))
    }
}

struct StubCollection(Shared);

impl Drop for StubCollection {
    fn drop(&mut self) {
        self.0.borrow_mut().calls.push("collection.release");
    }
}

impl CameraCollection for StubCollection {
    fn enumerate(&mut self) -> Result<()> {
        self.0.borrow_mut().call("collection.enumerate")
    }

    fn count(&self) -> Result<usize> {
        let mut state = self.0.borrow_mut();
        state.call("collection.count")?;
        Ok(state.camera_count)
    }

    fn item(&mut self, index: usize) -> Result<Box<dyn Camera>> {
        let mut state = self.0.borrow_mut();
        state.call("collection.item")?;
        if index >= state.camera_count {
            return Err(anyhow!("no camera at {index}"));
        }
        Ok(Box::new(StubCamera(self.0.clone())))
    }
}

struct StubCamera(Shared);

impl Drop for StubCamera {
    fn drop(&mut self) {
        self.0.borrow_mut().calls.push("camera.release");
    }
}

impl Camera for StubCamera {
    fn set_led(&mut self, channel: LedChannel, on: bool) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.call("camera.set_led")?;
        let idx = LedChannel::ALL.iter().position(|c| *c == channel).unwrap();
        state.leds[idx] = on;
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.0.borrow_mut().call("camera.open")
    }

    fn start(&mut self) -> Result<()> {
        self.0.borrow_mut().call("camera.start")
    }

    fn stop(&mut self) -> Result<()> {
        self.0.borrow_mut().call("camera.stop")
    }

    fn close(&mut self) -> Result<()> {
        self.0.borrow_mut().call("camera.close")
    }

    fn get_frame(&mut self) -> Result<Option<Box<dyn Frame>>> {
        let mut state = self.0.borrow_mut();
        state.polls += 1;
        if state.fail == Some("camera.get_frame") || state.failing_polls.contains(&state.polls) {
            return Err(anyhow!("camera.get_frame failed"));
        }
        if state.empty_polls > 0 {
            state.empty_polls -= 1;
            return Ok(None);
        }
        match state.frames.pop_front() {
            Some(sample) => {
                state.current = Some(sample);
                state.frames_acquired += 1;
                Ok(Some(Box::new(StubFrame(self.0.clone()))))
            }
            None => {
                let late = std::mem::take(&mut state.after_empty);
                state.frames.extend(late);
                Ok(None)
            }
        }
    }
}

struct StubFrame(Shared);

impl Frame for StubFrame {
    fn release(&mut self) -> Result<()> {
        self.0.borrow_mut().frames_released += 1;
        Ok(())
    }
}

struct StubVector(Shared);

impl Drop for StubVector {
    fn drop(&mut self) {
        self.0.borrow_mut().calls.push("vector.release");
    }
}

impl VectorEngine for StubVector {
    fn set_distances(&mut self, dist01: f64, dist02: f64, dist12: f64) -> Result<()> {
        let mut state = self.0.borrow_mut();
        state.call("vector.set_distances")?;
        state.distances = Some((dist01, dist02, dist12));
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.0.borrow_mut().call("vector.reset")
    }

    fn update(&mut self, _camera: &dyn Camera, _frame: &dyn Frame) -> Result<()> {
        let mut state = self.0.borrow_mut();
        if state.fail_update {
            return Err(anyhow!("vector.update failed"));
        }
        if let Some(sample) = state.current {
            state.engine = sample;
        }
        Ok(())
    }

    fn get(&self, axis: Axis) -> Result<f64> {
        let state = self.0.borrow();
        if state.failing_axes.contains(&axis) {
            Err(anyhow!("get {axis:?} failed"))
        } else {
            Ok(state.engine[axis])
        }
    }
}
