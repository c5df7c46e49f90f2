//! # Simulated TrackIR device
//!
//! This backend pretends to be a camera watching a three-point marker clipped to a swaying head.
//! Frames are produced at a fixed rate, may be lost to occlusion, and can start out with a backlog
//! of stale frames, which makes it useful for exercising the bridge without hardware.

use log::*;
use rand::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use trackir::prelude::v1::*;

/// Simulation parameters.
#[derive(Clone, Copy, Debug)]
pub struct SimSettings {
    /// Number of cameras reported by enumeration.
    pub cameras: usize,
    /// Frame rate of the camera.
    pub fps: f64,
    /// Probability of any single frame being lost.
    pub occlusion: f64,
    /// Amplitude of uniform noise added to every axis.
    pub noise: f64,
    /// Stale frames already buffered when the camera starts.
    pub backlog: usize,
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            cameras: 1,
            fps: 120.0,
            occlusion: 0.0,
            noise: 0.0,
            backlog: 0,
            seed: 0,
        }
    }
}

impl Properties for SimSettings {
    fn props_mut(&mut self) -> Vec<(&str, PropertyMut)> {
        vec![
            ("fps", PropertyMut::new(&mut self.fps, 1.0, 1000.0)),
            ("occlusion", PropertyMut::new(&mut self.occlusion, 0.0, 1.0)),
            ("noise", PropertyMut::new(&mut self.noise, 0.0, 10.0)),
        ]
    }
}

/// Marker pose at time `t` (in seconds).
///
/// The head sits half a meter in front of the camera and slowly looks around.
pub fn head_pose(t: f64) -> RawSample {
    RawSample::new(
        20.0 * (0.4 * t).sin(),
        10.0 * (0.6 * t).sin(),
        500.0 + 30.0 * (0.2 * t).sin(),
        30.0 * (0.5 * t).sin(),
        15.0 * (0.7 * t).sin(),
        5.0 * (0.3 * t).sin(),
    )
}

enum Clock {
    /// Wall clock, started when the camera starts.
    Realtime(Option<Instant>),
    /// Advances by a fixed step on every frame poll.
    Stepped { now: f64, step: f64 },
}

struct SimState {
    settings: SimSettings,
    clock: Clock,
    rng: StdRng,
    started: bool,
    /// Frames due since start, whether delivered or lost.
    produced: u64,
    backlog: usize,
    /// Capture time of the frame last handed out.
    current: Option<f64>,
    engine: Option<RawSample>,
    leds: [bool; 4],
    outstanding: usize,
}

impl SimState {
    fn now(&mut self) -> f64 {
        match &mut self.clock {
            Clock::Realtime(start) => start
                .get_or_insert_with(Instant::now)
                .elapsed()
                .as_secs_f64(),
            Clock::Stepped { now, step } => {
                *now += *step;
                *now
            }
        }
    }

    fn next_frame(&mut self) -> Option<f64> {
        if self.backlog > 0 {
            self.backlog -= 1;
            return Some(0.0);
        }

        let now = self.now();
        let due = (now * self.settings.fps).floor() as u64;

        while self.produced < due {
            self.produced += 1;
            if self.rng.gen::<f64>() >= self.settings.occlusion {
                return Some(self.produced as f64 / self.settings.fps);
            }
        }

        None
    }

    fn measure(&mut self, t: f64) -> RawSample {
        let mut sample = head_pose(t);
        let noise = self.settings.noise;
        if noise > 0.0 {
            for axis in Axis::ALL {
                sample[axis] += self.rng.gen_range(-noise..=noise);
            }
        }
        sample
    }
}

type Shared = Rc<RefCell<SimState>>;

/// Simulated device backend.
pub struct SimProvider {
    state: Shared,
}

impl SimProvider {
    /// Create a device that produces frames in real time.
    pub fn new(settings: SimSettings) -> Self {
        Self::with_clock(settings, Clock::Realtime(None))
    }

    /// Create a device whose clock advances by `step` seconds on every frame poll.
    ///
    /// This keeps the simulation deterministic regardless of how fast it is polled.
    pub fn stepped(settings: SimSettings, step: f64) -> Self {
        Self::with_clock(settings, Clock::Stepped { now: 0.0, step })
    }

    fn with_clock(settings: SimSettings, clock: Clock) -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                settings,
                clock,
                rng: StdRng::seed_from_u64(settings.seed),
                started: false,
                produced: 0,
                backlog: 0,
                current: None,
                engine: None,
                leds: [false; 4],
                outstanding: 0,
            })),
        }
    }

    /// States of the four LED channels.
    pub fn leds(&self) -> [bool; 4] {
        self.state.borrow().leds
    }

    /// Number of frames handed out and not yet released.
    pub fn outstanding_frames(&self) -> usize {
        self.state.borrow().outstanding
    }
}

impl DeviceProvider for SimProvider {
    fn create_camera_collection(&mut self) -> Result<Box<dyn CameraCollection>> {
        Ok(Box::new(SimCollection {
            state: self.state.clone(),
            count: 0,
        }))
    }

    fn create_vector(&mut self) -> Result<Box<dyn VectorEngine>> {
        Ok(Box::new(SimVector {
            state: self.state.clone(),
        }))
    }
}

struct SimCollection {
    state: Shared,
    count: usize,
}

impl CameraCollection for SimCollection {
    fn enumerate(&mut self) -> Result<()> {
        self.count = self.state.borrow().settings.cameras;
        debug!("Enumerated {} simulated cameras", self.count);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.count)
    }

    fn item(&mut self, index: usize) -> Result<Box<dyn Camera>> {
        if index >= self.count {
            return Err(anyhow!("camera index {index} out of range"));
        }

        Ok(Box::new(SimCamera {
            state: self.state.clone(),
            open: false,
        }))
    }
}

struct SimCamera {
    state: Shared,
    open: bool,
}

impl Camera for SimCamera {
    fn set_led(&mut self, channel: LedChannel, on: bool) -> Result<()> {
        let idx = LedChannel::ALL
            .iter()
            .position(|&c| c == channel)
            .ok_or_else(|| anyhow!("unknown LED channel"))?;
        self.state.borrow_mut().leds[idx] = on;
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if !self.open {
            return Err(anyhow!("camera is not open"));
        }

        let mut state = self.state.borrow_mut();
        state.started = true;
        state.produced = 0;
        state.backlog = state.settings.backlog;
        if let Clock::Realtime(start) = &mut state.clock {
            *start = Some(Instant::now());
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.state.borrow_mut().started = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn get_frame(&mut self) -> Result<Option<Box<dyn Frame>>> {
        let mut state = self.state.borrow_mut();

        if !state.started {
            return Err(anyhow!("camera is not started"));
        }

        Ok(state.next_frame().map(|t| {
            state.current = Some(t);
            state.outstanding += 1;
            trace!("Frame at {t:.3}s");
            Box::new(SimFrame {
                state: self.state.clone(),
                released: false,
            }) as Box<dyn Frame>
        }))
    }
}

struct SimFrame {
    state: Shared,
    released: bool,
}

impl Frame for SimFrame {
    fn release(&mut self) -> Result<()> {
        if self.released {
            return Err(anyhow!("frame released twice"));
        }
        self.released = true;
        self.state.borrow_mut().outstanding -= 1;
        Ok(())
    }
}

struct SimVector {
    state: Shared,
}

impl VectorEngine for SimVector {
    fn set_distances(&mut self, dist01: f64, dist02: f64, dist12: f64) -> Result<()> {
        debug!("Marker distances: {dist01} {dist02} {dist12}");
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.state.borrow_mut().engine = None;
        Ok(())
    }

    fn update(&mut self, _camera: &dyn Camera, _frame: &dyn Frame) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let t = state.current.ok_or_else(|| anyhow!("no frame"))?;
        let sample = state.measure(t);
        state.engine = Some(sample);
        Ok(())
    }

    fn get(&self, axis: Axis) -> Result<f64> {
        self.state
            .borrow()
            .engine
            .map(|s| s[axis])
            .ok_or_else(|| anyhow!("no pose computed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn backlog_is_flushed() {
        let settings = SimSettings {
            backlog: 8,
            ..Default::default()
        };
        // Clock never reaches the first live frame.
        let provider = SimProvider::stepped(settings, 0.0);
        let mut bridge = TrackerBridge::new(provider, Default::default(), vec![]);

        bridge.open(ScaleFactors::default()).unwrap();

        assert_eq!(bridge.flush(), 8);
        assert_eq!(bridge.session().provider().outstanding_frames(), 0);
    }

    #[test]
    fn tracks_head_motion() {
        let settings = SimSettings {
            fps: 100.0,
            ..Default::default()
        };
        // One frame every other poll.
        let provider = SimProvider::stepped(settings, 0.005);
        let mut bridge = TrackerBridge::new(provider, Default::default(), vec![]);

        bridge.start().unwrap();
        let zero = *bridge.zero_reference().sample();

        let mut live = 0;
        for _ in 0..200 {
            let pose = bridge.tick();
            if pose != Pose::centered() {
                live += 1;
            }
            assert_approx_eq!(pose.rotation.quaternion().norm(), 1.0, 1e-6);
            assert!(pose.translation.x.abs() <= 40.0 + zero.x.abs());
        }

        // Roughly every other tick has a frame, the rest report signal loss.
        assert!((90..=110).contains(&live), "{live}");
        assert_eq!(bridge.session().provider().outstanding_frames(), 0);
        assert_eq!(bridge.session().provider().leds(), [false, false, false, true]);

        bridge.close();
        assert_eq!(bridge.session().provider().leds(), [false; 4]);
    }

    #[test]
    fn occlusion_drops_frames() {
        let settings = SimSettings {
            fps: 100.0,
            occlusion: 0.5,
            seed: 7,
            ..Default::default()
        };
        let provider = SimProvider::stepped(settings, 0.01);
        let mut bridge = TrackerBridge::new(provider, Default::default(), vec![]);
        bridge.start().unwrap();

        let lost = (0..1000)
            .filter(|_| bridge.tick() == Pose::centered())
            .count();

        assert!((350..650).contains(&lost), "{lost}");
    }

    #[test]
    fn no_cameras() {
        let settings = SimSettings {
            cameras: 0,
            ..Default::default()
        };
        let mut bridge = TrackerBridge::new(SimProvider::new(settings), Default::default(), vec![]);

        assert!(matches!(bridge.start(), Err(DeviceError::NoCameraFound)));
        assert_eq!(bridge.tick(), Pose::centered());
    }

    #[test]
    fn properties() {
        let mut settings = SimSettings::default();
        settings.parse_prop("occlusion", "0.25").unwrap();
        assert_eq!(settings.occlusion, 0.25);
        assert!(settings.parse_prop("occlusion", "2").is_err());
    }
}
