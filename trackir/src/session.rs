//! # Device session
//!
//! Owns the capability objects of one camera and brings them up or down as a unit.

use crate::prelude::v1::*;
use log::*;

/// Whether the device is currently usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
}

/// Capability objects of an open session.
///
/// Fields are declared in release order.
pub struct OpenDevice {
    pub(crate) camera: Box<dyn Camera>,
    pub(crate) vector: Box<dyn VectorEngine>,
    pub(crate) collection: Box<dyn CameraCollection>,
}

/// Camera session on top of a [`DeviceProvider`].
///
/// The session is closed when dropped.
pub struct DeviceSession<P: DeviceProvider> {
    provider: P,
    device: Option<OpenDevice>,
    config: SessionConfig,
}

fn stage<T>(res: Result<T>, stage: Stage) -> Result<T, DeviceError> {
    res.map_err(|e| {
        error!("Error initializing TrackIR: {stage} failed: {e}");
        DeviceError::StageFailed(stage)
    })
}

impl<P: DeviceProvider> DeviceSession<P> {
    /// Create a closed session.
    ///
    /// `config` is remembered for implicit re-initialization, see
    /// [`ensure_open`](Self::ensure_open).
    pub fn new(provider: P, config: SessionConfig) -> Self {
        Self {
            provider,
            device: None,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.device {
            Some(_) => SessionState::Initialized,
            None => SessionState::Uninitialized,
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Configuration of the current (or last) session.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub(crate) fn device_mut(&mut self) -> Option<&mut OpenDevice> {
        self.device.as_mut()
    }

    /// Bring up the camera.
    ///
    /// Creates the camera collection and vector objects, selects the first camera, sets the LEDs,
    /// then opens and starts the camera. Does nothing if the session is already open.
    ///
    /// On failure everything acquired so far is released, but no stop or close calls are made.
    pub fn open(&mut self, config: SessionConfig) -> Result<(), DeviceError> {
        if self.device.is_some() {
            return Ok(());
        }

        info!("Initializing TrackIR...");

        let device = Self::bring_up(&mut self.provider, &config)?;

        let s = &config.scale;
        info!(
            "Scaling factors: (x, y, z) = ({}, {}, {}), (yaw, pitch, roll) = ({}, {}, {})",
            s.x, s.y, s.z, s.yaw, s.pitch, s.roll
        );
        info!("TrackIR initialized successfully");

        self.device = Some(device);
        self.config = config;

        Ok(())
    }

    fn bring_up(
        provider: &mut P,
        config: &SessionConfig,
    ) -> Result<OpenDevice, DeviceError> {
        let mut collection = provider.create_camera_collection().map_err(|e| {
            error!("Error initializing TrackIR: create camera collection failed: {e}");
            DeviceError::CapabilityUnavailable(Capability::CameraCollection)
        })?;

        let mut vector = provider.create_vector().map_err(|e| {
            error!("Error initializing TrackIR: create vector failed: {e}");
            DeviceError::CapabilityUnavailable(Capability::Vector)
        })?;

        let g = &config.geometry;
        if let Err(e) = vector.set_distances(g.dist01, g.dist02, g.dist12) {
            warn!("Failed to set marker distances: {e}");
        }

        stage(collection.enumerate(), Stage::Enumerate)?;

        if stage(collection.count(), Stage::Count)? < 1 {
            error!("Error initializing TrackIR: camera collection count smaller than 1");
            return Err(DeviceError::NoCameraFound);
        }

        let mut camera = stage(collection.item(0), Stage::SelectCamera)?;

        for channel in LedChannel::ALL {
            stage(
                camera.set_led(channel, channel == config.led),
                Stage::SetLed(channel),
            )?;
        }

        stage(camera.open(), Stage::OpenCamera)?;
        stage(camera.start(), Stage::StartCamera)?;
        stage(vector.reset(), Stage::ResetVector)?;

        Ok(OpenDevice {
            camera,
            vector,
            collection,
        })
    }

    /// Shut the camera down and release all capability objects.
    ///
    /// Failures are logged and otherwise ignored. Does nothing if the session is not open.
    pub fn close(&mut self) {
        let OpenDevice {
            mut camera,
            vector,
            collection,
        } = match self.device.take() {
            Some(device) => device,
            None => return,
        };

        if let Err(e) = camera.set_led(self.config.led, false) {
            warn!("Failed to turn off LED {}: {e}", self.config.led);
        }
        if let Err(e) = camera.stop() {
            warn!("Failed to stop camera: {e}");
        }
        if let Err(e) = camera.close() {
            warn!("Failed to close camera: {e}");
        }

        std::mem::drop(camera);
        std::mem::drop(vector);
        std::mem::drop(collection);

        info!("TrackIR shut down");
    }

    /// Open the session with default scale factors, unless it is already open.
    ///
    /// Every device-dependent operation goes through here, so using a closed session transparently
    /// re-initializes it. LED and marker settings of the last configuration are kept.
    pub fn ensure_open(&mut self) -> Result<(), DeviceError> {
        if self.device.is_some() {
            return Ok(());
        }

        debug!("Session not initialized, attempting recovery");

        self.open(self.config.with_default_scale())
    }
}

impl<P: DeviceProvider> Drop for DeviceSession<P> {
    fn drop(&mut self) {
        self.close();
    }
}
