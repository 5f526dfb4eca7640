//! Media-acquisition collaborator interface.
//!
//! The core performs exactly one camera and one microphone request per
//! session and never retries; any failure switches the run to simulated
//! sampling for its remainder.

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("permission denied for {device}")]
    PermissionDenied { device: &'static str },
    #[error("no {device} device available")]
    DeviceUnavailable { device: &'static str },
    #[error("media capture is not supported on this platform")]
    Unsupported,
}

/// Requested capture parameters, mirroring getUserMedia-style constraints.
#[derive(Debug, Clone)]
pub struct MediaConstraints {
    pub width: u32,
    pub height: u32,
    pub echo_cancellation: bool,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            echo_cancellation: true,
        }
    }
}

/// Handle to an acquired device stream. Dropping it releases the device.
#[derive(Debug)]
pub struct MediaStream {
    label: String,
}

impl MediaStream {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        debug!("released media stream '{}'", self.label);
    }
}

/// Device-access collaborator injected into the controller.
pub trait MediaGateway: Send + Sync {
    fn request_camera(&self, constraints: &MediaConstraints) -> Result<MediaStream, MediaError>;
    fn request_microphone(&self, constraints: &MediaConstraints)
        -> Result<MediaStream, MediaError>;
}

/// Default gateway for environments without capture devices. Every request
/// fails, which sends the session straight into demo mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedGateway;

impl MediaGateway for SimulatedGateway {
    fn request_camera(&self, _constraints: &MediaConstraints) -> Result<MediaStream, MediaError> {
        Err(MediaError::DeviceUnavailable { device: "camera" })
    }

    fn request_microphone(
        &self,
        _constraints: &MediaConstraints,
    ) -> Result<MediaStream, MediaError> {
        Err(MediaError::DeviceUnavailable {
            device: "microphone",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_gateway_reports_unavailable_devices() {
        let gateway = SimulatedGateway;
        let constraints = MediaConstraints::default();
        assert!(matches!(
            gateway.request_camera(&constraints),
            Err(MediaError::DeviceUnavailable { device: "camera" })
        ));
        assert!(matches!(
            gateway.request_microphone(&constraints),
            Err(MediaError::DeviceUnavailable { device: "microphone" })
        ));
    }
}
