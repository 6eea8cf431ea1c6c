// PunchWatch — Raw Acquisition boundary

use crate::error::AcquisitionError;

/// Source of raw multi-channel readings (the IMU on the device, scripted data in tests).
pub trait SensorSource {
    /// Fill `out` with one raw value per channel. Retrying is up to the implementor.
    fn read(&mut self, out: &mut [f32]) -> Result<(), AcquisitionError>;
}

