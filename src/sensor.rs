use crate::Temperature;
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

pub trait Sensor {
    type Error: Debug;

    /// Starts a conversion, returns the milliseconds required to wait until
    /// the measurement finished
    fn start_measurement(&mut self, delay: &mut impl DelayNs) -> Result<u32, Self::Error>;

    /// Returns the measured value in degrees Celsius
    fn read_measurement(&mut self, delay: &mut impl DelayNs) -> Result<f32, Self::Error> {
        self.read_measurement_raw(delay).map(|t| t.celsius())
    }

    fn read_measurement_raw(&mut self, delay: &mut impl DelayNs)
        -> Result<Temperature, Self::Error>;
}

/// Runs one full measurement cycle.
///
/// `delay` times the protocol slots and must be accurate to a few
/// microseconds. `sleep` covers the conversion and should hand the processor
/// to other tasks. A failed start returns at once, without waiting.
pub async fn measure<S: Sensor>(
    sensor: &mut S,
    delay: &mut impl DelayNs,
    sleep: &mut impl AsyncDelayNs,
) -> Result<Temperature, S::Error> {
    let wait_ms = sensor.start_measurement(delay)?;
    sleep.delay_ms(wait_ms).await;
    sensor.read_measurement_raw(delay)
}
