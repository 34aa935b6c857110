use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

use crate::{celsius_or_sentinel, measure, Config, Driver, Error, IoWire, OpCode, Sensor, Temperature};
use core::fmt::Debug;

#[derive(Clone, Copy, Debug)]
#[repr(u8)]
pub enum Command {
    Convert = 0x44,
    ReadScratchpad = 0xBE,
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

/// DS18B20 thermometer, alone on its line.
///
/// Owns the line: every operation takes `&mut self`, so no two transactions
/// can interleave on the same wire.
pub struct Ds18b20<W: IoWire> {
    driver: Driver<W>,
    conversion_time_ms: u32,
}

impl<E: Debug, W: IoWire<Error = E>> Ds18b20<W> {
    pub fn new(io_wire: W, config: Config) -> Self {
        Ds18b20 {
            driver: Driver::new(io_wire, config.timing),
            conversion_time_ms: config.conversion_time_ms,
        }
    }

    /// Destroy the sensor instance, return the wire.
    pub fn destroy(self) -> W {
        self.driver.destroy()
    }

    /// Reset, Skip ROM, Convert T as one uninterruptible sequence.
    /// Returns the conversion time to wait before reading.
    pub fn measure_temperature(&mut self, delay: &mut impl DelayNs) -> Result<u32, Error<E>> {
        self.driver.critical(|driver| {
            driver.reset_skip_write_only(delay, &[Command::Convert.op_code()])
        })?;
        Ok(self.conversion_time_ms)
    }

    /// Reset, Skip ROM, Read Scratchpad and the two temperature bytes as one
    /// uninterruptible sequence. The rest of the scratchpad is not read.
    pub fn read_temperature(&mut self, delay: &mut impl DelayNs) -> Result<Temperature, Error<E>> {
        let mut scratchpad = [0u8; 2];
        self.driver.critical(|driver| {
            driver.reset_skip_write_read(
                delay,
                &[Command::ReadScratchpad.op_code()],
                &mut scratchpad,
            )
        })?;
        Ok(Temperature::from_scratchpad(&scratchpad))
    }

    /// Full cycle, degrees Celsius or [`Temperature::SENTINEL_CELSIUS`].
    pub async fn read_celsius(
        &mut self,
        delay: &mut impl DelayNs,
        sleep: &mut impl AsyncDelayNs,
    ) -> f32 {
        let reading = measure(self, delay, sleep).await;
        match &reading {
            Err(Error::NoPresence) => warn!("ds18b20: no presence pulse"),
            Err(Error::PortError(_)) => error!("ds18b20: pin error"),
            Ok(_) => {}
        }
        celsius_or_sentinel(&reading)
    }
}

impl<E: Debug, W: IoWire<Error = E>> Sensor for Ds18b20<W> {
    type Error = Error<E>;

    fn start_measurement(&mut self, delay: &mut impl DelayNs) -> Result<u32, Self::Error> {
        self.measure_temperature(delay)
    }

    fn read_measurement_raw(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<Temperature, Self::Error> {
        self.read_temperature(delay)
    }
}
