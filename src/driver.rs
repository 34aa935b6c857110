use crate::{Command, Error, IoWire, OpCode, Timing};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

/// Bit-banged OneWire controller for a line with a single responder.
///
/// None of the primitives mask interrupts on their own. Wrap every
/// reset/select/command/read sequence in [`Driver::critical`].
pub struct Driver<W: IoWire> {
    io_wire: W,
    timing: Timing,
}

impl<E: Debug, W: IoWire<Error = E>> Driver<W> {
    pub fn new(io_wire: W, timing: Timing) -> Self {
        Driver { io_wire, timing }
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Destroy the driver, return the wire.
    pub fn destroy(self) -> W {
        self.io_wire
    }

    /// Runs `f` with preemption and interrupts suppressed.
    ///
    /// The section is left when `f` returns, on the error path too.
    pub fn critical<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        critical_section::with(|_| f(self))
    }

    pub fn reset_skip_write_only(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
    ) -> Result<(), Error<E>> {
        self.reset(delay)?;
        self.skip(delay)?;
        self.write_bytes(delay, write)?;
        Ok(())
    }

    pub fn reset_skip_write_read(
        &mut self,
        delay: &mut impl DelayNs,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<E>> {
        self.reset(delay)?;
        self.skip(delay)?;
        self.write_bytes(delay, write)?;
        self.read_bytes(delay, read)?;
        Ok(())
    }

    /// Addresses every device on the line, valid with exactly one responder
    pub fn skip(&mut self, delay: &mut impl DelayNs) -> Result<(), E> {
        self.write_command(delay, Command::SkipRom)
    }

    /// Performs a reset and fails with `Error::NoPresence` if nothing answered
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<E>> {
        if self.reset_presence(delay)? {
            Ok(())
        } else {
            Err(Error::NoPresence)
        }
    }

    /// Performs a reset and listens for a presence pulse.
    ///
    /// The line is sampled once, at the end of the presence window: low means
    /// a responder is pulling it down.
    pub fn reset_presence(&mut self, delay: &mut impl DelayNs) -> Result<bool, E> {
        let timing = self.timing;
        self.set_low()?;
        delay.delay_us(timing.reset_low_us);
        self.release()?;
        delay.delay_us(timing.presence_sample_us);
        let presence = self.is_low()?;
        delay.delay_us(timing.reset_recovery_us);
        if presence {
            trace!("onewire: presence pulse");
        } else {
            debug!("onewire: no presence pulse");
        }
        Ok(presence)
    }

    pub fn read_bytes(&mut self, delay: &mut impl DelayNs, dst: &mut [u8]) -> Result<(), E> {
        for d in dst {
            *d = self.read_byte(delay)?;
        }
        Ok(())
    }

    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, E> {
        let mut byte = 0_u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit(delay)? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    pub fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, E> {
        let timing = self.timing;
        self.set_low()?;
        delay.delay_us(timing.read_init_low_us);
        self.release()?;
        delay.delay_us(timing.read_sample_us);
        let val = self.is_high();
        delay.delay_us(timing.read_recovery_us);
        val
    }

    pub fn write_command(&mut self, delay: &mut impl DelayNs, cmd: impl OpCode) -> Result<(), E> {
        self.write_byte(delay, cmd.op_code())
    }

    pub fn write_bytes(&mut self, delay: &mut impl DelayNs, bytes: &[u8]) -> Result<(), E> {
        for b in bytes {
            self.write_byte(delay, *b)?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), E> {
        let mut byte = byte;
        for _ in 0..8 {
            self.write_bit(delay, (byte & 0x01) == 0x01)?;
            byte >>= 1;
        }
        Ok(())
    }

    pub fn write_bit(&mut self, delay: &mut impl DelayNs, high: bool) -> Result<(), E> {
        let timing = self.timing;
        let (low_us, recovery_us) = if high {
            (timing.write_one_low_us, timing.write_one_recovery_us)
        } else {
            (timing.write_zero_low_us, timing.write_zero_recovery_us)
        };
        self.set_low()?;
        delay.delay_us(low_us);
        self.release()?;
        delay.delay_us(recovery_us);
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn set_low(&mut self) -> Result<(), E> {
        self.io_wire.set_low()
    }

    #[inline(always)]
    pub(crate) fn release(&mut self) -> Result<(), E> {
        self.io_wire.release()
    }

    #[inline(always)]
    pub(crate) fn is_high(&mut self) -> Result<bool, E> {
        self.io_wire.is_high()
    }

    #[inline(always)]
    pub(crate) fn is_low(&mut self) -> Result<bool, E> {
        self.io_wire.is_low()
    }
}
