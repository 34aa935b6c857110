use byteorder::{ByteOrder, LittleEndian};

/// Raw sensor temperature: a two's-complement count of 1/16 °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Temperature(i16);

impl Temperature {
    pub const CELSIUS_PER_BIT: f32 = 1.0 / 16.0;

    /// Reported in place of a reading when the probe did not answer.
    /// No probe can physically produce it.
    pub const SENTINEL_CELSIUS: f32 = -999.0;

    pub const fn from_raw(raw: i16) -> Self {
        Temperature(raw)
    }

    /// Combines the first two scratchpad bytes, low byte first.
    /// No range check: garbage in gives a plausible-looking value out.
    pub fn from_scratchpad(scratchpad: &[u8; 2]) -> Self {
        Temperature(LittleEndian::read_i16(scratchpad))
    }

    pub const fn raw(&self) -> i16 {
        self.0
    }

    pub fn celsius(&self) -> f32 {
        f32::from(self.0) * Self::CELSIUS_PER_BIT
    }

    /// Split into whole degrees and ten-thousandths, both carrying the sign.
    /// The value equals `integer + fraction / 10000`.
    pub fn split(&self) -> (i16, i16) {
        let raw = i32::from(self.0);
        let abs = raw.abs();
        let sign = raw.signum();
        ((sign * (abs >> 4)) as i16, (sign * (abs & 0xF) * 625) as i16)
    }
}

/// Celsius value of a reading, or [`Temperature::SENTINEL_CELSIUS`] if it failed
pub fn celsius_or_sentinel<E>(reading: &Result<Temperature, E>) -> f32 {
    match reading {
        Ok(t) => t.celsius(),
        Err(_) => Temperature::SENTINEL_CELSIUS,
    }
}
