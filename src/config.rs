/// Slot timings of the standard-speed OneWire protocol, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Length of the reset pulse
    pub reset_low_us: u32,
    /// Time from releasing the reset pulse to sampling the presence pulse
    pub presence_sample_us: u32,
    /// Bus settle time after the presence sample
    pub reset_recovery_us: u32,
    /// Low time of a `1` write slot
    pub write_one_low_us: u32,
    /// Release time closing a `1` write slot
    pub write_one_recovery_us: u32,
    /// Low time of a `0` write slot
    pub write_zero_low_us: u32,
    /// Release time closing a `0` write slot
    pub write_zero_recovery_us: u32,
    /// Low time starting a read slot
    pub read_init_low_us: u32,
    /// Time from release to sampling a read slot
    pub read_sample_us: u32,
    /// Rest of the read slot after the sample
    pub read_recovery_us: u32,
}

impl Timing {
    pub const STANDARD: Timing = Timing {
        reset_low_us: 480,
        presence_sample_us: 60,
        reset_recovery_us: 480,
        write_one_low_us: 1,
        write_one_recovery_us: 60,
        write_zero_low_us: 60,
        write_zero_recovery_us: 1,
        read_init_low_us: 1,
        read_sample_us: 10,
        read_recovery_us: 50,
    };

    /// Length of the full write slot for the given bit
    pub const fn write_slot_us(&self, bit: bool) -> u32 {
        if bit {
            self.write_one_low_us + self.write_one_recovery_us
        } else {
            self.write_zero_low_us + self.write_zero_recovery_us
        }
    }

    /// Length of the full read slot
    pub const fn read_slot_us(&self) -> u32 {
        self.read_init_low_us + self.read_sample_us + self.read_recovery_us
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Per-probe configuration, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub timing: Timing,
    /// Wait between Convert T and Read Scratchpad. 750 ms covers a 12 bit
    /// conversion, the power-on resolution.
    pub conversion_time_ms: u32,
}

impl Config {
    pub const DEFAULT: Config = Config {
        timing: Timing::STANDARD,
        conversion_time_ms: 750,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}
