//! Motor current from a current transformer module read through an ADC.
//!
//! The module outputs an AC voltage riding on a DC offset. The RMS of the
//! offset-free voltage divided by the module sensitivity gives amperes.

/// Calibration of the current sensing chain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentConfig {
    /// Volts per ampere of the module output
    pub sensitivity: f32,
    /// DC level of the output at zero current
    pub offset_volts: f32,
    /// ADC reference voltage
    pub reference_volts: f32,
    /// Largest raw ADC code
    pub full_scale: u16,
    /// Readings below this are noise and reported as zero
    pub noise_floor_amps: f32,
}

impl CurrentConfig {
    /// 12 bit ADC on 3.3 V with the module biased to mid-supply
    pub const DEFAULT: CurrentConfig = CurrentConfig {
        sensitivity: 0.185,
        offset_volts: 1.65,
        reference_volts: 3.3,
        full_scale: 4095,
        noise_floor_amps: 0.05,
    };

    pub fn volts(&self, raw: u16) -> f32 {
        f32::from(raw) * self.reference_volts / f32::from(self.full_scale)
    }
}

impl Default for CurrentConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Number of samples per burst: several mains cycles at 50 Hz
pub const SAMPLES_PER_READING: usize = 200;

/// RMS current of a burst of raw ADC codes. An empty burst reads as zero.
pub fn rms_amperes(config: &CurrentConfig, samples: &[u16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples
        .iter()
        .map(|&raw| {
            let volts = config.volts(raw) - config.offset_volts;
            volts * volts
        })
        .sum();
    let mean_square = sum_squares / samples.len() as f32;
    let amperes = sqrt(mean_square) / config.sensitivity;
    if amperes < config.noise_floor_amps {
        0.0
    } else {
        amperes
    }
}

/// Newton iteration, `core` has no float square root.
///
/// The first guess halves the exponent, so a handful of steps reaches full
/// precision over the whole `f32` range.
fn sqrt(value: f32) -> f32 {
    if value <= 0.0 {
        return 0.0;
    }
    let guess = f32::from_bits((value.to_bits() >> 1) + 0x1FC0_0000);
    // one step puts the estimate at or above the root, then it only falls
    let mut x = 0.5 * (guess + value / guess);
    for _ in 0..8 {
        let next = 0.5 * (x + value / x);
        if next >= x {
            break;
        }
        x = next;
    }
    x
}

/// Source of raw current samples.
pub trait Ammeter {
    type Error: core::fmt::Debug;

    /// Fills `samples` with one burst of raw ADC codes
    fn sample(&mut self, samples: &mut [u16]) -> Result<(), Self::Error>;
}
