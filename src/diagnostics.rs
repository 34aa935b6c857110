//! Failure patterns recognised from one set of readings.

use crate::Temperature;

/// Alert and state thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Air at or below this is considered cold enough
    pub air_warm_celsius: f32,
    /// Evaporator coil below this is considered frozen over
    pub coil_frozen_celsius: f32,
    /// Motor current above this means the compressor is running
    pub motor_running_amps: f32,
}

impl Thresholds {
    pub const DEFAULT: Thresholds = Thresholds {
        air_warm_celsius: 8.0,
        coil_frozen_celsius: -18.0,
        motor_running_amps: 0.5,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alert {
    /// The coil is very cold but the air stays warm: ice insulates the
    /// evaporator and blocks the airflow
    IceBlockage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    Running,
    Standby,
}

/// Ice blockage needs both probes; a missing reading never raises the alert.
pub fn ice_blockage(
    thresholds: &Thresholds,
    air: Option<Temperature>,
    coil: Option<Temperature>,
) -> Option<Alert> {
    let (air, coil) = (air?.celsius(), coil?.celsius());
    (coil < thresholds.coil_frozen_celsius && air > thresholds.air_warm_celsius)
        .then_some(Alert::IceBlockage)
}

pub fn motor_state(thresholds: &Thresholds, amperes: f32) -> MotorState {
    if amperes > thresholds.motor_running_amps {
        MotorState::Running
    } else {
        MotorState::Standby
    }
}
