//! Polling task: reads every probe and the motor current, runs the
//! diagnostics and hands the result to a single consumer.
//!
//! The task owns the probes and therefore the lines. Readings leave it only
//! by value, through the report channel.

use crate::current::{rms_amperes, Ammeter, CurrentConfig, SAMPLES_PER_READING};
use crate::diagnostics::{ice_blockage, motor_state, Alert, MotorState, Thresholds};
use crate::{measure, Sensor, Temperature};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use embedded_hal::delay::DelayNs;
use embedded_hal_async::delay::DelayNs as AsyncDelayNs;

/// Channel carrying reports from the polling task to the publisher
pub type ReportChannel<const N: usize> = Channel<CriticalSectionRawMutex, Report, N>;

/// One polling cycle worth of readings. `None` marks a probe or ammeter that
/// failed this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub air: Option<Temperature>,
    pub coil: Option<Temperature>,
    pub cabinet: Option<Temperature>,
    pub amperes: Option<f32>,
    pub motor: Option<MotorState>,
    pub alert: Option<Alert>,
}

impl Report {
    /// Celsius for the wire format, the sentinel for a failed probe
    pub fn celsius(reading: Option<Temperature>) -> f32 {
        reading.map_or(Temperature::SENTINEL_CELSIUS, |t| t.celsius())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    pub thresholds: Thresholds,
    pub current: CurrentConfig,
    /// Pause between the end of one cycle and the start of the next
    pub poll_interval_ms: u32,
}

impl MonitorConfig {
    pub const DEFAULT: MonitorConfig = MonitorConfig {
        thresholds: Thresholds::DEFAULT,
        current: CurrentConfig::DEFAULT,
        poll_interval_ms: 10_000,
    };
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The three probes of the unit, one line each
pub struct Probes<S> {
    /// Cabinet air
    pub air: S,
    /// Evaporator coil
    pub coil: S,
    /// Static cabinet probe
    pub cabinet: S,
}

pub struct Monitor<S: Sensor, A: Ammeter> {
    probes: Probes<S>,
    ammeter: A,
    config: MonitorConfig,
    samples: [u16; SAMPLES_PER_READING],
}

impl<S: Sensor, A: Ammeter> Monitor<S, A> {
    pub fn new(probes: Probes<S>, ammeter: A, config: MonitorConfig) -> Self {
        Monitor {
            probes,
            ammeter,
            config,
            samples: [0; SAMPLES_PER_READING],
        }
    }

    /// Destroy the monitor, return the probes and the ammeter.
    pub fn destroy(self) -> (Probes<S>, A) {
        (self.probes, self.ammeter)
    }

    /// One cycle. Probes are measured one after the other; a failed probe is
    /// reported as `None` and does not stop the others.
    pub async fn poll(&mut self, delay: &mut impl DelayNs, sleep: &mut impl AsyncDelayNs) -> Report {
        let air = read_probe("air", &mut self.probes.air, delay, sleep).await;
        let coil = read_probe("coil", &mut self.probes.coil, delay, sleep).await;
        let cabinet = read_probe("cabinet", &mut self.probes.cabinet, delay, sleep).await;

        let amperes = match self.ammeter.sample(&mut self.samples) {
            Ok(()) => Some(rms_amperes(&self.config.current, &self.samples)),
            Err(_) => {
                warn!("monitor: ammeter read failed");
                None
            }
        };

        let thresholds = &self.config.thresholds;
        let motor = amperes.map(|a| motor_state(thresholds, a));
        let alert = ice_blockage(thresholds, air, coil);

        info!(
            "air: {} C | coil: {} C | cabinet: {} C | I: {} A",
            Report::celsius(air),
            Report::celsius(coil),
            Report::celsius(cabinet),
            amperes.unwrap_or(0.0),
        );
        match motor {
            Some(MotorState::Running) => debug!("monitor: motor running"),
            Some(MotorState::Standby) => debug!("monitor: motor standby"),
            None => {}
        }
        if alert.is_some() {
            error!("monitor: ice blockage detected");
        }

        Report {
            air,
            coil,
            cabinet,
            amperes,
            motor,
            alert,
        }
    }

    /// Polls forever, sending every report to `reports`. Waits for room in
    /// the channel rather than dropping a report.
    pub async fn run<const N: usize>(
        &mut self,
        delay: &mut impl DelayNs,
        sleep: &mut impl AsyncDelayNs,
        reports: Sender<'_, CriticalSectionRawMutex, Report, N>,
    ) {
        loop {
            let report = self.poll(delay, sleep).await;
            reports.send(report).await;
            sleep.delay_ms(self.config.poll_interval_ms).await;
        }
    }
}

async fn read_probe<S: Sensor>(
    name: &str,
    probe: &mut S,
    delay: &mut impl DelayNs,
    sleep: &mut impl AsyncDelayNs,
) -> Option<Temperature> {
    match measure(probe, delay, sleep).await {
        Ok(t) => Some(t),
        Err(_) => {
            warn!("monitor: {} probe did not answer", name);
            None
        }
    }
}
