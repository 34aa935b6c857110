//! Simulated OneWire bus for host tests.
//!
//! A virtual clock advances only through [`SimDelay`]. The responder decodes
//! write slots from the length of the low pulse and answers read slots by
//! holding the line low, the way a real device does.

use crate::IoWire;
use core::convert::Infallible;
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

const NS_PER_US: u64 = 1_000;
const RESET_MIN_NS: u64 = 480 * NS_PER_US;
const WRITE_ONE_MAX_NS: u64 = 15 * NS_PER_US;
const PRESENCE_DELAY_NS: u64 = 15 * NS_PER_US;
const PRESENCE_LEN_NS: u64 = 120 * NS_PER_US;
const READ_ZERO_HOLD_NS: u64 = 30 * NS_PER_US;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Responder {
    /// Nothing on the line
    Absent,
    /// Answers resets and records writes. [`Sim::replay_last`] plays the
    /// last written byte back on the following read slots
    Echo,
    /// Thermometer answering Skip ROM, Convert T and Read Scratchpad
    Ds18b20 { scratchpad: [u8; 9] },
}

impl Responder {
    pub(crate) fn ds18b20(low: u8, high: u8) -> Self {
        Responder::Ds18b20 {
            scratchpad: [low, high, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0x00],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Rom,
    Function,
    Idle,
}

#[derive(Debug)]
pub(crate) struct Bus {
    pub now_ns: u64,
    pub ops: u32,
    pub resets: u32,
    pub conversions: u32,
    pub scratchpad_reads: u32,
    pub written: Vec<u8>,
    responder: Responder,
    master_low_since: Option<u64>,
    responder_low: Option<(u64, u64)>,
    read_slot: bool,
    rx_byte: u8,
    rx_bits: u8,
    tx: VecDeque<bool>,
    phase: Phase,
}

impl Bus {
    fn new(responder: Responder) -> Self {
        Bus {
            now_ns: 0,
            ops: 0,
            resets: 0,
            conversions: 0,
            scratchpad_reads: 0,
            written: Vec::new(),
            responder,
            master_low_since: None,
            responder_low: None,
            read_slot: false,
            rx_byte: 0,
            rx_bits: 0,
            tx: VecDeque::new(),
            phase: Phase::Idle,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.master_low_since.is_none()
    }

    fn line_is_low(&self) -> bool {
        let held = self
            .responder_low
            .map_or(false, |(from, to)| (from..to).contains(&self.now_ns));
        self.master_low_since.is_some() || held
    }

    fn pull_low(&mut self) {
        if self.master_low_since.is_some() {
            return;
        }
        self.master_low_since = Some(self.now_ns);
        if let Some(bit) = self.tx.pop_front() {
            self.read_slot = true;
            if !bit {
                self.responder_low = Some((self.now_ns, self.now_ns + READ_ZERO_HOLD_NS));
            }
        }
    }

    fn release(&mut self) {
        let Some(since) = self.master_low_since.take() else {
            return;
        };
        let pulse = self.now_ns - since;
        if pulse >= RESET_MIN_NS {
            self.on_reset();
        } else if self.read_slot {
            self.read_slot = false;
        } else {
            self.on_bit(pulse < WRITE_ONE_MAX_NS);
        }
    }

    fn on_reset(&mut self) {
        self.resets += 1;
        self.rx_byte = 0;
        self.rx_bits = 0;
        self.tx.clear();
        self.read_slot = false;
        self.phase = Phase::Rom;
        self.responder_low = match self.responder {
            Responder::Absent => None,
            _ => {
                let from = self.now_ns + PRESENCE_DELAY_NS;
                Some((from, from + PRESENCE_LEN_NS))
            }
        };
    }

    fn on_bit(&mut self, bit: bool) {
        if bit {
            self.rx_byte |= 1 << self.rx_bits;
        }
        self.rx_bits += 1;
        if self.rx_bits == 8 {
            let byte = self.rx_byte;
            self.rx_byte = 0;
            self.rx_bits = 0;
            self.on_byte(byte);
        }
    }

    fn on_byte(&mut self, byte: u8) {
        self.written.push(byte);
        match self.responder {
            Responder::Absent | Responder::Echo => {}
            Responder::Ds18b20 { scratchpad } => {
                self.phase = match (self.phase, byte) {
                    (Phase::Rom, 0xCC) => Phase::Function,
                    (Phase::Function, 0x44) => {
                        self.conversions += 1;
                        Phase::Idle
                    }
                    (Phase::Function, 0xBE) => {
                        self.scratchpad_reads += 1;
                        self.queue(&scratchpad);
                        Phase::Idle
                    }
                    _ => Phase::Idle,
                };
            }
        }
    }

    fn queue(&mut self, bytes: &[u8]) {
        for byte in bytes {
            for i in 0..8 {
                self.tx.push_back(byte & (1 << i) != 0);
            }
        }
    }
}

pub(crate) struct Sim {
    bus: Rc<RefCell<Bus>>,
}

impl Sim {
    pub(crate) fn new(responder: Responder) -> Self {
        Sim {
            bus: Rc::new(RefCell::new(Bus::new(responder))),
        }
    }

    pub(crate) fn wire(&self) -> SimWire {
        SimWire {
            bus: self.bus.clone(),
        }
    }

    pub(crate) fn delay(&self) -> SimDelay {
        SimDelay {
            bus: self.bus.clone(),
        }
    }

    pub(crate) fn sleep(&self) -> SimSleep {
        SimSleep {
            bus: self.bus.clone(),
            slept_ns: Vec::new(),
            swap: None,
        }
    }

    /// Sleep that swaps the responder while the controller is waiting
    pub(crate) fn sleep_then(&self, responder: Responder) -> SimSleep {
        SimSleep {
            swap: Some(responder),
            ..self.sleep()
        }
    }

    pub(crate) fn bus(&self) -> std::cell::Ref<'_, Bus> {
        self.bus.borrow()
    }

    /// Queues the last written byte for the next read slots
    pub(crate) fn replay_last(&self) {
        let mut bus = self.bus.borrow_mut();
        if let Some(&byte) = bus.written.last() {
            bus.queue(&[byte]);
        }
    }
}

pub(crate) struct SimWire {
    bus: Rc<RefCell<Bus>>,
}

impl IoWire for SimWire {
    type Error = Infallible;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let mut bus = self.bus.borrow_mut();
        bus.ops += 1;
        Ok(!bus.line_is_low())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        bus.ops += 1;
        bus.pull_low();
        Ok(())
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        bus.ops += 1;
        bus.release();
        Ok(())
    }
}

/// Busy delay: advances the virtual clock
pub(crate) struct SimDelay {
    bus: Rc<RefCell<Bus>>,
}

impl embedded_hal::delay::DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.borrow_mut().now_ns += u64::from(ns);
    }
}

/// Cooperative delay: yields to the executor and checks that nothing touched
/// the line in the meantime
pub(crate) struct SimSleep {
    bus: Rc<RefCell<Bus>>,
    pub slept_ns: Vec<u64>,
    swap: Option<Responder>,
}

impl embedded_hal_async::delay::DelayNs for SimSleep {
    async fn delay_ns(&mut self, ns: u32) {
        let ops = {
            let bus = self.bus.borrow();
            assert!(bus.is_idle(), "line held low across the sleep");
            bus.ops
        };
        tokio::task::yield_now().await;
        let mut bus = self.bus.borrow_mut();
        assert_eq!(bus.ops, ops, "line touched during the sleep");
        if let Some(responder) = self.swap.take() {
            bus.responder = responder;
        }
        bus.now_ns += u64::from(ns);
        self.slept_ns.push(u64::from(ns));
    }
}
