#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

#[macro_use]
mod fmt;

mod command;
mod config;
pub mod current;
pub mod diagnostics;
mod driver;
#[cfg(feature = "ds18b20")]
pub mod ds18b20;
mod iowire;
pub mod monitor;
mod result;
mod sensor;
#[cfg(test)]
mod sim;
mod temperature;

pub use command::{Command, OpCode};
pub use config::{Config, Timing};
pub use driver::Driver;
#[cfg(feature = "ds18b20")]
pub use ds18b20::Ds18b20;
pub use iowire::IoWire;
pub use result::Error;
pub use sensor::{measure, Sensor};
pub use temperature::{celsius_or_sentinel, Temperature};
