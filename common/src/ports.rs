//! Capability interfaces for the peripherals the monitor drives.
//!
//! Each target binary plugs its own adapters in: ESP-IDF drivers on the
//! board, simulated devices on a desktop, fakes under test.

use std::{thread, time::Duration};

use crate::{config::NetworkConfig, error::HalError, types::DeviceId};

pub trait TemperatureBus {
    /// Enumerates temperature sensors on the bus, in discovery order.
    fn scan(&mut self) -> Result<Vec<DeviceId>, HalError>;

    /// Broadcasts a conversion command to every device. Does not wait for
    /// the conversion to finish.
    fn start_conversion(&mut self) -> Result<(), HalError>;

    /// Reads the scratchpad of one device. `None` when no valid conversion
    /// is available.
    fn read_temperature_c(&mut self, device: DeviceId) -> Option<f32>;
}

pub trait CharacterDisplay {
    fn clear(&mut self) -> Result<(), HalError>;
    fn write_text(&mut self, text: &str) -> Result<(), HalError>;
}

pub trait DigitalOutput {
    fn set_state(&mut self, on: bool) -> Result<(), HalError>;
}

pub trait NetworkLink {
    /// Starts joining the network. Returns false if the request itself was
    /// rejected by the stack.
    fn connect(&mut self, network: &NetworkConfig) -> bool;

    fn is_connected(&mut self) -> bool;

    fn local_address(&self) -> Option<String>;
}

pub trait Delay {
    fn delay_ms(&mut self, ms: u64);
}

/// Blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    fn delay_ms(&mut self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}
