use std::fmt;

/// ROM code of a device on the one-wire bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(u64);

impl DeviceId {
    pub const fn new(rom: u64) -> Self {
        Self(rom)
    }

    pub const fn rom(self) -> u64 {
        self.0
    }

    /// Family code sits in the least significant byte of the ROM.
    pub const fn family_code(self) -> u8 {
        (self.0 & 0xFF) as u8
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub device: DeviceId,
    pub celsius: Option<f32>,
}

impl TemperatureReading {
    pub fn fahrenheit(&self) -> Option<f32> {
        self.celsius.map(celsius_to_fahrenheit)
    }
}

/// Outcome of the startup join. Captured once and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionState {
    pub joined: bool,
    pub address: Option<String>,
}

impl ConnectionState {
    pub fn joined(address: Option<String>) -> Self {
        Self {
            joined: true,
            address,
        }
    }

    pub fn failed() -> Self {
        Self {
            joined: false,
            address: None,
        }
    }
}

pub fn celsius_to_fahrenheit(temp_c: f32) -> f32 {
    temp_c * 9.0 / 5.0 + 32.0
}
