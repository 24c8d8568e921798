use std::{
    collections::HashMap,
    io::{self, Read, Write},
};

use crate::{
    config::NetworkConfig,
    error::HalError,
    ports::{CharacterDisplay, Delay, DigitalOutput, NetworkLink, TemperatureBus},
    types::DeviceId,
};

#[derive(Debug, Default)]
pub struct FakeBus {
    order: Vec<DeviceId>,
    temps: HashMap<DeviceId, Option<f32>>,
    pub fail_scan: bool,
    pub fail_conversion: bool,
    pub conversions: usize,
    pub reads: Vec<DeviceId>,
}

impl FakeBus {
    pub fn with(devices: &[(DeviceId, Option<f32>)]) -> Self {
        Self {
            order: devices.iter().map(|(id, _)| *id).collect(),
            temps: devices.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl TemperatureBus for FakeBus {
    fn scan(&mut self) -> Result<Vec<DeviceId>, HalError> {
        if self.fail_scan {
            return Err(HalError::Bus("no presence pulse".to_string()));
        }
        Ok(self.order.clone())
    }

    fn start_conversion(&mut self) -> Result<(), HalError> {
        self.conversions += 1;
        if self.fail_conversion {
            return Err(HalError::Bus("bus held low".to_string()));
        }
        Ok(())
    }

    fn read_temperature_c(&mut self, device: DeviceId) -> Option<f32> {
        self.reads.push(device);
        self.temps.get(&device).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Write(String),
}

#[derive(Debug, Default)]
pub struct FakeDisplay {
    pub ops: Vec<DisplayOp>,
    pub fail: bool,
}

impl FakeDisplay {
    fn record(&mut self, op: DisplayOp) -> Result<(), HalError> {
        self.ops.push(op);
        if self.fail {
            return Err(HalError::Display("busy flag stuck".to_string()));
        }
        Ok(())
    }
}

impl CharacterDisplay for FakeDisplay {
    fn clear(&mut self) -> Result<(), HalError> {
        self.record(DisplayOp::Clear)
    }

    fn write_text(&mut self, text: &str) -> Result<(), HalError> {
        self.record(DisplayOp::Write(text.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct FakeOutput {
    pub states: Vec<bool>,
}

impl DigitalOutput for FakeOutput {
    fn set_state(&mut self, on: bool) -> Result<(), HalError> {
        self.states.push(on);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub calls: Vec<u64>,
}

impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u64) {
        self.calls.push(ms);
    }
}

/// Reports connected once `is_connected` has been polled more than
/// `up_after` times.
#[derive(Debug)]
pub struct FakeLink {
    up_after: Option<u32>,
    address: String,
    polls: u32,
    pub accept_connect: bool,
    pub connect_requests: Vec<String>,
}

impl FakeLink {
    pub fn never() -> Self {
        Self {
            up_after: None,
            address: String::new(),
            polls: 0,
            accept_connect: true,
            connect_requests: Vec::new(),
        }
    }

    pub fn after_polls(up_after: u32, address: &str) -> Self {
        Self {
            up_after: Some(up_after),
            address: address.to_string(),
            ..Self::never()
        }
    }
}

impl NetworkLink for FakeLink {
    fn connect(&mut self, network: &NetworkConfig) -> bool {
        self.connect_requests.push(network.wifi_ssid.clone());
        self.accept_connect
    }

    fn is_connected(&mut self) -> bool {
        self.polls += 1;
        self.up_after.is_some_and(|up_after| self.polls > up_after)
    }

    fn local_address(&self) -> Option<String> {
        Some(self.address.clone())
    }
}

/// In-memory connection: serves `input` to reads and captures writes.
#[derive(Debug, Default)]
pub struct FakeStream {
    input: Vec<u8>,
    cursor: usize,
    pub reads: usize,
    pub written: Vec<u8>,
    pub fail_writes: bool,
}

impl FakeStream {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

impl Read for FakeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let remaining = &self.input[self.cursor..];
        let len = remaining.len().min(buf.len());
        buf[..len].copy_from_slice(&remaining[..len]);
        self.cursor += len;
        Ok(len)
    }
}

impl Write for FakeStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
