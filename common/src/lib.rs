pub mod config;
pub mod error;
pub mod http;
pub mod monitor;
pub mod network;
pub mod page;
pub mod ports;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{HttpConfig, JoinPolicy, NetworkConfig, RuntimeConfig, SamplingConfig};
pub use error::{HalError, ServeError};
pub use http::{RequestKind, TemperatureFeed};
pub use monitor::{Monitor, MonitorHardware, Sample};
pub use ports::{CharacterDisplay, Delay, DigitalOutput, NetworkLink, TemperatureBus, ThreadSleep};
pub use types::{celsius_to_fahrenheit, ConnectionState, DeviceId, TemperatureReading};
