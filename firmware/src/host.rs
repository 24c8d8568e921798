use std::{net::TcpListener, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use tempmon_common::{
    network, CharacterDisplay, DeviceId, DigitalOutput, HalError, HttpConfig, JoinPolicy, Monitor,
    MonitorHardware, NetworkConfig, NetworkLink, RuntimeConfig, SamplingConfig, TemperatureBus,
    ThreadSleep,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct HostConfig {
    #[serde(flatten)]
    runtime: RuntimeConfig,
    simulated_sensors: Vec<SimulatedSensor>,
    link_up_after_polls: Option<u32>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig {
                http: HttpConfig {
                    bind_addr: "127.0.0.1".to_string(),
                    port: 8080,
                },
                ..RuntimeConfig::default()
            },
            simulated_sensors: vec![
                SimulatedSensor {
                    rom: 0x3C01_D607_5E2A_4B28,
                    base_c: 21.0,
                    fail_every: None,
                },
                SimulatedSensor {
                    rom: 0x9A01_D607_11C4_7F28,
                    base_c: 22.5,
                    fail_every: Some(5),
                },
            ],
            link_up_after_polls: Some(2),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SimulatedSensor {
    rom: u64,
    base_c: f32,
    #[serde(default)]
    fail_every: Option<u32>,
}

struct SimulatedBus {
    sensors: Vec<SimulatedSensor>,
    tick: u32,
}

impl TemperatureBus for SimulatedBus {
    fn scan(&mut self) -> Result<Vec<DeviceId>, HalError> {
        Ok(self
            .sensors
            .iter()
            .map(|sensor| DeviceId::new(sensor.rom))
            .collect())
    }

    fn start_conversion(&mut self) -> Result<(), HalError> {
        self.tick = self.tick.wrapping_add(1);
        Ok(())
    }

    fn read_temperature_c(&mut self, device: DeviceId) -> Option<f32> {
        let sensor = self.sensors.iter().find(|s| s.rom == device.rom())?;
        if sensor
            .fail_every
            .is_some_and(|every| every > 0 && self.tick % every == 0)
        {
            return None;
        }
        Some(sensor.base_c + (self.tick % 8) as f32 * 0.25)
    }
}

struct LoggingDisplay;

impl CharacterDisplay for LoggingDisplay {
    fn clear(&mut self) -> Result<(), HalError> {
        info!("[lcd] <clear>");
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), HalError> {
        info!("[lcd] {text}");
        Ok(())
    }
}

struct LoggingPin {
    name: &'static str,
}

impl DigitalOutput for LoggingPin {
    fn set_state(&mut self, on: bool) -> Result<(), HalError> {
        info!("[gpio] {} -> {}", self.name, if on { "on" } else { "off" });
        Ok(())
    }
}

struct SimulatedLink {
    up_after_polls: Option<u32>,
    polls: u32,
    address: String,
}

impl NetworkLink for SimulatedLink {
    fn connect(&mut self, network: &NetworkConfig) -> bool {
        info!("simulated wifi join to `{}`", network.wifi_ssid);
        true
    }

    fn is_connected(&mut self) -> bool {
        self.polls = self.polls.saturating_add(1);
        self.up_after_polls
            .is_some_and(|up_after| self.polls > up_after)
    }

    fn local_address(&self) -> Option<String> {
        Some(self.address.clone())
    }
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_host_config()?;
    let runtime = &config.runtime;

    let hardware = MonitorHardware {
        status_led: LoggingPin { name: "status" },
        light: LoggingPin { name: "light" },
        bus: SimulatedBus {
            sensors: config.simulated_sensors.clone(),
            tick: 0,
        },
        display: LoggingDisplay,
        delay: ThreadSleep,
    };
    let mut monitor = Monitor::new(hardware, SamplingConfig::default());
    monitor.discover_devices();

    let policy = JoinPolicy::default();
    let mut link = SimulatedLink {
        up_after_polls: config.link_up_after_polls,
        polls: 0,
        address: runtime.http.bind_addr.clone(),
    };
    let state = network::join(&mut link, &runtime.network, &policy, &mut ThreadSleep);
    monitor.announce_connection(&state, &policy);

    let listener = TcpListener::bind((runtime.http.bind_addr.as_str(), runtime.http.port))
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                runtime.http.bind_addr, runtime.http.port
            )
        })?;

    let never = tempmon_common::http::serve_forever(&listener, &mut monitor)
        .context("http responder stopped")?;
    match never {}
}

fn load_host_config() -> anyhow::Result<HostConfig> {
    let mut config = match std::env::var("TEMPMON_CONFIG") {
        Ok(path) => read_host_config(Path::new(&path))?,
        Err(_) => HostConfig::default(),
    };

    if let Ok(ssid) = std::env::var("WIFI_SSID") {
        config.runtime.network.wifi_ssid = ssid;
    }
    if let Ok(pass) = std::env::var("WIFI_PASS") {
        config.runtime.network.wifi_pass = pass;
    }
    if let Ok(bind_addr) = std::env::var("HTTP_BIND") {
        config.runtime.http.bind_addr = bind_addr;
    }
    if let Ok(value) = std::env::var("HTTP_PORT") {
        match value.parse::<u16>() {
            Ok(port) => config.runtime.http.port = port,
            Err(err) => warn!("ignoring invalid HTTP_PORT `{value}`: {err}"),
        }
    }

    Ok(config)
}

fn read_host_config(path: &Path) -> anyhow::Result<HostConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
}
