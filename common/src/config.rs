use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    pub wifi_ssid: String,
    pub wifi_pass: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: "CHANGE_ME".to_string(),
            wifi_pass: "CHANGE_ME".to_string(),
        }
    }
}

impl NetworkConfig {
    pub fn has_station_credentials(&self) -> bool {
        let ssid = self.wifi_ssid.trim();
        !ssid.is_empty() && ssid != "CHANGE_ME"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub network: NetworkConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub conversion_delay_ms: u64,
    pub display_hold_ms: u64,
    pub light_threshold_f: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            conversion_delay_ms: 750,
            display_hold_ms: 2_000,
            light_threshold_f: 72.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinPolicy {
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
    pub status_hold_ms: u64,
}

impl Default for JoinPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            poll_interval_ms: 1_000,
            status_hold_ms: 2_000,
        }
    }
}
