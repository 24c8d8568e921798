use log::{info, warn};

use crate::{
    config::{JoinPolicy, SamplingConfig},
    http::TemperatureFeed,
    ports::{CharacterDisplay, Delay, DigitalOutput, TemperatureBus},
    types::{celsius_to_fahrenheit, ConnectionState, DeviceId, TemperatureReading},
};

/// Peripherals handed over at startup, already initialized in wiring order.
pub struct MonitorHardware<B, D, L, T> {
    pub status_led: L,
    pub light: L,
    pub bus: B,
    pub display: D,
    pub delay: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub html: String,
    pub light_on: bool,
}

pub struct Monitor<B, D, L, T> {
    status_led: L,
    light: L,
    bus: B,
    display: D,
    delay: T,
    devices: Vec<DeviceId>,
    sampling: SamplingConfig,
}

impl<B, D, L, T> Monitor<B, D, L, T>
where
    B: TemperatureBus,
    D: CharacterDisplay,
    L: DigitalOutput,
    T: Delay,
{
    pub fn new(hardware: MonitorHardware<B, D, L, T>, sampling: SamplingConfig) -> Self {
        let MonitorHardware {
            status_led,
            light,
            bus,
            display,
            delay,
        } = hardware;

        Self {
            status_led,
            light,
            bus,
            display,
            delay,
            devices: Vec::new(),
            sampling,
        }
    }

    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    /// Scans the bus once. The result is kept for the process lifetime.
    pub fn discover_devices(&mut self) -> &[DeviceId] {
        self.devices = match self.bus.scan() {
            Ok(devices) => devices,
            Err(err) => {
                warn!("temperature sensor scan failed: {err}");
                Vec::new()
            }
        };

        if self.devices.is_empty() {
            warn!("no temperature sensors found");
        } else {
            let ids: Vec<String> = self.devices.iter().map(ToString::to_string).collect();
            info!("found {} device(s): {}", ids.len(), ids.join(", "));
        }

        &self.devices
    }

    pub fn announce_connection(&mut self, state: &ConnectionState, policy: &JoinPolicy) {
        let (led_on, message) = if state.joined {
            (true, "WiFi Connected")
        } else {
            (false, "WiFi Failed")
        };

        if let Err(err) = self.status_led.set_state(led_on) {
            warn!("failed to drive status indicator: {err}");
        }
        if let Err(err) = self.display.write_text(message) {
            warn!("failed to show connection status: {err}");
        }

        self.delay.delay_ms(policy.status_hold_ms);

        if let Err(err) = self.display.clear() {
            warn!("failed to clear display: {err}");
        }
    }

    /// Runs one full conversion cycle over every discovered device.
    ///
    /// The light follows the most recent Fahrenheit value computed in the
    /// loop, which is the last device that produced a conversion. A device
    /// that fails to convert re-applies the previous device's value.
    pub fn sample_all(&mut self) -> Sample {
        if let Err(err) = self.bus.start_conversion() {
            warn!("failed to start temperature conversion: {err}");
        }
        self.delay.delay_ms(self.sampling.conversion_delay_ms);

        let mut html = String::new();
        let mut light_on = false;
        let mut last_temp_f: Option<f32> = None;

        for &device in &self.devices {
            let reading = TemperatureReading {
                device,
                celsius: self.bus.read_temperature_c(device),
            };

            match reading.celsius {
                Some(temp_c) => {
                    let temp_f = celsius_to_fahrenheit(temp_c);
                    last_temp_f = Some(temp_f);
                    html.push_str(&device_fragment(temp_c, temp_f));
                    info!("device {device} - temp: {temp_c:.2}°C / {temp_f:.2}°F");

                    if let Err(err) = self.display.clear() {
                        warn!("failed to clear display: {err}");
                    }
                    if let Err(err) = self.display.write_text(&format!("Temp: {temp_f:.2}F")) {
                        warn!("failed to show temperature: {err}");
                    }
                    self.delay.delay_ms(self.sampling.display_hold_ms);
                }
                None => warn!("device {device} - failed to read temperature"),
            }

            if let Some(temp_f) = last_temp_f {
                light_on = temp_f >= self.sampling.light_threshold_f;
            }
        }

        if !self.devices.is_empty() {
            if let Err(err) = self.light.set_state(light_on) {
                warn!("failed to drive light output: {err}");
            }
        }

        Sample { html, light_on }
    }
}

impl<B, D, L, T> TemperatureFeed for Monitor<B, D, L, T>
where
    B: TemperatureBus,
    D: CharacterDisplay,
    L: DigitalOutput,
    T: Delay,
{
    fn temperatures_html(&mut self) -> String {
        self.sample_all().html
    }
}

fn device_fragment(temp_c: f32, temp_f: f32) -> String {
    format!(
        "<div class=\"device\">\n    <p>Temperature: {temp_c:.2}°C / {temp_f:.2}°F</p>\n</div>\n"
    )
}
