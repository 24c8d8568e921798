use core::convert::TryInto;
use std::net::TcpListener;

use anyhow::{anyhow, Context};
use ds18b20::Ds18b20;
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::{
    delay::Ets,
    gpio::{AnyIOPin, AnyOutputPin, IOPin, InputOutput, Output, OutputPin, PinDriver, Pull},
};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, prelude::Peripherals},
    log::EspLogger,
    nvs::EspDefaultNvsPartition,
    wifi::EspWifi,
};
use hd44780_driver::{bus::FourBitBus, HD44780};
use log::{info, warn};
use one_wire_bus::{Address, OneWire};

use tempmon_common::{
    http, network, CharacterDisplay, DeviceId, DigitalOutput, HalError, JoinPolicy, Monitor,
    MonitorHardware, NetworkConfig, NetworkLink, RuntimeConfig, SamplingConfig, TemperatureBus,
    ThreadSleep,
};

// Wiring harness. Not configurable at runtime.
const STATUS_LED_PIN: i32 = 2;
const LIGHT_PIN: i32 = 27;
const ONE_WIRE_PIN: i32 = 4;
const LCD_PINS: &str = "rs=GPIO19 en=GPIO23 d4=GPIO18 d5=GPIO17 d6=GPIO16 d7=GPIO15";

type LcdPin = PinDriver<'static, AnyOutputPin, Output>;
type LcdBus = FourBitBus<LcdPin, LcdPin, LcdPin, LcdPin, LcdPin, LcdPin>;

struct GpioOutput {
    pin: PinDriver<'static, AnyOutputPin, Output>,
}

impl GpioOutput {
    fn new(pin: AnyOutputPin) -> anyhow::Result<Self> {
        Ok(Self {
            pin: PinDriver::output(pin)?,
        })
    }
}

impl DigitalOutput for GpioOutput {
    fn set_state(&mut self, on: bool) -> Result<(), HalError> {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|err| HalError::Gpio(format!("{err:?}")))
    }
}

struct OneWireBus {
    one_wire: OneWire<PinDriver<'static, AnyIOPin, InputOutput>>,
    delay: Ets,
}

impl OneWireBus {
    fn new(pin: AnyIOPin) -> anyhow::Result<Self> {
        let mut one_wire_pin = PinDriver::input_output_od(pin)?;
        one_wire_pin.set_pull(Pull::Up)?;
        one_wire_pin.set_high()?;

        let one_wire = OneWire::new(one_wire_pin)
            .map_err(|err| anyhow!("failed to initialize one-wire bus: {err:?}"))?;

        Ok(Self {
            one_wire,
            delay: Ets,
        })
    }
}

impl TemperatureBus for OneWireBus {
    fn scan(&mut self) -> Result<Vec<DeviceId>, HalError> {
        let mut found = Vec::new();
        let mut device_count = 0_u32;

        for addr in self.one_wire.devices(false, &mut self.delay) {
            let address = addr.map_err(|err| HalError::Bus(format!("device scan failed: {err:?}")))?;
            device_count = device_count.saturating_add(1);
            if address.family_code() == ds18b20::FAMILY_CODE {
                found.push(DeviceId::new(address.0));
            }
        }

        info!(
            "one-wire scan on GPIO{}: {} device(s), {} DS18B20",
            ONE_WIRE_PIN,
            device_count,
            found.len()
        );
        Ok(found)
    }

    fn start_conversion(&mut self) -> Result<(), HalError> {
        ds18b20::start_simultaneous_temp_measurement(&mut self.one_wire, &mut self.delay)
            .map_err(|err| HalError::Bus(format!("conversion command failed: {err:?}")))
    }

    fn read_temperature_c(&mut self, device: DeviceId) -> Option<f32> {
        let address = Address(device.rom());
        let sensor = match Ds18b20::new::<core::convert::Infallible>(address) {
            Ok(sensor) => sensor,
            Err(err) => {
                warn!("invalid DS18B20 address {device}: {err:?}");
                return None;
            }
        };

        match sensor.read_data(&mut self.one_wire, &mut self.delay) {
            Ok(data) => Some(data.temperature),
            Err(err) => {
                warn!("failed to read DS18B20 {device}: {err:?}");
                None
            }
        }
    }
}

struct LcdDisplay {
    lcd: HD44780<LcdBus>,
    delay: Ets,
}

impl LcdDisplay {
    fn new(
        rs: AnyOutputPin,
        en: AnyOutputPin,
        d4: AnyOutputPin,
        d5: AnyOutputPin,
        d6: AnyOutputPin,
        d7: AnyOutputPin,
    ) -> anyhow::Result<Self> {
        let mut delay = Ets;
        let mut lcd = HD44780::new_4bit(
            PinDriver::output(rs)?,
            PinDriver::output(en)?,
            PinDriver::output(d4)?,
            PinDriver::output(d5)?,
            PinDriver::output(d6)?,
            PinDriver::output(d7)?,
            &mut delay,
        )
        .map_err(|err| anyhow!("failed to initialize HD44780 display: {err:?}"))?;

        lcd.clear(&mut delay)
            .map_err(|err| anyhow!("failed to clear HD44780 display: {err:?}"))?;

        info!("16x2 display ready ({LCD_PINS})");
        Ok(Self { lcd, delay })
    }
}

impl CharacterDisplay for LcdDisplay {
    fn clear(&mut self) -> Result<(), HalError> {
        self.lcd
            .clear(&mut self.delay)
            .map_err(|err| HalError::Display(format!("{err:?}")))
    }

    fn write_text(&mut self, text: &str) -> Result<(), HalError> {
        self.lcd
            .write_str(text, &mut self.delay)
            .map_err(|err| HalError::Display(format!("{err:?}")))
    }
}

struct StationLink {
    wifi: EspWifi<'static>,
}

impl StationLink {
    fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs_partition: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            wifi: EspWifi::new(modem, sys_loop, Some(nvs_partition))?,
        })
    }

    fn start_station(&mut self, network: &NetworkConfig) -> anyhow::Result<()> {
        let auth_method = if network.wifi_pass.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };

        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: network
                    .wifi_ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!("wifi ssid too long"))?,
                password: network
                    .wifi_pass
                    .as_str()
                    .try_into()
                    .map_err(|_| anyhow!("wifi password too long"))?,
                auth_method,
                ..Default::default()
            }))?;

        self.wifi.start()?;
        self.wifi.connect()?;
        Ok(())
    }
}

impl NetworkLink for StationLink {
    fn connect(&mut self, network: &NetworkConfig) -> bool {
        match self.start_station(network) {
            Ok(()) => {
                info!("wifi started, connecting to `{}`", network.wifi_ssid);
                true
            }
            Err(err) => {
                warn!("wifi station start failed: {err:#}");
                false
            }
        }
    }

    fn is_connected(&mut self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
            && self.wifi.sta_netif().is_up().unwrap_or(false)
    }

    fn local_address(&self) -> Option<String> {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip.to_string())
    }
}

pub fn run() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    EspLogger::initialize_default();

    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let Peripherals { modem, pins, .. } = Peripherals::take()?;

    let status_led = GpioOutput::new(pins.gpio2.downgrade_output())
        .with_context(|| format!("failed to initialize status LED on GPIO{STATUS_LED_PIN}"))?;
    let light = GpioOutput::new(pins.gpio27.downgrade_output())
        .with_context(|| format!("failed to initialize light output on GPIO{LIGHT_PIN}"))?;
    let bus = OneWireBus::new(pins.gpio4.downgrade())
        .with_context(|| format!("failed to initialize one-wire bus on GPIO{ONE_WIRE_PIN}"))?;
    let display = LcdDisplay::new(
        pins.gpio19.downgrade_output(),
        pins.gpio23.downgrade_output(),
        pins.gpio18.downgrade_output(),
        pins.gpio17.downgrade_output(),
        pins.gpio16.downgrade_output(),
        pins.gpio15.downgrade_output(),
    )
    .context("failed to initialize display")?;

    let mut monitor = Monitor::new(
        MonitorHardware {
            status_led,
            light,
            bus,
            display,
            delay: ThreadSleep,
        },
        SamplingConfig::default(),
    );
    monitor.discover_devices();

    let runtime = RuntimeConfig {
        network: network_from_build_env(),
        ..RuntimeConfig::default()
    };
    let policy = JoinPolicy::default();

    // Keep the driver alive for the program lifetime.
    let mut link = StationLink::new(modem, sys_loop, nvs_partition)
        .context("failed to initialize wifi driver")?;
    let state = network::join(&mut link, &runtime.network, &policy, &mut ThreadSleep);
    if state.joined {
        disable_wifi_power_save();
    }
    monitor.announce_connection(&state, &policy);

    let listener = TcpListener::bind((runtime.http.bind_addr.as_str(), runtime.http.port))
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                runtime.http.bind_addr, runtime.http.port
            )
        })?;

    let never = http::serve_forever(&listener, &mut monitor).context("http responder stopped")?;
    match never {}
}

fn network_from_build_env() -> NetworkConfig {
    let defaults = NetworkConfig::default();
    NetworkConfig {
        wifi_ssid: option_env!("WIFI_SSID")
            .map(str::to_string)
            .unwrap_or(defaults.wifi_ssid),
        wifi_pass: option_env!("WIFI_PASS")
            .map(str::to_string)
            .unwrap_or(defaults.wifi_pass),
    }
}

fn disable_wifi_power_save() {
    let rc = unsafe { esp_idf_svc::sys::esp_wifi_set_ps(0) };
    if rc == esp_idf_svc::sys::ESP_OK {
        info!("wifi power save disabled");
    } else {
        warn!("failed to disable wifi power save: esp_err_t={rc}");
    }
}
