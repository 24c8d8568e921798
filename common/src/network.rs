use log::{info, warn};

use crate::{
    config::{JoinPolicy, NetworkConfig},
    ports::{Delay, NetworkLink},
    types::ConnectionState,
};

/// Joins the wireless network, polling the link once per interval for at
/// most `policy.max_attempts` intervals.
pub fn join<N, D>(
    link: &mut N,
    network: &NetworkConfig,
    policy: &JoinPolicy,
    delay: &mut D,
) -> ConnectionState
where
    N: NetworkLink,
    D: Delay,
{
    if !network.has_station_credentials() {
        warn!("wifi credentials missing; join will likely fail");
    }

    if !link.connect(network) {
        warn!("wifi connect request to `{}` rejected", network.wifi_ssid);
    }

    let mut attempts = 0_u32;
    let mut connected = link.is_connected();
    while !connected && attempts < policy.max_attempts {
        info!(
            "connecting to wifi ({}/{})...",
            attempts + 1,
            policy.max_attempts
        );
        delay.delay_ms(policy.poll_interval_ms);
        attempts += 1;
        connected = link.is_connected();
    }

    if connected {
        let address = link.local_address();
        info!(
            "connected on {}",
            address.as_deref().unwrap_or("<no address>")
        );
        ConnectionState::joined(address)
    } else {
        warn!("failed to connect to wifi after {attempts} attempt(s)");
        ConnectionState::failed()
    }
}
