// PunchWatch — Wi-Fi Station bring-up
//
// Blocks at boot until the access point hands out an address. After that the
// ESP-IDF Wi-Fi driver keeps the link up on its own.

use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

use punchwatch::config::*;

pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
    let mut wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: WIFI_SSID
            .try_into()
            .map_err(|_| anyhow!("SSID longer than 32 bytes"))?,
        password: WIFI_PASSWORD
            .try_into()
            .map_err(|_| anyhow!("Wi-Fi password longer than 64 bytes"))?,
        auth_method: if WIFI_PASSWORD.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;

    wifi.start()?;
    log::info!("Connecting to Wi-Fi \"{}\"", WIFI_SSID);

    // Retry until associated; nothing else can run without the network.
    while let Err(e) = wifi.connect() {
        log::warn!("Wi-Fi connect failed ({}), retrying", e);
        thread::sleep(Duration::from_millis(WIFI_RETRY_MS));
    }
    wifi.wait_netif_up()?;

    log::info!("WiFi connected");
    Ok(wifi)
}
