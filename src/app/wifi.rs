use embassy_time::{Duration, Timer};
use esp_radio::wifi::{
    AuthMethod, ClientConfig, Config as WifiRuntimeConfig, ModeConfig, ScanMethod, WifiController,
    WifiEvent,
};
use log::{info, warn};
use wifetch::download::{AuthMode, WifiCredentials};

use super::{
    config::{LINK_COMMANDS, NET_EVENTS, WIFI_RETRY_DELAY_SECS},
    messages::{LinkCommand, NetMessage},
};

const WIFI_RX_QUEUE_SIZE: usize = 3;
const WIFI_TX_QUEUE_SIZE: usize = 2;
const WIFI_STATIC_RX_BUF_NUM: u8 = 4;
const WIFI_DYNAMIC_RX_BUF_NUM: u16 = 8;
const WIFI_DYNAMIC_TX_BUF_NUM: u16 = 8;
const WIFI_RX_BA_WIN: u8 = 3;

pub(super) fn wifi_runtime_config() -> WifiRuntimeConfig {
    WifiRuntimeConfig::default()
        .with_rx_queue_size(WIFI_RX_QUEUE_SIZE)
        .with_tx_queue_size(WIFI_TX_QUEUE_SIZE)
        .with_static_rx_buf_num(WIFI_STATIC_RX_BUF_NUM)
        .with_dynamic_rx_buf_num(WIFI_DYNAMIC_RX_BUF_NUM)
        .with_dynamic_tx_buf_num(WIFI_DYNAMIC_TX_BUF_NUM)
        .with_ampdu_rx_enable(false)
        .with_ampdu_tx_enable(false)
        .with_rx_ba_win(WIFI_RX_BA_WIN)
}

/// Serves `connect` requests from the download core. Every attempt ends in
/// exactly one link event: connected, or disconnected after a failure.
#[embassy_executor::task]
pub(crate) async fn wifi_link_task(mut controller: WifiController<'static>) {
    loop {
        let LinkCommand::Connect(credentials) = LINK_COMMANDS.receive().await;

        if let Err(err) = controller.set_config(&mode_config(credentials)) {
            warn!("wifi: station config err={:?}", err);
            report_failure().await;
            continue;
        }

        match controller.is_started() {
            Ok(true) => {}
            Ok(false) => {
                if let Err(err) = controller.start_async().await {
                    warn!("wifi: start err={:?}", err);
                    report_failure().await;
                    continue;
                }
            }
            Err(err) => {
                warn!("wifi: status err={:?}", err);
                report_failure().await;
                continue;
            }
        }

        info!("wifi: connecting to '{}'", credentials.ssid);
        if let Err(err) = controller.connect_async().await {
            warn!("wifi: connect err={:?}", err);
            let _ = controller.disconnect_async().await;
            report_failure().await;
            continue;
        }

        NET_EVENTS.send(NetMessage::link_up()).await;
        controller.wait_for_event(WifiEvent::StaDisconnected).await;
        NET_EVENTS.send(NetMessage::link_down()).await;
    }
}

async fn report_failure() {
    Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
    NET_EVENTS.send(NetMessage::link_down()).await;
}

fn mode_config(credentials: WifiCredentials) -> ModeConfig {
    let auth_method = match credentials.auth {
        AuthMode::Open => AuthMethod::None,
        AuthMode::Wep => AuthMethod::Wep,
        AuthMode::WpaPsk => AuthMethod::Wpa2Personal,
    };
    let client = ClientConfig::default()
        .with_ssid(credentials.ssid.into())
        .with_password(credentials.passphrase.into())
        .with_auth_method(auth_method)
        .with_scan_method(ScanMethod::AllChannels);
    ModeConfig::Client(client)
}
