use embassy_net::{Runner, Stack, StackResources};
use esp_hal::rng::Rng;
use esp_radio::wifi::{InternalWifiError, WifiController, WifiDevice, WifiError};
use log::info;
use static_cell::StaticCell;
use wifetch::download::{events::Ipv4Display, InitError, LinkEvent};

use super::{
    config::{ADDRESS_REQUESTS, NET_EVENTS},
    messages::NetMessage,
    wifi,
};

pub(crate) struct NetRuntime {
    pub(crate) wifi_controller: WifiController<'static>,
    pub(crate) net_runner: Runner<'static, WifiDevice<'static>>,
    pub(crate) stack: Stack<'static>,
}

pub(crate) fn setup(wifi: esp_hal::peripherals::WIFI<'static>) -> Result<NetRuntime, InitError> {
    static RADIO_CTRL: StaticCell<esp_radio::Controller<'static>> = StaticCell::new();
    static STACK_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

    let radio_ctrl = esp_radio::init().map_err(|err| {
        log::error!("net: esp_radio::init err={:?}", err);
        InitError::Radio
    })?;
    let radio_ctrl = RADIO_CTRL.init(radio_ctrl);
    let (wifi_controller, ifaces) = esp_radio::wifi::new(radio_ctrl, wifi, wifi::wifi_runtime_config())
        .map_err(|err| {
            let label = match err {
                WifiError::InvalidArguments => "invalid_args",
                WifiError::Unsupported => "unsupported",
                WifiError::NotInitialized => "not_initialized",
                WifiError::InternalError(InternalWifiError::NoMem) => "no_mem",
                _ => "other",
            };
            log::error!("net: wifi init failed {}", label);
            InitError::WifiDriver
        })?;

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let (stack, net_runner) = embassy_net::new(
        ifaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        STACK_RESOURCES.init(StackResources::<3>::new()),
        seed,
    );

    Ok(NetRuntime {
        wifi_controller,
        net_runner,
        stack,
    })
}

#[embassy_executor::task]
pub(crate) async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Answers address requests once DHCP has configured the interface.
#[embassy_executor::task]
pub(crate) async fn address_task(stack: Stack<'static>) {
    loop {
        ADDRESS_REQUESTS.receive().await;
        stack.wait_config_up().await;
        let Some(cfg) = stack.config_v4() else {
            continue;
        };
        let octets = cfg.address.address().octets();
        info!("net: dhcp lease {}", Ipv4Display(octets));
        NET_EVENTS
            .send(NetMessage::Link(LinkEvent::AddressAssigned(octets)))
            .await;
    }
}
