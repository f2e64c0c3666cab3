pub(crate) mod config;
mod download_task;
mod http;
mod messages;
mod net;
mod ports;
mod wifi;

use esp_hal::{
    gpio::{Level, Output, OutputConfig},
    timer::timg::TimerGroup,
};
use log::{error, LevelFilter};
use wifetch::download::{DiscardSink, DownloadConfig, Downloader, InitError, Ports};

use self::{
    config::INTERNAL_HEAP_BYTES,
    ports::{ChannelHttp, ChannelLink, EmbassyClock},
};

pub(crate) fn run() -> ! {
    esp_println::logger::init_logger(LevelFilter::Info);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    esp_alloc::heap_allocator!(size: INTERNAL_HEAP_BYTES);
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            error!("wifetch: configuration rejected: {}", err);
            halt_forever();
        }
    };

    let net = match net::setup(peripherals.WIFI) {
        Ok(net) => net,
        Err(err) => {
            error!("wifetch: init failed: {}", err);
            halt_forever();
        }
    };

    let led = Output::new(peripherals.GPIO2, Level::Low, OutputConfig::default());
    let ports = Ports::new(ChannelLink, ChannelHttp, DiscardSink::default());
    let downloader = Downloader::new(config, ports, EmbassyClock);

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(net::net_task(net.net_runner));
        spawner.must_spawn(wifi::wifi_link_task(net.wifi_controller));
        spawner.must_spawn(net::address_task(net.stack));
        spawner.must_spawn(http::http_engine_task(net.stack, config.buffer_max));
        spawner.must_spawn(download_task::download_task(downloader, led));
    });
}

fn load_config() -> Result<DownloadConfig, InitError> {
    let config = DownloadConfig::compiled()?;
    config.validate()?;
    Ok(config)
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
