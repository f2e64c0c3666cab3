use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use esp_hal::gpio::Output;
use log::info;
use wifetch::download::{DiscardSink, Downloader};

use super::{
    config::{DOWNLOAD_POLL_MS, NET_EVENTS},
    ports::{ChannelHttp, ChannelLink, EmbassyClock},
};

pub(crate) type DeviceDownloader = Downloader<EmbassyClock, ChannelLink, ChannelHttp, DiscardSink>;

/// Main loop: network events as they arrive, timers at least every poll
/// period. The LED toggles on each heartbeat.
#[embassy_executor::task]
pub(crate) async fn download_task(mut downloader: DeviceDownloader, mut led: Output<'static>) {
    downloader.boot();

    loop {
        match select(
            NET_EVENTS.receive(),
            Timer::after(Duration::from_millis(DOWNLOAD_POLL_MS)),
        )
        .await
        {
            Either::First(message) => downloader.handle_event(message.as_event()),
            Either::Second(()) => {}
        }

        let report = downloader.poll_timers();
        if report.heartbeat {
            led.toggle();
        }
        if report.watchdog_expired {
            let telemetry = downloader.context().telemetry.snapshot();
            info!(
                "download: issued={} completed={} canceled={} bytes={} sink={}",
                telemetry.requests_issued,
                telemetry.completions,
                telemetry.cancellations,
                telemetry.bytes_received,
                downloader.ports().sink.stored()
            );
        }
    }
}
