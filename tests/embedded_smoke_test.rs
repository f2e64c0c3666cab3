//! On-target checks for the download core on the embassy time driver.

#![no_std]
#![no_main]

#[cfg(test)]
#[embedded_test::tests(executor = esp_rtos::embassy::Executor::new())]
mod tests {
    use embassy_time::{Duration, Instant, Timer};
    use wifetch::download::{Countdown, DownloadFlag, DownloadStateTracker};

    #[init]
    fn init() {
        let peripherals = esp_hal::init(esp_hal::Config::default());
        let timg0 = esp_hal::timer::timg::TimerGroup::new(peripherals.TIMG0);
        esp_rtos::start(timg0.timer0);
    }

    #[test]
    async fn countdown_expires_on_device_clock() {
        let mut timer = Countdown::new();
        timer.countdown_ms(Instant::now().as_millis(), 20);
        assert!(!timer.is_expired(Instant::now().as_millis()));

        Timer::after(Duration::from_millis(30)).await;
        assert!(timer.is_expired(Instant::now().as_millis()));
        assert_eq!(timer.left_ms(Instant::now().as_millis()), 0);
    }

    #[test]
    async fn tracker_runs_a_cycle_without_std() {
        let mut tracker = DownloadStateTracker::new();
        tracker.set(DownloadFlag::WifiConnected);
        tracker.set(DownloadFlag::GetRequested);
        tracker.set(DownloadFlag::Downloading);
        assert!(tracker.set(DownloadFlag::Completed).changed());
        assert!(tracker.set(DownloadFlag::Canceled).rejected());
        assert!(tracker.reset().changed());
        assert!(tracker.is_set(DownloadFlag::NotReady));
    }
}
