use log::{debug, info, warn};

use super::config::DownloadConfig;
use super::context::DownloadContext;
use super::dispatch::dispatch;
use super::events::NetEvent;
use super::ports::{BodySink, EngineError, HttpEngine, HttpMethod, LinkControl, Ports};
use super::timer::{Countdown, MonotonicClock};
use super::types::{DownloadFlag, DownloadSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Issued,
    LinkDown,
    AlreadyRequested,
    AlreadyDownloading,
    Rejected(EngineError),
}

impl StartOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::LinkDown => "link_down",
            Self::AlreadyRequested => "already_requested",
            Self::AlreadyDownloading => "already_downloading",
            Self::Rejected(_) => "rejected",
        }
    }

    pub fn issued(self) -> bool {
        matches!(self, Self::Issued)
    }
}

/// Issues the configured GET unless the link is down or an attempt already
/// runs. A refused request cancels the attempt so the next watchdog boundary
/// restarts it.
pub fn start_download<H: HttpEngine>(ctx: &mut DownloadContext, http: &mut H) -> StartOutcome {
    if !ctx.state.is_set(DownloadFlag::WifiConnected) {
        info!("start_download: Wi-Fi is not connected");
        ctx.telemetry.record_request_skipped();
        return StartOutcome::LinkDown;
    }
    if ctx.state.is_set(DownloadFlag::GetRequested) {
        info!("start_download: request is sent already");
        ctx.telemetry.record_request_skipped();
        return StartOutcome::AlreadyRequested;
    }
    if ctx.state.is_set(DownloadFlag::Downloading) {
        info!("start_download: running download already");
        ctx.telemetry.record_request_skipped();
        return StartOutcome::AlreadyDownloading;
    }

    info!("start_download: sending HTTP request...");
    match http.send_request(ctx.config.url, HttpMethod::Get) {
        Ok(()) => {
            ctx.telemetry.record_request_issued();
            ctx.mark_issued();
            StartOutcome::Issued
        }
        Err(err) => {
            warn!("start_download: engine refused request: {}", err);
            ctx.telemetry.record_request_rejected();
            ctx.set(DownloadFlag::Canceled);
            StartOutcome::Rejected(err)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Heartbeat boundary crossed; the caller toggles its liveness output.
    pub heartbeat: bool,
    pub watchdog_expired: bool,
    /// Set when the watchdog found a finished attempt and started the next.
    pub restarted: Option<StartOutcome>,
    pub stalled: bool,
    pub watchdog_left_ms: u64,
}

/// Owns the download state and drives it from network events and the clock.
pub struct Downloader<C, L, H, S> {
    ctx: DownloadContext,
    ports: Ports<L, H, S>,
    clock: C,
    watchdog: Countdown,
    heartbeat: Countdown,
}

impl<C, L, H, S> Downloader<C, L, H, S>
where
    C: MonotonicClock,
    L: LinkControl,
    H: HttpEngine,
    S: BodySink,
{
    pub fn new(config: DownloadConfig, ports: Ports<L, H, S>, clock: C) -> Self {
        let config = config.sanitized();
        let now = clock.now_ms();
        let mut watchdog = Countdown::new();
        watchdog.countdown_secs(now, config.initial_watchdog_secs);
        let mut heartbeat = Countdown::new();
        heartbeat.countdown_ms(now, u64::from(config.heartbeat_ms));

        let mut ctx = DownloadContext::new(config);
        ctx.mark_activity(now);

        Self {
            ctx,
            ports,
            clock,
            watchdog,
            heartbeat,
        }
    }

    pub fn boot(&mut self) {
        let credentials = self.ctx.config.credentials;
        info!("wifetch: HTTP file downloader");
        info!(
            "wifetch: joining '{}' ({}) for {}",
            credentials.ssid,
            credentials.auth.as_str(),
            self.ctx.config.url
        );
        self.ports.link.connect(&credentials);
    }

    pub fn handle_event(&mut self, event: NetEvent<'_>) {
        let now = self.clock.now_ms();
        dispatch(&mut self.ctx, &mut self.ports, now, event);
    }

    pub fn start_download(&mut self) -> StartOutcome {
        let before = self.ctx.state.phase();
        let outcome = start_download(&mut self.ctx, &mut self.ports.http);
        self.ctx.settle(before);
        outcome
    }

    pub fn poll_timers(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let mut report = TickReport::default();

        if self.heartbeat.is_expired(now) {
            self.heartbeat
                .countdown_ms(now, u64::from(self.ctx.config.heartbeat_ms));
            report.heartbeat = true;
            info!(
                "heartbeat: watchdog in {} s",
                self.watchdog.left_ms(now) / 1_000
            );
        }

        report.stalled = self.check_stall(now);

        if self.watchdog.is_expired(now) {
            report.watchdog_expired = true;
            self.watchdog.countdown_secs(now, self.ctx.config.watchdog_secs);

            let phase = self.ctx.state.phase();
            if phase.is_terminal() {
                info!("watchdog: attempt {}; starting next cycle", phase.as_str());
                self.ctx.begin_next_cycle();
                self.ctx.mark_activity(now);
                report.restarted = Some(self.start_download());
                self.ctx.telemetry.record_watchdog_expiry(true);
            } else {
                debug!("watchdog: phase {}; re-armed", phase.as_str());
                self.ctx.telemetry.record_watchdog_expiry(false);
            }
        }

        report.watchdog_left_ms = self.watchdog.left_ms(now);
        report
    }

    fn check_stall(&mut self, now: u64) -> bool {
        let Some(timeout_ms) = self.ctx.config.stall_timeout_ms else {
            return false;
        };
        if !self.ctx.attempt_live() {
            return false;
        }
        let idle_ms = now.saturating_sub(self.ctx.last_activity_ms());
        if idle_ms < u64::from(timeout_ms) {
            return false;
        }

        warn!(
            "stall: no network activity for {} ms in phase {}; canceling",
            idle_ms,
            self.ctx.state.phase().as_str()
        );
        let before = self.ctx.state.phase();
        self.ctx.take_outstanding();
        self.ports.http.close();
        self.ctx.set(DownloadFlag::Canceled);
        self.ctx.telemetry.record_stall();
        self.ctx.settle(before);
        true
    }

    pub fn context(&self) -> &DownloadContext {
        &self.ctx
    }

    pub fn snapshot(&self) -> DownloadSnapshot {
        self.ctx.state.snapshot()
    }

    pub fn ports(&self) -> &Ports<L, H, S> {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut Ports<L, H, S> {
        &mut self.ports
    }
}
