use super::config::DownloadConfig;
use super::progress::Progress;
use super::telemetry::DownloadTelemetry;
use super::tracker::{DownloadApplyResult, DownloadStateTracker};
use super::types::{AttemptPhase, DownloadFlag};

/// Everything the dispatch layer and the orchestrator mutate, owned in one
/// place and handed to both by reference.
pub struct DownloadContext {
    pub config: DownloadConfig,
    pub state: DownloadStateTracker,
    pub progress: Progress,
    pub telemetry: DownloadTelemetry,
    last_activity_ms: u64,
    request_outstanding: bool,
}

impl DownloadContext {
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            config,
            state: DownloadStateTracker::new(),
            progress: Progress::new(),
            telemetry: DownloadTelemetry::default(),
            last_activity_ms: 0,
            request_outstanding: false,
        }
    }

    pub fn last_activity_ms(&self) -> u64 {
        self.last_activity_ms
    }

    pub(crate) fn mark_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    /// A request went to the engine and the engine has not yet reported it
    /// sent. The phase stays `Idle` for that window.
    pub fn request_outstanding(&self) -> bool {
        self.request_outstanding
    }

    /// An attempt is in flight, or a request awaits acknowledgement.
    pub fn attempt_live(&self) -> bool {
        self.request_outstanding || self.state.phase().is_in_flight()
    }

    pub(crate) fn mark_issued(&mut self) {
        self.request_outstanding = true;
    }

    /// Clears the outstanding mark, returning whether it was set.
    pub(crate) fn take_outstanding(&mut self) -> bool {
        core::mem::replace(&mut self.request_outstanding, false)
    }

    /// Drops the finished attempt and assumes the link is still up.
    pub fn begin_next_cycle(&mut self) {
        self.request_outstanding = false;
        self.state.reset();
        self.progress.clear();
        self.state.set(DownloadFlag::WifiConnected);
    }

    /// Sets a flag and counts the request if the transition table refused it.
    pub(crate) fn set(&mut self, flag: DownloadFlag) -> DownloadApplyResult {
        let result = self.state.set(flag);
        self.note(result)
    }

    pub(crate) fn clear(&mut self, flag: DownloadFlag) -> DownloadApplyResult {
        let result = self.state.clear(flag);
        self.note(result)
    }

    fn note(&self, result: DownloadApplyResult) -> DownloadApplyResult {
        if result.rejected() {
            self.telemetry.record_rejected_transition();
        }
        result
    }

    /// Counts an attempt that reached a terminal phase since `before`.
    pub(crate) fn settle(&self, before: AttemptPhase) {
        let after = self.state.phase();
        if before == after {
            return;
        }
        match after {
            AttemptPhase::Completed => self.telemetry.record_completion(),
            AttemptPhase::Canceled => self.telemetry.record_cancellation(),
            _ => {}
        }
    }
}
