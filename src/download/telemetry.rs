use core::sync::atomic::{AtomicU32, Ordering};

#[derive(Default)]
pub struct DownloadTelemetry {
    requests_issued: AtomicU32,
    requests_skipped: AtomicU32,
    requests_rejected: AtomicU32,
    completions: AtomicU32,
    cancellations: AtomicU32,
    retry_now: AtomicU32,
    other_disconnects: AtomicU32,
    link_losses: AtomicU32,
    watchdog_restarts: AtomicU32,
    watchdog_idle_expiries: AtomicU32,
    empty_chunks: AtomicU32,
    late_chunks: AtomicU32,
    bytes_received: AtomicU32,
    sink_errors: AtomicU32,
    stalls: AtomicU32,
    rejected_transitions: AtomicU32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    pub requests_issued: u32,
    pub requests_skipped: u32,
    pub requests_rejected: u32,
    pub completions: u32,
    pub cancellations: u32,
    pub retry_now: u32,
    pub other_disconnects: u32,
    pub link_losses: u32,
    pub watchdog_restarts: u32,
    pub watchdog_idle_expiries: u32,
    pub empty_chunks: u32,
    pub late_chunks: u32,
    pub bytes_received: u32,
    pub sink_errors: u32,
    pub stalls: u32,
    pub rejected_transitions: u32,
}

impl DownloadTelemetry {
    pub fn record_request_issued(&self) {
        self.requests_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_skipped(&self) {
        self.requests_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self) {
        self.completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry_now(&self) {
        self.retry_now.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_other_disconnect(&self) {
        self.other_disconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link_loss(&self) {
        self.link_losses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_watchdog_expiry(&self, restarted: bool) {
        if restarted {
            self.watchdog_restarts.fetch_add(1, Ordering::Relaxed);
        } else {
            self.watchdog_idle_expiries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_empty_chunk(&self) {
        self.empty_chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_late_chunk(&self) {
        self.late_chunks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bytes(&self, len: usize) {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        // fetch_add wraps; keep the total pinned at the ceiling instead.
        let _ = self
            .bytes_received
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |total| {
                Some(total.saturating_add(len))
            });
    }

    pub fn record_sink_error(&self) {
        self.sink_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stall(&self) {
        self.stalls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected_transition(&self) {
        self.rejected_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            requests_issued: self.requests_issued.load(Ordering::Relaxed),
            requests_skipped: self.requests_skipped.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            completions: self.completions.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            retry_now: self.retry_now.load(Ordering::Relaxed),
            other_disconnects: self.other_disconnects.load(Ordering::Relaxed),
            link_losses: self.link_losses.load(Ordering::Relaxed),
            watchdog_restarts: self.watchdog_restarts.load(Ordering::Relaxed),
            watchdog_idle_expiries: self.watchdog_idle_expiries.load(Ordering::Relaxed),
            empty_chunks: self.empty_chunks.load(Ordering::Relaxed),
            late_chunks: self.late_chunks.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            stalls: self.stalls.load(Ordering::Relaxed),
            rejected_transitions: self.rejected_transitions.load(Ordering::Relaxed),
        }
    }
}
