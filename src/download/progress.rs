use log::{info, warn};

use super::tracker::DownloadStateTracker;
use super::types::DownloadFlag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredChunk {
    Empty,
    AttemptClosed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    Ignored(IgnoredChunk),
    Progress {
        received: u32,
        expected: Option<u32>,
    },
    Completed {
        received: u32,
        expected: u32,
        overrun: u32,
    },
}

impl ChunkOutcome {
    pub fn completed(self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Received byte count of the current attempt against the announced length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    expected: Option<u32>,
    received: u32,
}

impl Progress {
    pub const fn new() -> Self {
        Self {
            expected: None,
            received: 0,
        }
    }

    pub fn expected(&self) -> Option<u32> {
        self.expected
    }

    pub fn received(&self) -> u32 {
        self.received
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Takes the announced length from the response head. The attempt only
    /// counts as downloading once the first body byte arrives.
    pub fn expect(&mut self, expected: Option<u32>) {
        self.expected = expected;
        self.received = 0;
    }

    pub fn begin_attempt(&mut self, tracker: &mut DownloadStateTracker, expected: Option<u32>) {
        self.expected = expected;
        self.received = 0;
        if !tracker.is_set(DownloadFlag::Downloading) {
            tracker.set(DownloadFlag::Downloading);
        }
    }

    /// Accounts one body chunk. `None` stands for a chunk event that carried
    /// no buffer at all.
    pub fn record_chunk(
        &mut self,
        tracker: &mut DownloadStateTracker,
        chunk: Option<&[u8]>,
    ) -> ChunkOutcome {
        let len = match chunk {
            Some(data) if !data.is_empty() => data.len(),
            _ => {
                info!("store_file_packet: empty data");
                return ChunkOutcome::Ignored(IgnoredChunk::Empty);
            }
        };

        if tracker.phase().is_terminal() {
            warn!(
                "store_file_packet: attempt already {}; dropping {} bytes",
                tracker.phase().as_str(),
                len
            );
            return ChunkOutcome::Ignored(IgnoredChunk::AttemptClosed);
        }

        if !tracker.is_set(DownloadFlag::Downloading) {
            self.begin_attempt(tracker, self.expected);
        }

        let len = u32::try_from(len).unwrap_or(u32::MAX);
        let Some(received) = self.received.checked_add(len) else {
            warn!(
                "store_file_packet: byte counter overflow at {} + {}",
                self.received, len
            );
            self.received = u32::MAX;
            return self.finish(tracker, len);
        };
        self.received = received;
        self.finish(tracker, len)
    }

    pub fn record_one_shot(
        &mut self,
        tracker: &mut DownloadStateTracker,
        expected: Option<u32>,
        chunk: Option<&[u8]>,
    ) -> ChunkOutcome {
        self.begin_attempt(tracker, expected);
        self.record_chunk(tracker, chunk)
    }

    fn finish(&mut self, tracker: &mut DownloadStateTracker, len: u32) -> ChunkOutcome {
        info!(
            "Packet size: {:4}, Total: {:5}/{}",
            len,
            self.received,
            ExpectedLabel(self.expected)
        );

        let Some(expected) = self.expected else {
            return ChunkOutcome::Progress {
                received: self.received,
                expected: None,
            };
        };

        if self.received < expected {
            return ChunkOutcome::Progress {
                received: self.received,
                expected: Some(expected),
            };
        }

        let overrun = self.received - expected;
        if overrun > 0 {
            warn!(
                "store_file_packet: received {} bytes past the announced {}",
                overrun, expected
            );
        }
        info!("store_file_packet: file downloaded successfully");
        tracker.set(DownloadFlag::Completed);
        ChunkOutcome::Completed {
            received: self.received,
            expected,
            overrun,
        }
    }
}

struct ExpectedLabel(Option<u32>);

impl core::fmt::Display for ExpectedLabel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Some(expected) => write!(f, "{:5}", expected),
            None => f.write_str("    ?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::types::AttemptPhase;

    fn requested_tracker() -> DownloadStateTracker {
        let mut tracker = DownloadStateTracker::new();
        tracker.set(DownloadFlag::WifiConnected);
        tracker.set(DownloadFlag::GetRequested);
        tracker
    }

    #[test]
    fn begin_attempt_zeroes_and_marks_downloading() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, Some(10));
        progress.record_chunk(&mut tracker, Some(&[0; 4]));
        assert_eq!(progress.received(), 4);

        progress.begin_attempt(&mut tracker, Some(20));
        assert_eq!(progress.received(), 0);
        assert_eq!(progress.expected(), Some(20));
        assert!(tracker.is_set(DownloadFlag::Downloading));
    }

    #[test]
    fn empty_and_missing_chunks_are_ignored() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, Some(10));

        assert_eq!(
            progress.record_chunk(&mut tracker, None),
            ChunkOutcome::Ignored(IgnoredChunk::Empty)
        );
        assert_eq!(
            progress.record_chunk(&mut tracker, Some(&[])),
            ChunkOutcome::Ignored(IgnoredChunk::Empty)
        );
        assert_eq!(progress.received(), 0);
        assert_eq!(tracker.phase(), AttemptPhase::Downloading);
    }

    #[test]
    fn reaching_expected_length_completes() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, Some(8));

        let first = progress.record_chunk(&mut tracker, Some(&[1; 5]));
        assert_eq!(
            first,
            ChunkOutcome::Progress {
                received: 5,
                expected: Some(8)
            }
        );
        let second = progress.record_chunk(&mut tracker, Some(&[1; 3]));
        assert!(second.completed());
        assert!(tracker.is_set(DownloadFlag::Completed));
    }

    #[test]
    fn overrun_is_reported() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, Some(4));
        let outcome = progress.record_chunk(&mut tracker, Some(&[0; 6]));
        assert_eq!(
            outcome,
            ChunkOutcome::Completed {
                received: 6,
                expected: 4,
                overrun: 2
            }
        );
    }

    #[test]
    fn unknown_length_never_completes_by_count() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, None);
        for _ in 0..4 {
            let outcome = progress.record_chunk(&mut tracker, Some(&[0; 64]));
            assert!(!outcome.completed());
        }
        assert_eq!(progress.received(), 256);
        assert!(!tracker.is_set(DownloadFlag::Completed));
    }

    #[test]
    fn announced_length_waits_for_first_byte() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.expect(Some(10));
        assert_eq!(tracker.phase(), AttemptPhase::Requested);
        assert_eq!(progress.expected(), Some(10));

        progress.record_chunk(&mut tracker, None);
        assert_eq!(tracker.phase(), AttemptPhase::Requested);

        progress.record_chunk(&mut tracker, Some(&[0; 4]));
        assert_eq!(tracker.phase(), AttemptPhase::Downloading);
        assert_eq!(progress.received(), 4);
        assert_eq!(progress.expected(), Some(10));
    }

    #[test]
    fn first_chunk_without_begin_starts_attempt() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        let outcome = progress.record_chunk(&mut tracker, Some(&[0; 3]));
        assert_eq!(
            outcome,
            ChunkOutcome::Progress {
                received: 3,
                expected: None
            }
        );
        assert!(tracker.is_set(DownloadFlag::Downloading));
    }

    #[test]
    fn one_shot_body_completes_in_one_call() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        let outcome = progress.record_one_shot(&mut tracker, Some(100), Some(&[7; 100]));
        assert!(outcome.completed());
        assert_eq!(progress.received(), 100);
    }

    #[test]
    fn chunks_after_completion_are_dropped() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.record_one_shot(&mut tracker, Some(2), Some(&[0; 2]));
        let late = progress.record_chunk(&mut tracker, Some(&[0; 5]));
        assert_eq!(late, ChunkOutcome::Ignored(IgnoredChunk::AttemptClosed));
        assert_eq!(progress.received(), 2);
    }

    #[test]
    fn received_is_monotonic_within_attempt() {
        let mut tracker = requested_tracker();
        let mut progress = Progress::new();
        progress.begin_attempt(&mut tracker, Some(1_000));
        let mut last = 0;
        for len in [10usize, 0, 200, 1, 0, 300] {
            let chunk = [0u8; 300];
            progress.record_chunk(&mut tracker, Some(&chunk[..len]));
            assert!(progress.received() >= last);
            last = progress.received();
        }
        assert_eq!(last, 511);
    }
}
