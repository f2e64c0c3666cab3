use log::{info, warn};
use statig::blocking::IntoStateMachineExt as _;

use super::commands::DownloadCommand;
use super::machine::{DispatchContext, DownloadMachine};
use super::types::{AttemptPhase, DownloadApplyStatus, DownloadFlag, DownloadSnapshot};

#[derive(Clone, Copy, Debug)]
pub struct DownloadApplyResult {
    pub before: DownloadSnapshot,
    pub after: DownloadSnapshot,
    pub status: DownloadApplyStatus,
}

impl DownloadApplyResult {
    pub fn changed(self) -> bool {
        matches!(self.status, DownloadApplyStatus::Applied)
    }

    pub fn rejected(self) -> bool {
        matches!(self.status, DownloadApplyStatus::InvalidTransition)
    }

    pub fn phase_changed(self) -> bool {
        self.before.phase != self.after.phase
    }
}

/// Progress flags of one download attempt.
///
/// Flags are a view over a closed state: the link bit plus an
/// [`AttemptPhase`] driven by a transition table. Requests that the table
/// does not allow (for example `Completed` while `Canceled`) leave the state
/// untouched and report [`DownloadApplyStatus::InvalidTransition`].
pub struct DownloadStateTracker {
    machine: statig::blocking::StateMachine<DownloadMachine>,
}

impl Default for DownloadStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadStateTracker {
    pub fn new() -> Self {
        Self {
            machine: DownloadMachine::new().state_machine(),
        }
    }

    pub fn snapshot(&self) -> DownloadSnapshot {
        self.machine.inner().snapshot
    }

    pub fn phase(&self) -> AttemptPhase {
        self.snapshot().phase
    }

    pub fn is_set(&self, flag: DownloadFlag) -> bool {
        self.snapshot().is_set(flag)
    }

    pub fn reset(&mut self) -> DownloadApplyResult {
        self.apply(DownloadCommand::Reset)
    }

    pub fn set(&mut self, flag: DownloadFlag) -> DownloadApplyResult {
        let command = match flag {
            DownloadFlag::NotReady => DownloadCommand::Reset,
            DownloadFlag::WifiConnected => DownloadCommand::LinkUp,
            DownloadFlag::GetRequested => DownloadCommand::RequestAcked,
            DownloadFlag::Downloading => DownloadCommand::BodyStarted,
            DownloadFlag::Completed => DownloadCommand::Complete,
            DownloadFlag::Canceled => DownloadCommand::Cancel,
        };
        self.logged("set", flag, command)
    }

    pub fn clear(&mut self, flag: DownloadFlag) -> DownloadApplyResult {
        let command = match flag {
            DownloadFlag::WifiConnected => DownloadCommand::LinkDown,
            DownloadFlag::GetRequested => DownloadCommand::AttemptAborted,
            DownloadFlag::Downloading => DownloadCommand::BodyCleared,
            DownloadFlag::NotReady | DownloadFlag::Completed | DownloadFlag::Canceled => {
                let snapshot = self.snapshot();
                let status = if snapshot.is_set(flag) || matches!(flag, DownloadFlag::NotReady) {
                    DownloadApplyStatus::InvalidTransition
                } else {
                    DownloadApplyStatus::Unchanged
                };
                let result = DownloadApplyResult {
                    before: snapshot,
                    after: snapshot,
                    status,
                };
                if result.rejected() {
                    warn!("state: clear {} rejected; only reset leaves it", flag.as_str());
                }
                return result;
            }
        };
        self.logged("clear", flag, command)
    }

    fn logged(
        &mut self,
        verb: &str,
        flag: DownloadFlag,
        command: DownloadCommand,
    ) -> DownloadApplyResult {
        let result = self.apply(command);
        match result.status {
            DownloadApplyStatus::Applied => info!(
                "state: {} {} -> phase={} link={}",
                verb,
                flag.as_str(),
                result.after.phase.as_str(),
                result.after.link_up
            ),
            DownloadApplyStatus::Unchanged => {}
            DownloadApplyStatus::InvalidTransition => warn!(
                "state: {} {} rejected in phase={}",
                verb,
                flag.as_str(),
                result.before.phase.as_str()
            ),
        }
        result
    }

    fn apply(&mut self, command: DownloadCommand) -> DownloadApplyResult {
        let before = self.snapshot();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&command, &mut context);
        let after = self.snapshot();
        DownloadApplyResult {
            before,
            after,
            status: context.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn downloading_tracker() -> DownloadStateTracker {
        let mut tracker = DownloadStateTracker::new();
        tracker.set(DownloadFlag::WifiConnected);
        tracker.set(DownloadFlag::GetRequested);
        tracker.set(DownloadFlag::Downloading);
        tracker
    }

    #[test]
    fn starts_not_ready() {
        let tracker = DownloadStateTracker::new();
        assert!(tracker.is_set(DownloadFlag::NotReady));
        assert!(!tracker.is_set(DownloadFlag::WifiConnected));
        assert!(!tracker.is_set(DownloadFlag::GetRequested));
    }

    #[test]
    fn request_then_body_walks_phases() {
        let tracker = downloading_tracker();
        assert!(tracker.is_set(DownloadFlag::WifiConnected));
        assert!(tracker.is_set(DownloadFlag::GetRequested));
        assert!(tracker.is_set(DownloadFlag::Downloading));
        assert!(!tracker.is_set(DownloadFlag::NotReady));
    }

    #[test]
    fn terminal_states_are_mutually_exclusive() {
        let mut tracker = downloading_tracker();
        assert!(tracker.set(DownloadFlag::Completed).changed());
        let cancel = tracker.set(DownloadFlag::Canceled);
        assert!(cancel.rejected());
        assert!(tracker.is_set(DownloadFlag::Completed));
        assert!(!tracker.is_set(DownloadFlag::Canceled));
    }

    #[test]
    fn completion_requires_an_attempt() {
        let mut tracker = DownloadStateTracker::new();
        tracker.set(DownloadFlag::WifiConnected);
        assert!(tracker.set(DownloadFlag::Completed).rejected());
        assert_eq!(tracker.phase(), AttemptPhase::Idle);
    }

    #[test]
    fn repeated_set_reports_unchanged() {
        let mut tracker = DownloadStateTracker::new();
        assert!(tracker.set(DownloadFlag::WifiConnected).changed());
        let again = tracker.set(DownloadFlag::WifiConnected);
        assert!(matches!(again.status, DownloadApplyStatus::Unchanged));
    }

    #[test]
    fn link_loss_clears_in_flight_flags() {
        let mut tracker = downloading_tracker();
        let result = tracker.clear(DownloadFlag::WifiConnected);
        assert!(result.changed());
        assert!(!tracker.is_set(DownloadFlag::WifiConnected));
        assert!(!tracker.is_set(DownloadFlag::Downloading));
        assert!(!tracker.is_set(DownloadFlag::GetRequested));
    }

    #[test]
    fn link_loss_keeps_terminal_phase() {
        let mut tracker = downloading_tracker();
        tracker.set(DownloadFlag::Completed);
        tracker.clear(DownloadFlag::WifiConnected);
        assert!(tracker.is_set(DownloadFlag::Completed));
        assert!(!tracker.is_set(DownloadFlag::WifiConnected));
    }

    #[test]
    fn clearing_body_then_request_returns_to_idle() {
        let mut tracker = downloading_tracker();
        assert!(tracker.clear(DownloadFlag::Downloading).changed());
        assert_eq!(tracker.phase(), AttemptPhase::Requested);
        assert!(tracker.clear(DownloadFlag::GetRequested).changed());
        assert_eq!(tracker.phase(), AttemptPhase::Idle);
        assert!(tracker.is_set(DownloadFlag::WifiConnected));
    }

    #[test]
    fn terminal_flags_only_leave_through_reset() {
        let mut tracker = downloading_tracker();
        tracker.set(DownloadFlag::Canceled);
        assert!(tracker.clear(DownloadFlag::Canceled).rejected());
        assert!(tracker.clear(DownloadFlag::GetRequested).rejected());
        assert!(tracker.is_set(DownloadFlag::Canceled));

        assert!(tracker.reset().changed());
        assert!(tracker.is_set(DownloadFlag::NotReady));
    }

    #[test]
    fn clearing_absent_terminal_flag_is_a_no_op() {
        let mut tracker = downloading_tracker();
        let result = tracker.clear(DownloadFlag::Completed);
        assert!(matches!(result.status, DownloadApplyStatus::Unchanged));
        assert_eq!(tracker.phase(), AttemptPhase::Downloading);
    }

    #[test]
    fn reset_of_fresh_tracker_is_unchanged() {
        let mut tracker = DownloadStateTracker::new();
        assert!(matches!(
            tracker.reset().status,
            DownloadApplyStatus::Unchanged
        ));
    }
}
