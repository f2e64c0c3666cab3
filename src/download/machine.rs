use statig::prelude::*;

use super::commands::DownloadCommand;
use super::types::{AttemptPhase, DownloadApplyStatus, DownloadSnapshot};

#[derive(Clone, Copy, Debug)]
pub(super) struct DownloadMachine {
    pub(super) snapshot: DownloadSnapshot,
}

#[derive(Clone, Copy, Debug)]
pub(super) struct DispatchContext {
    pub(super) status: DownloadApplyStatus,
}

impl Default for DispatchContext {
    fn default() -> Self {
        Self {
            status: DownloadApplyStatus::Unchanged,
        }
    }
}

impl DownloadMachine {
    pub(super) fn new() -> Self {
        Self {
            snapshot: DownloadSnapshot::not_ready(),
        }
    }

    fn set_link(&mut self, up: bool) -> DownloadApplyStatus {
        if self.snapshot.link_up == up {
            return DownloadApplyStatus::Unchanged;
        }
        self.snapshot.link_up = up;
        DownloadApplyStatus::Applied
    }

    fn advance(
        &mut self,
        context: &mut DispatchContext,
        phase: AttemptPhase,
        target: State,
    ) -> Outcome<State> {
        self.snapshot.phase = phase;
        context.status = DownloadApplyStatus::Applied;
        Transition(target)
    }

    fn reject(context: &mut DispatchContext) -> Outcome<State> {
        context.status = DownloadApplyStatus::InvalidTransition;
        Handled
    }

    fn keep(context: &mut DispatchContext) -> Outcome<State> {
        context.status = DownloadApplyStatus::Unchanged;
        Handled
    }

    fn reset(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        let before = self.snapshot;
        self.snapshot = DownloadSnapshot::not_ready();
        context.status = if before == self.snapshot {
            DownloadApplyStatus::Unchanged
        } else {
            DownloadApplyStatus::Applied
        };
        Transition(State::idle())
    }

    /// Link loss while a request is outstanding drops the attempt; terminal
    /// phases outlive the link until the watchdog resets them.
    fn link_lost_in_flight(&mut self, context: &mut DispatchContext) -> Outcome<State> {
        self.snapshot.link_up = false;
        self.advance(context, AttemptPhase::Idle, State::idle())
    }
}

#[state_machine(initial = "State::idle()")]
impl DownloadMachine {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &DownloadCommand) -> Outcome<State> {
        match event {
            DownloadCommand::LinkUp => {
                context.status = self.set_link(true);
                Handled
            }
            DownloadCommand::LinkDown => {
                context.status = self.set_link(false);
                Handled
            }
            DownloadCommand::RequestAcked => {
                self.advance(context, AttemptPhase::Requested, State::requested())
            }
            DownloadCommand::BodyStarted => {
                self.advance(context, AttemptPhase::Downloading, State::downloading())
            }
            DownloadCommand::Cancel => {
                self.advance(context, AttemptPhase::Canceled, State::canceled())
            }
            DownloadCommand::BodyCleared | DownloadCommand::AttemptAborted => Self::keep(context),
            DownloadCommand::Complete => Self::reject(context),
            DownloadCommand::Reset => self.reset(context),
        }
    }

    #[state]
    fn requested(
        &mut self,
        context: &mut DispatchContext,
        event: &DownloadCommand,
    ) -> Outcome<State> {
        match event {
            DownloadCommand::LinkUp => {
                context.status = self.set_link(true);
                Handled
            }
            DownloadCommand::LinkDown => self.link_lost_in_flight(context),
            DownloadCommand::RequestAcked | DownloadCommand::BodyCleared => Self::keep(context),
            DownloadCommand::BodyStarted => {
                self.advance(context, AttemptPhase::Downloading, State::downloading())
            }
            DownloadCommand::AttemptAborted => {
                self.advance(context, AttemptPhase::Idle, State::idle())
            }
            DownloadCommand::Complete => {
                self.advance(context, AttemptPhase::Completed, State::completed())
            }
            DownloadCommand::Cancel => {
                self.advance(context, AttemptPhase::Canceled, State::canceled())
            }
            DownloadCommand::Reset => self.reset(context),
        }
    }

    #[state]
    fn downloading(
        &mut self,
        context: &mut DispatchContext,
        event: &DownloadCommand,
    ) -> Outcome<State> {
        match event {
            DownloadCommand::LinkUp => {
                context.status = self.set_link(true);
                Handled
            }
            DownloadCommand::LinkDown => self.link_lost_in_flight(context),
            DownloadCommand::RequestAcked | DownloadCommand::BodyStarted => Self::keep(context),
            DownloadCommand::BodyCleared => {
                self.advance(context, AttemptPhase::Requested, State::requested())
            }
            DownloadCommand::AttemptAborted => {
                self.advance(context, AttemptPhase::Idle, State::idle())
            }
            DownloadCommand::Complete => {
                self.advance(context, AttemptPhase::Completed, State::completed())
            }
            DownloadCommand::Cancel => {
                self.advance(context, AttemptPhase::Canceled, State::canceled())
            }
            DownloadCommand::Reset => self.reset(context),
        }
    }

    #[state]
    fn completed(
        &mut self,
        context: &mut DispatchContext,
        event: &DownloadCommand,
    ) -> Outcome<State> {
        match event {
            DownloadCommand::LinkUp => {
                context.status = self.set_link(true);
                Handled
            }
            DownloadCommand::LinkDown => {
                context.status = self.set_link(false);
                Handled
            }
            DownloadCommand::Complete => Self::keep(context),
            DownloadCommand::Reset => self.reset(context),
            _ => Self::reject(context),
        }
    }

    #[state]
    fn canceled(
        &mut self,
        context: &mut DispatchContext,
        event: &DownloadCommand,
    ) -> Outcome<State> {
        match event {
            DownloadCommand::LinkUp => {
                context.status = self.set_link(true);
                Handled
            }
            DownloadCommand::LinkDown => {
                context.status = self.set_link(false);
                Handled
            }
            DownloadCommand::Cancel => Self::keep(context),
            DownloadCommand::Reset => self.reset(context),
            _ => Self::reject(context),
        }
    }
}
