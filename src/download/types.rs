#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DownloadFlag {
    NotReady,
    WifiConnected,
    GetRequested,
    Downloading,
    Completed,
    Canceled,
}

impl DownloadFlag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotReady => "NOT_READY",
            Self::WifiConnected => "WIFI_CONNECTED",
            Self::GetRequested => "GET_REQUESTED",
            Self::Downloading => "DOWNLOADING",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
        }
    }
}

/// Lifecycle of one download attempt, independent of the link.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AttemptPhase {
    #[default]
    Idle,
    Requested,
    Downloading,
    Completed,
    Canceled,
}

impl AttemptPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requested => "requested",
            Self::Downloading => "downloading",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }

    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Requested | Self::Downloading)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadSnapshot {
    pub link_up: bool,
    pub phase: AttemptPhase,
}

impl DownloadSnapshot {
    pub const fn not_ready() -> Self {
        Self {
            link_up: false,
            phase: AttemptPhase::Idle,
        }
    }

    pub const fn is_set(self, flag: DownloadFlag) -> bool {
        match flag {
            DownloadFlag::NotReady => !self.link_up && matches!(self.phase, AttemptPhase::Idle),
            DownloadFlag::WifiConnected => self.link_up,
            DownloadFlag::GetRequested => !matches!(self.phase, AttemptPhase::Idle),
            DownloadFlag::Downloading => matches!(self.phase, AttemptPhase::Downloading),
            DownloadFlag::Completed => matches!(self.phase, AttemptPhase::Completed),
            DownloadFlag::Canceled => matches!(self.phase, AttemptPhase::Canceled),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DownloadApplyStatus {
    Applied,
    Unchanged,
    InvalidTransition,
}

impl DownloadApplyStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Unchanged => "unchanged",
            Self::InvalidTransition => "invalid_transition",
        }
    }
}
