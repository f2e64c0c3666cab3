pub mod config;
pub mod context;
pub mod dispatch;
pub mod events;
pub mod orchestrator;
pub mod ports;
pub mod progress;
pub mod telemetry;
pub mod timer;
pub mod tracker;
pub mod types;

mod commands;
mod machine;


pub use config::{AuthMode, ConfigError, DownloadConfig, InitError, WifiCredentials};
pub use context::DownloadContext;
pub use dispatch::dispatch;
pub use events::{DisconnectReason, HttpEvent, LinkEvent, LinkState, NetEvent, SocketEvent};
pub use orchestrator::{start_download, Downloader, StartOutcome, TickReport};
pub use ports::{
    BodySink, DiscardSink, EngineError, HttpEngine, HttpMethod, LinkControl, Ports, SinkError,
};
pub use progress::{ChunkOutcome, IgnoredChunk, Progress};
pub use telemetry::{DownloadTelemetry, TelemetrySnapshot};
pub use timer::{Countdown, MonotonicClock};
pub use tracker::{DownloadApplyResult, DownloadStateTracker};
pub use types::{AttemptPhase, DownloadApplyStatus, DownloadFlag, DownloadSnapshot};
