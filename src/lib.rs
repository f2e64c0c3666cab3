#![cfg_attr(not(test), no_std)]

pub mod download;
pub mod url;

pub use download::{
    dispatch, start_download, AttemptPhase, ChunkOutcome, DownloadApplyResult,
    DownloadApplyStatus, DownloadConfig, DownloadContext, DownloadFlag, Downloader,
    DownloadStateTracker, NetEvent, StartOutcome, TickReport,
};
