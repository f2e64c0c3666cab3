use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel, signal::Signal};

use super::messages::{HttpRequest, LinkCommand, NetMessage};

pub(crate) const DOWNLOAD_POLL_MS: u64 = 100;
pub(crate) const INTERNAL_HEAP_BYTES: usize = 72 * 1024;
pub(crate) const HTTP_RW_BUF: usize = 2048;
pub(crate) const HTTP_HEADER_MAX: usize = 2048;
pub(crate) const HTTP_CHUNK_MAX: usize = 1024;
pub(crate) const HTTP_SOCKET_TIMEOUT_SECS: u64 = 20;
pub(crate) const URL_MAX: usize = 256;
pub(crate) const WIFI_RETRY_DELAY_SECS: u64 = 3;

pub(crate) static NET_EVENTS: Channel<CriticalSectionRawMutex, NetMessage, 4> = Channel::new();
pub(crate) static LINK_COMMANDS: Channel<CriticalSectionRawMutex, LinkCommand, 2> =
    Channel::new();
pub(crate) static ADDRESS_REQUESTS: Channel<CriticalSectionRawMutex, (), 2> = Channel::new();
pub(crate) static HTTP_REQUESTS: Channel<CriticalSectionRawMutex, HttpRequest, 1> =
    Channel::new();
pub(crate) static HTTP_CLOSE: Signal<CriticalSectionRawMutex, ()> = Signal::new();
