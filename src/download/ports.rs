use super::config::WifiCredentials;
use super::events::SocketEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError {
    Busy,
    InvalidUrl,
    Transport,
}

impl EngineError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::InvalidUrl => "invalid_url",
            Self::Transport => "transport",
        }
    }
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkError {
    Full,
    Write,
}

impl SinkError {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Write => "write",
        }
    }
}

impl core::fmt::Display for SinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wi-Fi driver operations. Results arrive later as link events.
pub trait LinkControl {
    fn connect(&mut self, credentials: &WifiCredentials);
    fn request_address(&mut self);
}

/// HTTP client engine. Requests are fire-and-forget; the engine reports
/// progress through HTTP events.
pub trait HttpEngine {
    fn send_request(&mut self, url: &str, method: HttpMethod) -> Result<(), EngineError>;
    fn close(&mut self);
    fn relay_socket_event(&mut self, event: SocketEvent);
    fn relay_resolved(&mut self, host: &str, address: [u8; 4]);
}

/// Destination of the response body.
pub trait BodySink {
    fn store(&mut self, chunk: &[u8]) -> Result<(), SinkError>;
}

/// Sink that keeps nothing but a byte count.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink {
    stored: u64,
}

impl DiscardSink {
    pub fn stored(&self) -> u64 {
        self.stored
    }
}

impl BodySink for DiscardSink {
    fn store(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        self.stored = self.stored.saturating_add(chunk.len() as u64);
        Ok(())
    }
}

pub struct Ports<L, H, S> {
    pub link: L,
    pub http: H,
    pub sink: S,
}

impl<L, H, S> Ports<L, H, S> {
    pub const fn new(link: L, http: H, sink: S) -> Self {
        Self { link, http, sink }
    }
}
