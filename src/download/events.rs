#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    StateChanged(LinkState),
    AddressAssigned([u8; 4]),
}

/// errno-style reason attached to an HTTP engine disconnect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisconnectReason(pub i32);

impl DisconnectReason {
    pub const IO: Self = Self(-5);
    /// Server never answered the request.
    pub const AGAIN: Self = Self(-11);
    pub const CONNECTION_ABORTED: Self = Self(-103);
    /// Server closed the connection; normal after a finished transfer.
    pub const CONNECTION_RESET: Self = Self(-104);
    pub const HOST_UNREACHABLE: Self = Self(-113);

    pub const fn code(self) -> i32 {
        self.0
    }

    pub const fn is_retry_eligible(self) -> bool {
        self.0 == Self::AGAIN.0
    }

    pub const fn as_str(self) -> &'static str {
        match self.0 {
            -5 => "io",
            -11 => "no_response",
            -103 => "connection_aborted",
            -104 => "connection_reset",
            -113 => "host_unreachable",
            _ => "other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpEvent<'a> {
    SocketConnected,
    Requested,
    Response {
        status: u16,
        content_length: Option<u32>,
        content: Option<&'a [u8]>,
    },
    BodyChunk {
        data: Option<&'a [u8]>,
        is_final: bool,
    },
    Disconnected {
        reason: DisconnectReason,
    },
}

/// Raw socket notification owned by the HTTP engine; the core only relays it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocketEvent {
    pub socket: u8,
    pub message: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetEvent<'a> {
    Link(LinkEvent),
    Http(HttpEvent<'a>),
    Resolved { host: &'a str, address: [u8; 4] },
    Socket(SocketEvent),
}

impl<'a> From<LinkEvent> for NetEvent<'a> {
    fn from(event: LinkEvent) -> Self {
        Self::Link(event)
    }
}

impl<'a> From<HttpEvent<'a>> for NetEvent<'a> {
    fn from(event: HttpEvent<'a>) -> Self {
        Self::Http(event)
    }
}

/// Dotted-quad formatter for log lines.
pub struct Ipv4Display(pub [u8; 4]);

impl core::fmt::Display for Ipv4Display {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}
