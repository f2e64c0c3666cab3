use heapless::{String, Vec};
use wifetch::download::{
    config::DEFAULT_BUFFER_MAX, DisconnectReason, HttpEvent, HttpMethod, LinkEvent, LinkState,
    NetEvent, WifiCredentials,
};

use super::config::{HTTP_CHUNK_MAX, URL_MAX};

#[derive(Clone, Copy, Debug)]
pub(crate) enum LinkCommand {
    Connect(WifiCredentials),
}

#[derive(Clone, Debug)]
pub(crate) struct HttpRequest {
    pub(crate) url: String<URL_MAX>,
    pub(crate) method: HttpMethod,
}

/// Owned form of [`NetEvent`] that can cross an embassy channel.
#[derive(Debug)]
pub(crate) enum NetMessage {
    Link(LinkEvent),
    SocketConnected,
    Requested,
    Response {
        status: u16,
        content_length: Option<u32>,
        content: Option<Vec<u8, DEFAULT_BUFFER_MAX>>,
    },
    BodyChunk {
        data: Option<Vec<u8, HTTP_CHUNK_MAX>>,
        is_final: bool,
    },
    Disconnected(DisconnectReason),
}

impl NetMessage {
    pub(crate) fn link_up() -> Self {
        Self::Link(LinkEvent::StateChanged(LinkState::Connected))
    }

    pub(crate) fn link_down() -> Self {
        Self::Link(LinkEvent::StateChanged(LinkState::Disconnected))
    }

    pub(crate) fn chunk(data: &[u8], is_final: bool) -> Self {
        let data = if data.is_empty() {
            None
        } else {
            Vec::from_slice(data).ok()
        };
        Self::BodyChunk { data, is_final }
    }

    pub(crate) fn as_event(&self) -> NetEvent<'_> {
        match self {
            Self::Link(event) => NetEvent::Link(*event),
            Self::SocketConnected => HttpEvent::SocketConnected.into(),
            Self::Requested => HttpEvent::Requested.into(),
            Self::Response {
                status,
                content_length,
                content,
            } => HttpEvent::Response {
                status: *status,
                content_length: *content_length,
                content: content.as_deref(),
            }
            .into(),
            Self::BodyChunk { data, is_final } => HttpEvent::BodyChunk {
                data: data.as_deref(),
                is_final: *is_final,
            }
            .into(),
            Self::Disconnected(reason) => HttpEvent::Disconnected { reason: *reason }.into(),
        }
    }
}
