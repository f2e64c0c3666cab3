use embassy_time::Instant;
use heapless::String;
use log::{debug, warn};
use wifetch::download::{
    EngineError, HttpEngine, HttpMethod, LinkControl, MonotonicClock, SocketEvent,
    WifiCredentials,
};

use super::{
    config::{ADDRESS_REQUESTS, HTTP_CLOSE, HTTP_REQUESTS, LINK_COMMANDS},
    messages::{HttpRequest, LinkCommand},
};

pub(crate) struct EmbassyClock;

impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

pub(crate) struct ChannelLink;

impl LinkControl for ChannelLink {
    fn connect(&mut self, credentials: &WifiCredentials) {
        if LINK_COMMANDS
            .try_send(LinkCommand::Connect(*credentials))
            .is_err()
        {
            warn!("link: connect already queued");
        }
    }

    fn request_address(&mut self) {
        if ADDRESS_REQUESTS.try_send(()).is_err() {
            warn!("link: address request already queued");
        }
    }
}

pub(crate) struct ChannelHttp;

impl HttpEngine for ChannelHttp {
    fn send_request(&mut self, url: &str, method: HttpMethod) -> Result<(), EngineError> {
        let mut owned = String::new();
        owned.push_str(url).map_err(|_| EngineError::InvalidUrl)?;
        HTTP_REQUESTS
            .try_send(HttpRequest { url: owned, method })
            .map_err(|_| EngineError::Busy)
    }

    fn close(&mut self) {
        HTTP_CLOSE.signal(());
    }

    // The socket layer is owned by embassy-net; nothing to forward.
    fn relay_socket_event(&mut self, event: SocketEvent) {
        debug!("http: socket {} msg {}", event.socket, event.message);
    }

    fn relay_resolved(&mut self, host: &str, address: [u8; 4]) {
        debug!(
            "http: {} resolved to {}",
            host,
            wifetch::download::events::Ipv4Display(address)
        );
    }
}
