//! Full download cycles through the public API with in-memory ports.

use std::cell::Cell;
use std::rc::Rc;

use wifetch::download::{
    BodySink, DisconnectReason, DownloadConfig, DownloadFlag, Downloader, EngineError,
    HttpEngine, HttpEvent, HttpMethod, LinkControl, LinkEvent, LinkState, MonotonicClock,
    NetEvent, Ports, SinkError, SocketEvent, StartOutcome, WifiCredentials,
};

#[derive(Clone, Default)]
struct SharedClock(Rc<Cell<u64>>);

impl SharedClock {
    fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl MonotonicClock for SharedClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Default)]
struct NullLink;

impl LinkControl for NullLink {
    fn connect(&mut self, _credentials: &WifiCredentials) {}
    fn request_address(&mut self) {}
}

#[derive(Default)]
struct CountingHttp {
    requests: u32,
    closes: u32,
}

impl HttpEngine for CountingHttp {
    fn send_request(&mut self, _url: &str, _method: HttpMethod) -> Result<(), EngineError> {
        self.requests += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.closes += 1;
    }

    fn relay_socket_event(&mut self, _event: SocketEvent) {}
    fn relay_resolved(&mut self, _host: &str, _address: [u8; 4]) {}
}

#[derive(Default)]
struct VecSink(Vec<u8>);

impl BodySink for VecSink {
    fn store(&mut self, chunk: &[u8]) -> Result<(), SinkError> {
        self.0.extend_from_slice(chunk);
        Ok(())
    }
}

type Rig = Downloader<SharedClock, NullLink, CountingHttp, VecSink>;

fn rig(config: DownloadConfig) -> (Rig, SharedClock) {
    let clock = SharedClock::default();
    let ports = Ports::new(NullLink, CountingHttp::default(), VecSink::default());
    let mut downloader = Downloader::new(config, ports, clock.clone());
    downloader.boot();
    downloader.handle_event(LinkEvent::StateChanged(LinkState::Connected).into());
    downloader.handle_event(LinkEvent::AddressAssigned([10, 0, 0, 5]).into());
    (downloader, clock)
}

fn stream_body(downloader: &mut Rig, content_length: Option<u32>, body: &[u8], chunk_len: usize) {
    downloader.handle_event(HttpEvent::Requested.into());
    downloader.handle_event(NetEvent::Http(HttpEvent::Response {
        status: 200,
        content_length,
        content: None,
    }));
    for piece in body.chunks(chunk_len) {
        downloader.handle_event(
            HttpEvent::BodyChunk {
                data: Some(piece),
                is_final: false,
            }
            .into(),
        );
    }
}

#[test]
fn sized_body_streams_into_sink() {
    let config = DownloadConfig {
        buffer_max: 128,
        ..DownloadConfig::defaults()
    };
    let (mut downloader, _clock) = rig(config);

    let body: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    stream_body(&mut downloader, Some(1000), &body, 256);

    assert!(downloader.snapshot().is_set(DownloadFlag::Completed));
    let sink = &downloader.ports().sink.0;
    assert_eq!(sink.len(), 1000);
    assert_eq!(sink[250], 250);
    assert_eq!(sink[251], 0);
}

#[test]
fn repeated_cycles_count_in_telemetry() {
    let (mut downloader, clock) = rig(DownloadConfig::defaults());

    downloader.handle_event(HttpEvent::Requested.into());
    downloader.handle_event(
        HttpEvent::Response {
            status: 200,
            content_length: Some(5),
            content: Some(b"hello"),
        }
        .into(),
    );

    clock.advance(40_001);
    let report = downloader.poll_timers();
    assert_eq!(report.restarted, Some(StartOutcome::Issued));

    downloader.handle_event(HttpEvent::Requested.into());
    downloader.handle_event(
        HttpEvent::Disconnected {
            reason: DisconnectReason::AGAIN,
        }
        .into(),
    );
    downloader.handle_event(HttpEvent::Requested.into());
    downloader.handle_event(
        HttpEvent::Response {
            status: 503,
            content_length: None,
            content: None,
        }
        .into(),
    );

    clock.advance(60_001);
    assert_eq!(downloader.poll_timers().restarted, Some(StartOutcome::Issued));

    let telemetry = downloader.context().telemetry.snapshot();
    assert_eq!(telemetry.requests_issued, 4);
    assert_eq!(telemetry.completions, 1);
    assert_eq!(telemetry.cancellations, 1);
    assert_eq!(telemetry.retry_now, 1);
    assert_eq!(telemetry.watchdog_restarts, 2);
    assert_eq!(telemetry.rejected_transitions, 0);
    assert_eq!(downloader.ports().http.requests, 4);
    assert_eq!(downloader.ports().sink.0, b"hello");
}

#[test]
fn unsized_body_completes_on_final_chunk() {
    let (mut downloader, _clock) = rig(DownloadConfig::defaults());

    let body = [7u8; 3000];
    stream_body(&mut downloader, None, &body, 1024);
    assert!(downloader.snapshot().is_set(DownloadFlag::Downloading));
    assert!(!downloader.snapshot().is_set(DownloadFlag::Completed));

    downloader.handle_event(
        HttpEvent::BodyChunk {
            data: None,
            is_final: true,
        }
        .into(),
    );
    assert!(downloader.snapshot().is_set(DownloadFlag::Completed));
    assert_eq!(downloader.ports().sink.0.len(), 3000);
    assert_eq!(downloader.ports().http.closes, 1);
}
