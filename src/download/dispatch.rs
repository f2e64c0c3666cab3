use log::{debug, info, warn};

use super::context::DownloadContext;
use super::events::{HttpEvent, Ipv4Display, LinkEvent, LinkState, NetEvent};
use super::orchestrator::start_download;
use super::ports::{BodySink, HttpEngine, LinkControl, Ports};
use super::progress::{ChunkOutcome, IgnoredChunk};
use super::types::DownloadFlag;

pub const HTTP_STATUS_OK: u16 = 200;

/// Routes one network notification into state and progress updates.
pub fn dispatch<L, H, S>(
    ctx: &mut DownloadContext,
    ports: &mut Ports<L, H, S>,
    now_ms: u64,
    event: NetEvent<'_>,
) where
    L: LinkControl,
    H: HttpEngine,
    S: BodySink,
{
    let before = ctx.state.phase();
    ctx.mark_activity(now_ms);
    match event {
        NetEvent::Link(event) => handle_link(ctx, ports, event),
        NetEvent::Http(event) => handle_http(ctx, ports, event),
        NetEvent::Resolved { host, address } => {
            info!("resolve_cb: {} IP address is {}", host, Ipv4Display(address));
            ports.http.relay_resolved(host, address);
        }
        NetEvent::Socket(event) => {
            debug!(
                "socket_cb: socket={} msg={}",
                event.socket, event.message
            );
            ports.http.relay_socket_event(event);
        }
    }
    ctx.settle(before);
}

fn handle_link<L, H, S>(ctx: &mut DownloadContext, ports: &mut Ports<L, H, S>, event: LinkEvent)
where
    L: LinkControl,
    H: HttpEngine,
{
    match event {
        LinkEvent::StateChanged(LinkState::Connected) => {
            info!("wifi_cb: connected");
            ports.link.request_address();
        }
        LinkEvent::StateChanged(LinkState::Disconnected) => {
            info!("wifi_cb: disconnected");
            if ctx.state.is_set(DownloadFlag::WifiConnected) {
                ctx.telemetry.record_link_loss();
            }
            ctx.take_outstanding();
            ctx.clear(DownloadFlag::WifiConnected);
            ports.link.connect(&ctx.config.credentials);
        }
        LinkEvent::AddressAssigned(address) => {
            info!("wifi_cb: IP address is {}", Ipv4Display(address));
            ctx.set(DownloadFlag::WifiConnected);
            start_download(ctx, &mut ports.http);
        }
    }
}

fn handle_http<L, H, S>(ctx: &mut DownloadContext, ports: &mut Ports<L, H, S>, event: HttpEvent<'_>)
where
    H: HttpEngine,
    S: BodySink,
{
    match event {
        HttpEvent::SocketConnected => {
            info!("http_client_callback: HTTP client socket connected");
        }
        HttpEvent::Requested => {
            info!("http_client_callback: request completed");
            ctx.take_outstanding();
            ctx.set(DownloadFlag::GetRequested);
        }
        HttpEvent::Response {
            status,
            content_length,
            content,
        } => {
            match content_length {
                Some(len) => info!(
                    "http_client_callback: received response {} data size {}",
                    status, len
                ),
                None => info!(
                    "http_client_callback: received response {} data size unknown",
                    status
                ),
            }
            if status != HTTP_STATUS_OK {
                ctx.set(DownloadFlag::Canceled);
                return;
            }

            match content_length {
                Some(len) if len as usize <= ctx.config.buffer_max => {
                    info!("http_client_callback: body arrived with headers; saving and closing");
                    store(ctx, &mut ports.sink, content);
                    let outcome = ctx.progress.record_one_shot(&mut ctx.state, Some(len), content);
                    account(ctx, outcome, content);
                    ports.http.close();
                    ctx.set(DownloadFlag::Completed);
                }
                _ => ctx.progress.expect(content_length),
            }
        }
        HttpEvent::BodyChunk { data, is_final } => {
            if ctx.state.phase().is_terminal() {
                warn!(
                    "http_client_callback: chunk after attempt {}; dropped",
                    ctx.state.phase().as_str()
                );
                ctx.telemetry.record_late_chunk();
                return;
            }
            store(ctx, &mut ports.sink, data);
            let outcome = ctx.progress.record_chunk(&mut ctx.state, data);
            account(ctx, outcome, data);

            if is_final {
                info!("http_client_callback: final chunk; closing connection");
                ports.http.close();
                ctx.set(DownloadFlag::Completed);
            }
        }
        HttpEvent::Disconnected { reason } => {
            info!(
                "http_client_callback: disconnect code {} ({})",
                reason.code(),
                reason.as_str()
            );
            let phase = ctx.state.phase();
            let unacknowledged = ctx.take_outstanding();
            if !reason.is_retry_eligible() {
                if unacknowledged && !phase.is_terminal() {
                    // The request never left; nothing else would restart it.
                    warn!("http_client_callback: request failed before it was sent; canceling");
                    ctx.telemetry.record_other_disconnect();
                    ctx.set(DownloadFlag::Canceled);
                } else if phase.is_in_flight() {
                    ctx.telemetry.record_other_disconnect();
                }
                return;
            }
            if phase.is_terminal() {
                info!(
                    "http_client_callback: attempt already {}; no retry",
                    phase.as_str()
                );
                return;
            }

            ctx.telemetry.record_retry_now();
            ctx.clear(DownloadFlag::Downloading);
            ctx.clear(DownloadFlag::GetRequested);
            start_download(ctx, &mut ports.http);
        }
    }
}

fn store<S: BodySink>(ctx: &DownloadContext, sink: &mut S, data: Option<&[u8]>) {
    let Some(data) = data.filter(|data| !data.is_empty()) else {
        return;
    };
    if let Err(err) = sink.store(data) {
        warn!("store_file_packet: sink refused {} bytes: {}", data.len(), err);
        ctx.telemetry.record_sink_error();
    }
}

fn account(ctx: &DownloadContext, outcome: ChunkOutcome, data: Option<&[u8]>) {
    match outcome {
        ChunkOutcome::Ignored(IgnoredChunk::Empty) => ctx.telemetry.record_empty_chunk(),
        ChunkOutcome::Ignored(IgnoredChunk::AttemptClosed) => ctx.telemetry.record_late_chunk(),
        ChunkOutcome::Progress { .. } | ChunkOutcome::Completed { .. } => {
            ctx.telemetry.record_bytes(data.map_or(0, <[u8]>::len));
        }
    }
}
