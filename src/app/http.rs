use embassy_futures::select::{select, Either};
use embassy_net::{
    dns::DnsSocket,
    tcp::client::{TcpClient, TcpClientState},
    Stack,
};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;
use heapless::Vec;
use log::{info, warn};
use reqwless::{client::HttpClient, request::Method};
use static_cell::StaticCell;
use wifetch::download::{config::DEFAULT_BUFFER_MAX, DisconnectReason, HttpMethod};

use super::{
    config::{
        HTTP_CHUNK_MAX, HTTP_CLOSE, HTTP_HEADER_MAX, HTTP_REQUESTS, HTTP_RW_BUF,
        HTTP_SOCKET_TIMEOUT_SECS, NET_EVENTS,
    },
    messages::{HttpRequest, NetMessage},
};

type Tcp<'d> = TcpClient<'d, 1, HTTP_RW_BUF, HTTP_RW_BUF>;

/// GET client on reqwless. One request at a time; every stage of the
/// exchange is reported on `NET_EVENTS`, failures as a disconnect reason.
#[embassy_executor::task]
pub(crate) async fn http_engine_task(stack: Stack<'static>, inline_max: usize) {
    static CLIENT_STATE: StaticCell<TcpClientState<1, HTTP_RW_BUF, HTTP_RW_BUF>> =
        StaticCell::new();
    static HEADER_BUFFER: StaticCell<[u8; HTTP_HEADER_MAX]> = StaticCell::new();

    let tcp = TcpClient::new(stack, CLIENT_STATE.init(TcpClientState::new()));
    let dns = DnsSocket::new(stack);
    let header_buffer = HEADER_BUFFER.init([0u8; HTTP_HEADER_MAX]);

    loop {
        let request = HTTP_REQUESTS.receive().await;
        HTTP_CLOSE.reset();

        let exchange = run_request(&tcp, &dns, &request, &mut header_buffer[..], inline_max);
        let result = match select(exchange, HTTP_CLOSE.wait()).await {
            Either::First(result) => result,
            Either::Second(()) => {
                info!("http: closed by downloader");
                Ok(())
            }
        };
        if let Err(reason) = result {
            warn!("http: request failed {} ({})", reason.code(), reason.as_str());
            NET_EVENTS.send(NetMessage::Disconnected(reason)).await;
        }
    }
}

async fn run_request(
    tcp: &Tcp<'_>,
    dns: &DnsSocket<'_>,
    request: &HttpRequest,
    header_buf: &mut [u8],
    inline_max: usize,
) -> Result<(), DisconnectReason> {
    let method = match request.method {
        HttpMethod::Get => Method::GET,
    };
    info!("http: {} {}", request.method.as_str(), request.url.as_str());

    let mut client = HttpClient::new(tcp, dns);
    let mut handle = timed(client.request(method, request.url.as_str()))
        .await?
        .map_err(engine_reason)?
        .headers(&[("User-Agent", "wifetch")]);
    NET_EVENTS.send(NetMessage::SocketConnected).await;

    let response = timed(handle.send(header_buf))
        .await?
        .map_err(engine_reason)?;
    NET_EVENTS.send(NetMessage::Requested).await;

    let status = response.status.0;
    let content_length = response
        .content_length
        .and_then(|len| u32::try_from(len).ok());

    if status != 200 {
        NET_EVENTS
            .send(NetMessage::Response {
                status,
                content_length,
                content: None,
            })
            .await;
        return Ok(());
    }

    let mut reader = response.body().reader();
    let mut chunk = [0u8; HTTP_CHUNK_MAX];

    if let Some(len) = content_length.filter(|len| *len as usize <= inline_max) {
        let mut content: Vec<u8, DEFAULT_BUFFER_MAX> = Vec::new();
        while content.len() < len as usize {
            let want = (len as usize - content.len()).min(chunk.len());
            let n = timed(reader.read(&mut chunk[..want]))
                .await?
                .map_err(|_| DisconnectReason::CONNECTION_RESET)?;
            if n == 0 {
                return Err(DisconnectReason::CONNECTION_RESET);
            }
            content
                .extend_from_slice(&chunk[..n])
                .map_err(|_| DisconnectReason::IO)?;
        }
        NET_EVENTS
            .send(NetMessage::Response {
                status,
                content_length,
                content: Some(content),
            })
            .await;
        return Ok(());
    }

    NET_EVENTS
        .send(NetMessage::Response {
            status,
            content_length,
            content: None,
        })
        .await;

    let mut received = 0usize;
    loop {
        if content_length.is_some_and(|len| received >= len as usize) {
            return Ok(());
        }
        let n = timed(reader.read(&mut chunk))
            .await?
            .map_err(|_| DisconnectReason::CONNECTION_RESET)?;
        if n == 0 {
            if content_length.is_some() {
                warn!("http: body ended after {} bytes", received);
                return Err(DisconnectReason::CONNECTION_RESET);
            }
            NET_EVENTS.send(NetMessage::chunk(&[], true)).await;
            return Ok(());
        }
        received += n;
        NET_EVENTS.send(NetMessage::chunk(&chunk[..n], false)).await;
    }
}

async fn timed<F: core::future::Future>(future: F) -> Result<F::Output, DisconnectReason> {
    with_timeout(Duration::from_secs(HTTP_SOCKET_TIMEOUT_SECS), future)
        .await
        .map_err(|_| DisconnectReason::AGAIN)
}

fn engine_reason(err: reqwless::Error) -> DisconnectReason {
    match err {
        reqwless::Error::Dns => DisconnectReason::HOST_UNREACHABLE,
        reqwless::Error::Network(_) => DisconnectReason::CONNECTION_RESET,
        other => {
            warn!("http: engine error {:?}", other);
            DisconnectReason::IO
        }
    }
}
