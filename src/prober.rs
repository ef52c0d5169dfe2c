use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Empty;
use hyper::ext::ReasonPhrase;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tokio::time;
use tracing::debug;

use crate::types::Outcome;

/// Transport-level failure of a single probe. Each variant maps to a
/// space-free marker that is counted in the tally like a status code.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),
    #[error("handshake failed: {0}")]
    Handshake(#[source] hyper::Error),
    #[error("invalid request: {0}")]
    Build(#[source] http::Error),
    #[error("request failed: {0}")]
    Request(#[source] hyper::Error),
    #[error("no response within {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("probe task ended without a result")]
    Aborted,
}

impl ProbeError {
    pub fn marker(&self) -> &'static str {
        match self {
            ProbeError::Connect(_) => "ERR_CONNECT",
            ProbeError::Handshake(_) => "ERR_HANDSHAKE",
            ProbeError::Build(_) | ProbeError::Request(_) => "ERR_REQUEST",
            ProbeError::Timeout(_) => "ERR_TIMEOUT",
            ProbeError::Aborted => "ERR_ABORTED",
        }
    }
}

/// Issues a plain `GET /` to one address and classifies the answer.
#[derive(Debug, Clone, Copy)]
pub struct HttpProber {
    port: u16,
    timeout: Duration,
}

impl HttpProber {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }

    /// Probe a single address. Never fails: transport errors become a
    /// `Failed` outcome carrying the error's marker.
    pub async fn probe(&self, ip: IpAddr) -> Outcome {
        let addr = SocketAddr::new(ip, self.port);
        let result = match time::timeout(self.timeout, get_root(addr)).await {
            Ok(res) => res,
            Err(_) => Err(ProbeError::Timeout(self.timeout)),
        };
        match result {
            Ok((code, reason)) => Outcome::http(ip, code, reason),
            Err(e) => {
                debug!(error = %e, %addr, "probe failed");
                Outcome::failed(ip, e.marker(), e.to_string())
            }
        }
    }

    /// Probe every address concurrently and wait for all of them.
    ///
    /// Results come back in the order of `ips`, not in settlement order.
    /// A slow address delays the whole batch but never drops another
    /// address's result.
    pub async fn probe_all(&self, ips: &[IpAddr]) -> Vec<Outcome> {
        let mut set = JoinSet::new();
        for (idx, &ip) in ips.iter().enumerate() {
            let prober = *self;
            set.spawn(async move { (idx, prober.probe(ip).await) });
        }

        let mut slots: Vec<Option<Outcome>> = vec![None; ips.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => debug!(error = %e, "probe task cancelled"),
            }
        }
        settle(ips, slots)
    }
}

/// Pair every address with its outcome, recording an `ERR_ABORTED` failure
/// for any slot whose task never reported back, so each address is counted
/// exactly once per cycle.
fn settle(ips: &[IpAddr], slots: Vec<Option<Outcome>>) -> Vec<Outcome> {
    ips.iter()
        .zip(slots)
        .map(|(&ip, slot)| {
            slot.unwrap_or_else(|| {
                let e = ProbeError::Aborted;
                Outcome::failed(ip, e.marker(), e.to_string())
            })
        })
        .collect()
}

async fn get_root(addr: SocketAddr) -> Result<(u16, String), ProbeError> {
    let stream = TcpStream::connect(addr).await.map_err(ProbeError::Connect)?;
    let io = TokioIo::new(stream);
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
        .await
        .map_err(ProbeError::Handshake)?;

    // Drive the connection in the background; it ends when `sender` drops.
    tokio::spawn(async move {
        let _ = conn.await;
    });

    let req = http::Request::builder()
        .method(http::Method::GET)
        .uri("/")
        .header(http::header::HOST, host_header(addr))
        .body(Empty::<Bytes>::new())
        .map_err(ProbeError::Build)?;

    let resp = sender.send_request(req).await.map_err(ProbeError::Request)?;
    let status = resp.status();
    // hyper only keeps the phrase when it differs from the canonical one.
    let reason = match resp.extensions().get::<ReasonPhrase>() {
        Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
        None => status.canonical_reason().unwrap_or_default().to_string(),
    };
    Ok((status.as_u16(), reason))
}

fn host_header(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    if addr.port() == 80 {
        host
    } else {
        format!("{host}:{}", addr.port())
    }
}
