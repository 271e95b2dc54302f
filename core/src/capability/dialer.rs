use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use hostprobe_common::error::{ProbeError, ResolutionFailure};
use tokio::io::AsyncWriteExt;
use tokio::net::{self, TcpStream};
use tokio::time::{Instant, timeout_at};
use tracing::trace;

use super::Dialer;

/// [`Dialer`] over the OS TCP stack.
///
/// Name resolution and every connect attempt share one deadline. Addresses are
/// tried in the order the system resolver returns them; the first completed
/// handshake wins.
pub struct TokioDialer;

#[async_trait]
impl Dialer for TokioDialer {
    async fn connect(&self, host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError> {
        let deadline: Instant = Instant::now() + timeout;

        let addrs: Vec<SocketAddr> = match timeout_at(deadline, net::lookup_host((host, port))).await
        {
            Ok(Ok(addrs)) => addrs.collect(),
            Ok(Err(e)) => return Err(ResolutionFailure::Other(e.to_string()).into()),
            Err(_elapsed) => return Err(ProbeError::Timeout),
        };

        if addrs.is_empty() {
            return Err(ResolutionFailure::NotFound.into());
        }

        let mut last_err = ProbeError::HostUnreachable;
        for addr in addrs {
            match timeout_at(deadline, TcpStream::connect(addr)).await {
                Ok(Ok(mut stream)) => {
                    trace!("handshake with {addr} completed");
                    let _ = stream.shutdown().await;
                    return Ok(());
                }
                Ok(Err(e)) => {
                    trace!("connect to {addr} failed: {e}");
                    last_err = classify_io_error(&e);
                }
                Err(_elapsed) => return Err(ProbeError::Timeout),
            }
        }

        Err(last_err)
    }
}

fn classify_io_error(err: &io::Error) -> ProbeError {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => ProbeError::ConnectionRefused,
        io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::AddrNotAvailable => ProbeError::HostUnreachable,
        io::ErrorKind::TimedOut => ProbeError::Timeout,
        _ => ProbeError::Unclassified(err.to_string()),
    }
}
