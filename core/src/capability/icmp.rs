//! Privileged ICMPv4 echo over a raw layer-4 socket.
//!
//! Requires root (or `CAP_NET_RAW`). Opening the channel without privileges
//! fails with an unclassified error rather than a negative answer.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use hostprobe_common::error::{ProbeError, ResolutionFailure};
use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{self, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{self, TransportChannelType, TransportProtocol};
use tracing::trace;

use super::ReachabilityProber;

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));

const ECHO_HDR_LEN: usize = 8;
const ECHO_PAYLOAD: &[u8] = b"hostprobe";

pub struct RawIcmpProber;

#[async_trait]
impl ReachabilityProber for RawIcmpProber {
    async fn probe(&self, host: &str, timeout: Duration) -> Result<bool, ProbeError> {
        let addr: Ipv4Addr = resolve_v4(host).await?;
        let identifier: u16 = rand::random();

        tokio::task::spawn_blocking(move || echo_once(addr, identifier, timeout))
            .await
            .map_err(|e| ProbeError::Unclassified(e.to_string()))?
            .map_err(|e| ProbeError::Unclassified(format!("{e:#}")))
    }
}

async fn resolve_v4(host: &str) -> Result<Ipv4Addr, ProbeError> {
    if let Ok(addr) = host.parse::<IpAddr>() {
        return match addr {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(_) => Err(ProbeError::Unclassified(
                "raw ICMP echo supports IPv4 targets only".to_string(),
            )),
        };
    }

    let addrs = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| ProbeError::Resolution(ResolutionFailure::Other(e.to_string())))?;

    addrs
        .filter_map(|sock| match sock.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or(ProbeError::Resolution(ResolutionFailure::NotFound))
}

/// Sends one echo request and waits for the matching reply until `timeout`.
fn echo_once(addr: Ipv4Addr, identifier: u16, timeout: Duration) -> anyhow::Result<bool> {
    let deadline: Instant = Instant::now() + timeout;
    let (mut tx, mut rx) = transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
        .context("opening raw ICMP channel")?;

    let mut buffer: Vec<u8> = vec![0u8; ECHO_HDR_LEN + ECHO_PAYLOAD.len()];
    let request = create_echo_request(&mut buffer, identifier)?;
    tx.send_to(request, IpAddr::V4(addr))
        .context("sending echo request")?;

    let mut iter = transport::icmp_packet_iter(&mut rx);
    loop {
        let remaining: Duration = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        let Some((packet, source)) = iter
            .next_with_timeout(remaining)
            .context("reading ICMP channel")?
        else {
            return Ok(false);
        };

        if source == IpAddr::V4(addr) && is_matching_reply(&packet, identifier) {
            trace!("echo reply from {addr}");
            return Ok(true);
        }
    }
}

fn create_echo_request(buffer: &mut [u8], identifier: u16) -> anyhow::Result<MutableEchoRequestPacket<'_>> {
    let mut echo = MutableEchoRequestPacket::new(buffer).context("creating echo request packet")?;
    echo.set_icmp_type(IcmpTypes::EchoRequest);
    echo.set_icmp_code(IcmpCode(0));
    echo.set_identifier(identifier);
    echo.set_sequence_number(1);
    echo.set_payload(ECHO_PAYLOAD);

    echo.set_checksum(0);
    let csum = icmp::checksum(&IcmpPacket::new(echo.packet()).context("creating ICMP packet")?);
    echo.set_checksum(csum);
    Ok(echo)
}

fn is_matching_reply(packet: &IcmpPacket, identifier: u16) -> bool {
    if packet.get_icmp_type() != IcmpTypes::EchoReply {
        return false;
    }
    EchoReplyPacket::new(packet.packet())
        .map(|reply| reply.get_identifier() == identifier)
        .unwrap_or(false)
}
