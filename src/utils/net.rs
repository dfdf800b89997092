use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use thiserror::Error;

pub const LOOPBACK: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

#[derive(Error, Debug)]
#[error("no outbound route: {0}")]
pub struct Unreachable(#[from] std::io::Error);

/// Address of the interface the OS would route `probe` through.
///
/// Connecting a UDP socket only consults the routing table, nothing is sent,
/// so this returns immediately even with no network.
pub fn lookup_outbound_address(probe: SocketAddr) -> Result<IpAddr, Unreachable> {
    let bind: SocketAddr = if probe.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind)?;
    socket.connect(probe)?;
    Ok(socket.local_addr()?.ip())
}

/// Best-effort local address, loopback on any failure.
pub fn outbound_or_loopback(probe: SocketAddr) -> IpAddr {
    lookup_outbound_address(probe).unwrap_or_else(|e| {
        tracing::warn!("Outbound address lookup failed, using loopback: {}", e);
        LOOPBACK
    })
}
