//! Remote endpoint identity of a connection.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

/// Address and port of the far end of a socket.
///
/// Bound once when the proxy is constructed and never mutated. Used by
/// higher layers for identification and ban-listing; the proxy's protocol
/// logic never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Authority {
    ip: IpAddr,
    port: u16,
}

impl Authority {
    /// IPv4-mapped IPv6 addresses are stored as IPv4.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        let ip = match ip {
            IpAddr::V6(v6) => v6
                .to_ipv4_mapped()
                .map(IpAddr::V4)
                .unwrap_or(IpAddr::V6(v6)),
            v4 => v4,
        };
        Self { ip, port }
    }

    /// `0.0.0.0:0`, used when the socket cannot report its peer.
    pub fn unspecified() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
        }
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    pub fn is_specified(&self) -> bool {
        !self.ip.is_unspecified() && self.port != 0
    }
}

impl Default for Authority {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl From<SocketAddr> for Authority {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl FromStr for Authority {
    type Err = std::net::AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>().map(Self::from)
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // SocketAddr brackets IPv6 hosts
        write!(f, "{}", self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    #[test]
    fn test_mapped_ipv6_normalised() {
        let mapped = Ipv4Addr::new(10, 0, 0, 1).to_ipv6_mapped();
        let authority = Authority::new(IpAddr::V6(mapped), 8333);
        assert_eq!(authority.ip(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(authority.to_string(), "10.0.0.1:8333");
    }

    #[test]
    fn test_ipv6_display_and_parse() {
        let authority = Authority::new(IpAddr::V6(Ipv6Addr::LOCALHOST), 18444);
        assert_eq!(authority.to_string(), "[::1]:18444");
        assert_eq!("[::1]:18444".parse::<Authority>().ok(), Some(authority));
    }

    #[test]
    fn test_unspecified() {
        let authority = Authority::default();
        assert!(!authority.is_specified());
        assert_eq!(authority.to_string(), "0.0.0.0:0");
        assert!("127.0.0.1:8333".parse::<Authority>().is_ok_and(|a| a.is_specified()));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-an-endpoint".parse::<Authority>().is_err());
    }
}
