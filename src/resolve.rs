//! IPv4 lookup through the system resolver.

use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};

/// Resolves a domain to the IPv4 addresses that should also be blocked.
pub trait Resolve {
    /// Returns the domain's IPv4 addresses, or an empty vec if it does not
    /// resolve.
    fn resolve_ipv4(&self, domain: &str) -> Vec<Ipv4Addr>;
}

/// Uses the OS resolver (`getaddrinfo`), so `/etc/hosts` and the system DNS
/// configuration both apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    fn resolve_ipv4(&self, domain: &str) -> Vec<Ipv4Addr> {
        match (domain, 0).to_socket_addrs() {
            Ok(addrs) => unique_ipv4(addrs),
            Err(e) => {
                tracing::debug!(domain = %domain, error = %e, "DNS lookup failed");
                Vec::new()
            }
        }
    }
}

/// Keeps IPv4 addresses in first-seen order, dropping repeats.
fn unique_ipv4(addrs: impl IntoIterator<Item = SocketAddr>) -> Vec<Ipv4Addr> {
    let mut out: Vec<Ipv4Addr> = Vec::new();
    for addr in addrs {
        if let SocketAddr::V4(v4) = addr {
            if !out.contains(v4.ip()) {
                out.push(*v4.ip());
            }
        }
    }
    out
}
