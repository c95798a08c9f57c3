//! Non-blocking UDP transport (C1/§5/§6).
//!
//! One socket, bound per role to the fixed server/client port. Recv never
//! blocks: an empty socket and a would-block send are both ordinary,
//! expected outcomes handled by returning `Ok(None)` / `Ok(())` rather than
//! treating them as errors, per spec.md §7's "transport transient" kind.

use crate::constants::{DEFAULT_CLIENT_PORT, DEFAULT_SERVER_PORT, MAX_DATAGRAM_SIZE};
use crate::error::{NetError, NetResult};
use std::net::{SocketAddr, UdpSocket};

pub struct Transport {
    socket: UdpSocket,
}

impl Transport {
    fn bind(port: u16) -> NetResult<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        socket.set_nonblocking(true)?;
        tracing::info!(port, "bound UDP transport");
        Ok(Self { socket })
    }

    pub fn bind_server() -> NetResult<Self> {
        Self::bind(DEFAULT_SERVER_PORT)
    }

    pub fn bind_client() -> NetResult<Self> {
        Self::bind(DEFAULT_CLIENT_PORT)
    }

    pub fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> NetResult<()> {
        if bytes.len() > MAX_DATAGRAM_SIZE {
            tracing::error!(size = bytes.len(), max = MAX_DATAGRAM_SIZE, %addr, "refusing oversized datagram");
            return Err(NetError::DatagramTooLarge { size: bytes.len(), max: MAX_DATAGRAM_SIZE });
        }
        self.socket.send_to(bytes, addr)?;
        Ok(())
    }

    /// Drain at most one datagram into `scratch`. `Ok(None)` means the
    /// socket had nothing queued (`WouldBlock`), which is the ordinary
    /// steady-state outcome every tick, not an error.
    pub fn recv_one<'a>(&self, scratch: &'a mut [u8; MAX_DATAGRAM_SIZE]) -> NetResult<Option<(&'a [u8], SocketAddr)>> {
        match self.socket.recv_from(scratch) {
            Ok((len, addr)) => Ok(Some((&scratch[..len], addr))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(NetError::Transport(e)),
        }
    }

    pub fn local_addr(&self) -> NetResult<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recv_on_empty_socket_is_none_not_error() {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        socket.set_nonblocking(true).unwrap();
        let transport = Transport { socket };
        let mut scratch = [0u8; MAX_DATAGRAM_SIZE];
        assert!(transport.recv_one(&mut scratch).unwrap().is_none());
    }

    #[test]
    fn oversized_send_is_rejected() {
        let socket = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        socket.set_nonblocking(true).unwrap();
        let transport = Transport { socket };
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let oversized = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        assert!(transport.send_to(&oversized, addr).is_err());
    }
}
