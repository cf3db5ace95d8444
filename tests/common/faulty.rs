//! Raw UDP peers for edge case testing.
//!
//! These bypass the library's manager to send arbitrary bytes, or stand in
//! for an agent that never answers.

use lsnmpvs::Message;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// A bound socket that never replies.
pub struct SilentPeer {
    socket: UdpSocket,
}

impl SilentPeer {
    pub async fn bind() -> Self {
        Self {
            socket: UdpSocket::bind("127.0.0.1:0").await.unwrap(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }
}

/// A socket that sends raw datagrams and decodes what comes back.
///
/// Also used as the manager end of beacon tests.
pub struct RawPeer {
    socket: UdpSocket,
}

impl RawPeer {
    pub async fn bind() -> Self {
        Self {
            socket: UdpSocket::bind("127.0.0.1:0").await.unwrap(),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    pub async fn send(&self, target: SocketAddr, data: &[u8]) {
        self.socket.send_to(data, target).await.unwrap();
    }

    /// Receive one datagram and decode it, or `None` after `wait`.
    pub async fn recv(&self, wait: Duration) -> Option<Message> {
        let mut buf = vec![0u8; 65_535];
        let (len, _) = tokio::time::timeout(wait, self.socket.recv_from(&mut buf))
            .await
            .ok()?
            .unwrap();
        Some(Message::decode(&buf[..len]).expect("peer received an undecodable datagram"))
    }

    /// Send `data` and wait for the reply.
    pub async fn exchange(&self, target: SocketAddr, data: &[u8]) -> Message {
        self.send(target, data).await;
        self.recv(Duration::from_secs(2))
            .await
            .expect("no reply within 2s")
    }
}
