// src/core/probe/tcp.rs

//! A connect-and-close liveness probe on a node's lightweight RPC port.

use super::{NodeProbe, ProbeResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;

/// The default connect timeout. Nodes run on this host, so a short timeout suffices.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(50);

/// Probes `host:port` by opening a TCP connection and closing it immediately.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    port: u16,
    connect_timeout: Duration,
}

impl TcpProbe {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[async_trait]
impl NodeProbe for TcpProbe {
    async fn probe(&self, host: &str) -> ProbeResult {
        let connect = TcpStream::connect((host, self.port));
        match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeResult::Ready
            }
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::TimedOut
                | ErrorKind::AddrNotAvailable => ProbeResult::NotReady,
                _ => ProbeResult::Error(format!("{host}:{}: {e}", self.port)),
            },
            Err(_) => ProbeResult::NotReady,
        }
    }
}
