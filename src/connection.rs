use std::net::SocketAddr;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Result, ZsetError};
use crate::executor::Executor;
use crate::protocol::{Command, FrameScanner, Parser, Value};

/// Initial read buffer size
const READ_BUFFER_SIZE: usize = 8192;

struct Inner {
    stream: TcpStream,
    /// Bytes received but not yet parsed into a reply
    pending: BytesMut,
    /// Framing progress of the reply at the front of `pending`
    scanner: FrameScanner,
    /// Replies still on the wire for commands whose callers stopped waiting
    owed: usize,
    /// Set while a write is in flight and after any failed exchange
    broken: bool,
}

/// Single TCP connection executing one command at a time.
///
/// The lock is held across write and read. A call dropped after its command
/// went out leaves the reply owed; the next call reads and discards it before
/// sending, so replies always match the command that produced them. A call
/// dropped mid-write, or any I/O or protocol failure, makes the connection
/// unusable and later calls fail with `ConnectionBroken`. There is no
/// reconnect.
pub struct Connection {
    inner: Mutex<Inner>,
    peer_addr: SocketAddr,
}

impl Connection {
    /// Connect to a server
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr()?;
        info!("Connected to {}", peer_addr);

        Ok(Self {
            inner: Mutex::new(Inner {
                stream,
                pending: BytesMut::with_capacity(READ_BUFFER_SIZE),
                scanner: FrameScanner::new(),
                owed: 0,
                broken: false,
            }),
            peer_addr,
        })
    }

    /// Get the remote address
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    async fn read_reply(inner: &mut Inner, peer_addr: SocketAddr) -> Result<Value> {
        loop {
            if let Some(len) = inner.scanner.scan(&inner.pending)? {
                let frame = inner.pending.split_to(len);
                return match Parser::parse(&frame)? {
                    Some((value, _)) => Ok(value),
                    None => Err(ZsetError::Protocol("incomplete reply frame".to_string())),
                };
            }

            let n = inner.stream.read_buf(&mut inner.pending).await?;
            if n == 0 {
                warn!("Connection closed by server: {}", peer_addr);
                return Err(ZsetError::ConnectionClosed);
            }
        }
    }

    /// Read the reply to the oldest owed command
    async fn take_reply(inner: &mut Inner, peer_addr: SocketAddr) -> Result<Value> {
        match Self::read_reply(inner, peer_addr).await {
            Ok(value) => {
                inner.owed -= 1;
                Ok(value)
            }
            Err(e) => {
                inner.broken = true;
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Executor for Connection {
    async fn execute(&self, command: Command) -> Result<Value> {
        let mut inner = self.inner.lock().await;
        if inner.broken {
            return Err(ZsetError::ConnectionBroken);
        }

        while inner.owed > 0 {
            let stale = Self::take_reply(&mut inner, self.peer_addr).await?;
            debug!("Discarded stale reply from {}: {:?}", self.peer_addr, stale);
        }

        debug!("Sending to {}: {}", self.peer_addr, command);
        inner.broken = true;
        if let Err(e) = inner.stream.write_all(&command.encode()).await {
            warn!("Failed to write command to {}: {}", self.peer_addr, e);
            return Err(e.into());
        }
        inner.broken = false;
        inner.owed += 1;

        Self::take_reply(&mut inner, self.peer_addr).await
    }
}
