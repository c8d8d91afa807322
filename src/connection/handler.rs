//! Connection Handler Module
//!
//! This module handles individual client connections to emberkv. Each
//! client gets its own handler task that runs in a loop, reading bytes,
//! framing complete lines, dispatching them, and writing replies back.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. Capacity check — at the ceiling the socket is
//!    closed immediately, no reply
//!        │
//!        ▼
//! 3. ┌──────────────────────────────────────┐
//!    │            Main Loop                 │
//!    │                                      │
//!    │  ┌─────────────────────────────────┐ │
//!    │  │ Read bytes into inbound buffer  │ │
//!    │  └───────────────┬─────────────────┘ │
//!    │                  ▼                   │
//!    │  ┌─────────────────────────────────┐ │
//!    │  │ Frame + dispatch every complete │ │
//!    │  │ line; queue replies in outbound │ │
//!    │  └───────────────┬─────────────────┘ │
//!    │                  ▼                   │
//!    │  ┌─────────────────────────────────┐ │
//!    │  │ Flush outbound buffer           │ │
//!    │  └───────────────┬─────────────────┘ │
//!    │                  ▼                   │
//!    │             [Loop back]              │
//!    └──────────────────────────────────────┘
//!        │
//!        ▼
//! 4. Peer EOF / socket error → buffers released, socket closed
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream: one receive may carry half a command or several whole
//! ones. The inbound `BytesMut` accumulates unterminated bytes across
//! receives; the outbound `BytesMut` collects the replies of one batch of
//! framed lines so they go out in a single write, in order. An unsent
//! outbound buffer grows without bound if the peer drains slowly; that is
//! an accepted risk, not hardened here.

use crate::commands::{handler::reply, CommandHandler};
use crate::protocol;
use crate::storage::StorageEngine;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, trace, warn};

/// Hard ceiling on concurrently connected clients. A connection accepted
/// at the ceiling is closed immediately without a reply.
pub const MAX_CLIENTS: u64 = 256;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Connections refused at the capacity ceiling
    pub connections_rejected: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a connection slot if the active count is below `max_active`.
    ///
    /// The check and the increment are one atomic step, so concurrent
    /// accepts cannot overshoot the ceiling.
    ///
    /// # Returns
    ///
    /// `true` if a slot was claimed; the caller must pair it with
    /// [`ConnectionStats::connection_closed`].
    pub fn try_open(&self, max_active: u64) -> bool {
        let claimed = self
            .active_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                if active < max_active {
                    Some(active + 1)
                } else {
                    None
                }
            })
            .is_ok();

        if claimed {
            self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.connections_rejected.fetch_add(1, Ordering::Relaxed);
        }

        claimed
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Owns the socket and both byte accumulators for one client; nothing else
/// in the process touches them.
pub struct ConnectionHandler {
    /// The TCP stream for this connection
    stream: BufWriter<TcpStream>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Accumulator for received bytes not yet framed into a line
    inbound: BytesMut,

    /// Accumulator for reply bytes not yet written out
    outbound: BytesMut,

    /// The command handler (shared storage behind it)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    /// Creates a new connection handler.
    ///
    /// The caller must already hold a connection slot via
    /// [`ConnectionStats::try_open`].
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self {
            stream: BufWriter::new(stream),
            addr,
            inbound: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            outbound: BytesMut::new(),
            command_handler,
            stats,
        }
    }

    /// Runs the main connection loop until the client goes away.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(ConnectionError::ClientDisconnected) => {
                info!(client = %self.addr, "Client disconnected")
            }
            Err(ConnectionError::Io(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// The read → frame/dispatch → flush loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            self.read_more_data().await?;
            self.drain_lines().await;
            self.flush_outbound().await?;
        }
    }

    /// Frames and dispatches every complete line currently buffered.
    ///
    /// Each framed line produces exactly one reply, appended to the
    /// outbound accumulator in arrival order. A trailing partial line
    /// stays buffered for the next receive.
    async fn drain_lines(&mut self) {
        while let Some(line) = protocol::next_line(&mut self.inbound) {
            let reply = match protocol::parse(&line) {
                Some(command) => {
                    trace!(client = %self.addr, command = %command.name, "Dispatching");
                    self.stats.command_processed();
                    self.command_handler.execute(command).await
                }
                None => reply::invalid_command(),
            };
            self.outbound.extend_from_slice(reply.as_bytes());
        }
    }

    /// Reads more data from the socket into the inbound accumulator.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        let n = self.stream.get_mut().read_buf(&mut self.inbound).await?;

        if n == 0 {
            // Peer gone. A half-received line owes no reply.
            if !self.inbound.is_empty() {
                debug!(
                    client = %self.addr,
                    discarded = self.inbound.len(),
                    "Disconnected mid-command"
                );
            }
            return Err(ConnectionError::ClientDisconnected);
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Writes out the queued replies for this batch, if any.
    async fn flush_outbound(&mut self) -> Result<(), ConnectionError> {
        if self.outbound.is_empty() {
            return Ok(());
        }

        self.stream.write_all(&self.outbound).await?;
        self.stream.flush().await?;

        self.stats.bytes_written(self.outbound.len());
        trace!(
            client = %self.addr,
            bytes = self.outbound.len(),
            "Flushed replies"
        );
        self.outbound.clear();

        Ok(())
    }
}

/// Errors that can occur while handling a connection.
///
/// Any of these tears down the one connection; the process is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client closed its end of the connection
    #[error("client disconnected")]
    ClientDisconnected,
}

/// Handles a client connection to completion.
///
/// This is a convenience wrapper that creates a [`ConnectionHandler`] and
/// runs it, swallowing the expected disconnect outcomes.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::Io(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}

/// Accepts clients on `listener` until the task is dropped.
///
/// The sole owner of the listening socket: accepts every queued
/// connection, enforces the `max_clients` ceiling (a refused socket is
/// closed with no reply), and spawns one handler task per admitted client.
pub async fn serve(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
    max_clients: u64,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                if !stats.try_open(max_clients) {
                    warn!(client = %addr, max_clients, "Connection refused: at capacity");
                    drop(stream);
                    continue;
                }

                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
