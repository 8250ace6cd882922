//! Channel
//!
//! One TCP connection wrapped in a serializer/deserializer pair.

use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::codec::{BinaryDeserializer, BinarySerializer};
use crate::config::Config;
use crate::error::{Result, WireError};
use crate::io::{SocketReader, SocketWriter};

/// Serializer bound to a TCP socket
pub type ChannelSerializer = BinarySerializer<SocketWriter<TcpStream>>;

/// Deserializer bound to a TCP socket
pub type ChannelDeserializer = BinaryDeserializer<SocketReader<TcpStream>>;

/// Serializer/deserializer pair over a single TCP connection
pub struct Channel {
    serializer: ChannelSerializer,
    deserializer: ChannelDeserializer,

    /// Handle kept for shutdown
    stream: TcpStream,

    /// Peer address for logging
    peer_addr: String,

    closed: bool,
}

impl Channel {
    /// Connect to `addr`, trying each resolved address in turn
    pub fn connect<A: ToSocketAddrs>(addr: A, config: &Config) -> Result<Self> {
        config.validate()?;

        let mut last_err = None;
        for addr in addr.to_socket_addrs()? {
            match connect_one(&addr, config.connect_timeout_ms) {
                Ok(stream) => return Self::from_stream(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", addr, e);
                    last_err = Some(e);
                }
            }
        }

        Err(match last_err {
            Some(e) => WireError::Io(e),
            None => WireError::Config("address resolved to nothing".to_string()),
        })
    }

    /// Wrap an already connected stream
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        config.validate()?;

        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.tcp_nodelay)?;
        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream.try_clone()?;

        let reader = SocketReader::new(read_stream, config.recv_buffer_size);
        let writer = SocketWriter::new(write_stream, config.send_buffer_size);

        tracing::debug!(
            compression = config.compression,
            "Channel established to {}",
            peer_addr
        );

        Ok(Self {
            serializer: BinarySerializer::from_config(writer, config),
            deserializer: BinaryDeserializer::from_config(reader, config),
            stream,
            peer_addr,
            closed: false,
        })
    }

    pub fn serializer(&mut self) -> &mut ChannelSerializer {
        &mut self.serializer
    }

    pub fn deserializer(&mut self) -> &mut ChannelDeserializer {
        &mut self.deserializer
    }

    /// Both halves at once, for request/response loops
    pub fn split(&mut self) -> (&mut ChannelSerializer, &mut ChannelDeserializer) {
        (&mut self.serializer, &mut self.deserializer)
    }

    /// Switch both directions to compressed blocks
    pub fn maybe_enable_compressed(&mut self) {
        self.serializer.maybe_enable_compressed();
        self.deserializer.maybe_enable_compressed();
    }

    /// Finalize the pending compressed block and return both directions
    /// to plain bytes
    pub fn maybe_disable_compressed(&mut self) -> Result<()> {
        self.serializer.maybe_disable_compressed()?;
        self.deserializer.maybe_disable_compressed();
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Release both halves and shut the socket down. Safe to call
    /// repeatedly and after a failed read or write.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.serializer.close();
        self.deserializer.close();
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} reported: {}", self.peer_addr, e);
        }
        tracing::debug!("Channel to {} closed", self.peer_addr);
    }
}

impl Drop for Channel {
    fn drop(&mut self) {
        self.close();
    }
}

fn connect_one(addr: &SocketAddr, timeout_ms: u64) -> std::io::Result<TcpStream> {
    if timeout_ms > 0 {
        TcpStream::connect_timeout(addr, Duration::from_millis(timeout_ms))
    } else {
        TcpStream::connect(addr)
    }
}
