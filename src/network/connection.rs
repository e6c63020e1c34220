//! Connection
//!
//! Owns the transport handle and funnels all command execution through the
//! codec. Strictly half-duplex: one command in flight at a time, enforced by
//! `execute` taking `&mut self`.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::config::{Config, Endpoint};
use crate::error::{RedisError, Result};
use crate::protocol::{read_reply, write_command, Command, Reply};

/// Buffered read/write halves of one TCP handle
struct Stream {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

/// A client connection to one server
///
/// The handle is opened lazily on the first `execute` call and dropped on
/// any transport failure; the call after a failure reopens it. There is no
/// background health check and no internal retry.
pub struct Connection {
    endpoint: Endpoint,
    config: Config,
    stream: Option<Stream>,
}

impl Connection {
    /// Create a connection; performs no I/O
    pub fn new(endpoint: Endpoint, config: Config) -> Self {
        Self {
            endpoint,
            config,
            stream: None,
        }
    }

    /// Execute one command and read exactly one reply
    ///
    /// Opens the handle first if none is held. Any write/read/decode failure
    /// discards the handle and surfaces the error; server error replies are
    /// returned as [`Reply::Error`] and leave the handle open.
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.open()?,
        };

        tracing::trace!(
            "executing {} against {}",
            String::from_utf8_lossy(command.name()),
            self.endpoint
        );

        match Self::round_trip(&mut stream, command) {
            Ok(reply) => {
                self.stream = Some(stream);
                Ok(reply)
            }
            Err(err) => {
                // stream is dropped here; the next call reconnects
                tracing::warn!("dropping connection to {}: {}", self.endpoint, err);
                Err(err)
            }
        }
    }

    /// Whether a live handle is currently held
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Drop the current handle, if any
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("closed connection to {}", self.endpoint);
        }
    }

    /// The configured server address
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn round_trip(stream: &mut Stream, command: &Command) -> Result<Reply> {
        write_command(&mut stream.writer, command)?;
        read_reply(&mut stream.reader)
    }

    /// Open a handle against the configured endpoint
    ///
    /// Tries every resolved address with the configured connect timeout.
    /// No retry happens here; retry policy belongs to the caller.
    fn open(&self) -> Result<Stream> {
        let addrs = (self.endpoint.host(), self.endpoint.port())
            .to_socket_addrs()
            .map_err(|source| RedisError::Connect {
                addr: self.endpoint.to_string(),
                source,
            })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.config.connect_timeout) {
                Ok(stream) => return self.prepare(stream),
                Err(err) => last_err = Some(err),
            }
        }

        Err(RedisError::Connect {
            addr: self.endpoint.to_string(),
            source: last_err.unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "endpoint resolved to no addresses",
                )
            }),
        })
    }

    /// Configure a fresh handle and split it into buffered halves
    fn prepare(&self, stream: TcpStream) -> Result<Stream> {
        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout)?;
        stream.set_write_timeout(self.config.write_timeout)?;

        tracing::debug!("connected to {}", self.endpoint);

        let read_half = stream.try_clone()?;
        Ok(Stream {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(stream),
        })
    }
}
