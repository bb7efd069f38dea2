// Per-participant transport channel.
//
// A `Channel` pairs a buffered reader and writer for one participant and
// tags them with that participant's `Role`, so every transport failure can
// say whose connection broke. The turn engine is the only writer on each
// channel, which keeps message order to a participant identical to the order
// the engine issues writes.
//
// `Channel` is generic over `BufRead`/`Write`. Sessions use `TcpChannel`
// (two halves of one cloned `TcpStream`); engine tests use in-memory
// buffers.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};

use tracing::trace;
use twenty_questions_protocol::{Role, ServerLine, read_line, write_line};

use crate::error::SessionError;

pub struct Channel<R, W> {
    role: Role,
    reader: R,
    writer: W,
}

/// A channel over a live TCP connection.
pub type TcpChannel = Channel<BufReader<TcpStream>, BufWriter<TcpStream>>;

impl<R: BufRead, W: Write> Channel<R, W> {
    pub fn new(role: Role, reader: R, writer: W) -> Self {
        Self {
            role,
            reader,
            writer,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Render and send one server line.
    pub fn send(&mut self, line: &ServerLine) -> Result<(), SessionError> {
        let text = line.to_string();
        trace!(role = %self.role, line = %text, "send");
        write_line(&mut self.writer, &text).map_err(|source| self.io_error(source))
    }

    /// Receive one line, or `None` if the participant closed the stream.
    pub fn recv(&mut self) -> Result<Option<String>, SessionError> {
        let line = read_line(&mut self.reader).map_err(|source| self.io_error(source))?;
        trace!(role = %self.role, line = ?line, "recv");
        Ok(line)
    }

    /// Receive one line; end of stream is a `Disconnected` error naming what
    /// the server was waiting for.
    pub fn expect_line(&mut self, awaiting: &'static str) -> Result<String, SessionError> {
        self.recv()?.ok_or(SessionError::Disconnected {
            role: self.role,
            awaiting,
        })
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn io_error(&self, source: io::Error) -> SessionError {
        SessionError::Io {
            role: self.role,
            source,
        }
    }
}

impl TcpChannel {
    pub fn from_stream(role: Role, stream: TcpStream) -> Result<Self, SessionError> {
        let read_half = stream
            .try_clone()
            .map_err(|source| SessionError::Io { role, source })?;
        Ok(Self::new(
            role,
            BufReader::new(read_half),
            BufWriter::new(stream),
        ))
    }

    /// Flush and shut down both directions of the connection. The peer sees
    /// end of stream. Errors are ignored: the peer may already be gone.
    pub fn close(mut self) {
        let _ = self.writer.flush();
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
    }
}
