//! Newline-framed TCP transport built on `tokio-util` codecs.
//!
//! Inbound lines are framed as raw bytes and decoded one at a time, so a
//! line that is not UTF-8 costs that line only.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio_util::codec::{
    AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead, FramedWrite, LinesCodec,
    LinesCodecError,
};

use crate::{Connection, ConnectionId, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] whose connections speak one command per line.
pub struct TcpLineTransport {
    listener: TcpListener,
    max_line_length: usize,
}

impl TcpLineTransport {
    /// Binds a new transport to the given address.
    ///
    /// Inbound lines longer than `max_line_length` bytes make
    /// [`Connection::recv`] fail with [`TransportError::LineTooLong`].
    /// Lines that are not UTF-8 fail with [`TransportError::InvalidUtf8`]
    /// and leave the connection usable.
    pub async fn bind(
        addr: &str,
        max_line_length: usize,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP line transport listening");
        Ok(Self {
            listener,
            max_line_length,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpLineTransport {
    type Connection = LineConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let id = ConnectionId::new(
            NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed),
        );
        tracing::debug!(%id, %addr, "accepted TCP connection");

        let (read_half, write_half) = stream.into_split();
        Ok(LineConnection {
            id,
            max_line_length: self.max_line_length,
            reader: Mutex::new(FramedRead::new(
                read_half,
                AnyDelimiterCodec::new_with_max_length(
                    b"\n".to_vec(),
                    b"\n".to_vec(),
                    self.max_line_length,
                ),
            )),
            writer: Mutex::new(FramedWrite::new(
                write_half,
                LinesCodec::new(),
            )),
        })
    }
}

/// A single newline-framed TCP connection.
///
/// The read and write halves are locked independently, so a task
/// waiting for the next inbound line never blocks outbound writes.
pub struct LineConnection {
    id: ConnectionId,
    max_line_length: usize,
    reader: Mutex<FramedRead<OwnedReadHalf, AnyDelimiterCodec>>,
    writer: Mutex<FramedWrite<OwnedWriteHalf, LinesCodec>>,
}

impl Connection for LineConnection {
    type Error = TransportError;

    async fn send(&self, line: &str) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .send(line)
            .await
            .map_err(|e| match e {
                LinesCodecError::Io(io) => TransportError::SendFailed(io),
                LinesCodecError::MaxLineLengthExceeded => {
                    TransportError::LineTooLong(line.len())
                }
            })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        match self.reader.lock().await.next().await {
            Some(Ok(chunk)) => {
                let line = std::str::from_utf8(&chunk)
                    .map_err(|_| TransportError::InvalidUtf8)?;
                Ok(Some(line.strip_suffix('\r').unwrap_or(line).to_string()))
            }
            Some(Err(AnyDelimiterCodecError::MaxChunkLengthExceeded)) => {
                Err(TransportError::LineTooLong(self.max_line_length))
            }
            Some(Err(AnyDelimiterCodecError::Io(e))) => {
                Err(TransportError::ReceiveFailed(e))
            }
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        SinkExt::<&str>::close(&mut *self.writer.lock().await)
            .await
            .map_err(|e| match e {
                LinesCodecError::Io(io) => TransportError::SendFailed(io),
                LinesCodecError::MaxLineLengthExceeded => {
                    TransportError::ConnectionClosed(
                        "close interrupted".into(),
                    )
                }
            })
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
