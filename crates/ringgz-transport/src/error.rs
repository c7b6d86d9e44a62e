/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a line failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving a line failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// The peer sent a line longer than the configured maximum.
    #[error("line exceeds {0} bytes")]
    LineTooLong(usize),

    /// The peer sent a line that is not valid UTF-8. Only that line is
    /// lost.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

impl TransportError {
    /// `true` when the connection can keep receiving after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidUtf8)
    }
}
