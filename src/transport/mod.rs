//! # Printer Transport Layer
//!
//! Delivers an encoded job to a printer over a slow, lossy link such as
//! Bluetooth Low Energy or an RFCOMM serial port.
//!
//! ```text
//! Connection ──connect()──► Connector ──► Link
//!     │
//!     └──print(bytes)──► chunked::write_chunked ──► Link::write_chunk × N
//! ```
//!
//! - [`chunked`]: pacing and the sequential chunk writer
//! - [`connection`]: connection state machine and disconnect notification
//! - [`rfcomm`]: Linux RFCOMM device backend
//!
//! Any [`Link`] implementation can stand in for real hardware; the state
//! machine never looks past the trait.

pub mod chunked;
pub mod connection;
pub mod rfcomm;

use async_trait::async_trait;
use thiserror::Error;

pub use chunked::{ChunkReport, Pacing, write_chunked};
pub use connection::{Connection, ConnectionState, DisconnectNotifier};
pub use rfcomm::{RfcommConnector, RfcommLink};

/// Failure reported by a [`Link`].
///
/// The split matters to the caller: a disconnect ends the session, any
/// other failure leaves the link usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("link lost: {0}")]
    Disconnected(String),

    #[error("{0}")]
    Other(String),
}

impl LinkError {
    pub fn is_disconnect(&self) -> bool {
        matches!(self, LinkError::Disconnected(_))
    }
}

/// An open byte channel to a printer.
#[async_trait]
pub trait Link: Send {
    /// Write one chunk. Returns once the link accepted it.
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError>;

    /// Close the channel. The link is not used afterwards.
    async fn close(&mut self) -> Result<(), LinkError>;
}

/// Opens [`Link`]s to one device.
#[async_trait]
pub trait Connector: Send + Sync {
    type Link: Link + 'static;

    async fn connect(&self) -> Result<Self::Link, LinkError>;
}

/// Errors surfaced to the caller of [`Connection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrintError {
    #[error("printer not connected")]
    NotConnected,

    #[error("printer busy with another job")]
    Busy,

    #[error("printer already connected")]
    AlreadyConnected,

    #[error("failed to connect to printer: {0}")]
    ConnectFailed(String),

    #[error("printer disconnected during print: {0}")]
    Disconnected(String),

    #[error("write to printer failed: {0}")]
    Write(String),
}

impl PrintError {
    /// Whether the same bytes can be sent again on the same connection.
    ///
    /// Only a plain write failure leaves the connection usable. After a
    /// disconnect the caller must reconnect first.
    pub fn is_retryable_without_reencode(&self) -> bool {
        matches!(self, PrintError::Write(_))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_error_messages() {
        assert_eq!(PrintError::NotConnected.to_string(), "printer not connected");
        assert_eq!(
            PrintError::Disconnected("link lost".into()).to_string(),
            "printer disconnected during print: link lost"
        );
        assert_eq!(
            PrintError::Write("timeout".into()).to_string(),
            "write to printer failed: timeout"
        );
    }

    #[test]
    fn test_only_write_errors_are_retryable() {
        assert!(PrintError::Write("x".into()).is_retryable_without_reencode());
        assert!(!PrintError::Disconnected("x".into()).is_retryable_without_reencode());
        assert!(!PrintError::NotConnected.is_retryable_without_reencode());
        assert!(!PrintError::Busy.is_retryable_without_reencode());
    }

    #[test]
    fn test_link_error_classification() {
        assert!(LinkError::Disconnected("gone".into()).is_disconnect());
        assert!(!LinkError::Other("slow".into()).is_disconnect());
    }
}
