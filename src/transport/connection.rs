//! # Connection State Machine
//!
//! ```text
//!            connect()              ok
//!   Idle ───────────────► Connecting ──► Connected ◄──────┐
//!    ▲                        │  fail        │ print()    │ done / write error
//!    └────────────────────────┘              ▼            │
//!                                         Printing ───────┘
//!                                            │ device lost
//!   Disconnected ◄───────────────────────────┘
//!        │ connect()
//!        └──────────► Connecting ...
//! ```
//!
//! The current state is published on a `tokio::sync::watch` channel so a
//! UI can follow it. A [`DisconnectNotifier`] lets the device event source
//! force `Disconnected` at any time; an in-flight job notices before its
//! next chunk.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{info, instrument, warn};

use super::chunked::{ChunkReport, Pacing, write_chunked};
use super::{Connector, Link, LinkError, PrintError};

/// Where a [`Connection`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Printing,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Printing => "printing",
            ConnectionState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}

/// Forces a [`Connection`] into `Disconnected` from outside.
///
/// Cheap to clone; hand one to whatever watches the device.
#[derive(Clone)]
pub struct DisconnectNotifier {
    state: Arc<watch::Sender<ConnectionState>>,
}

impl DisconnectNotifier {
    /// Report that the device went away. Returns whether the state changed.
    pub fn notify(&self, reason: &str) -> bool {
        let changed = self.state.send_if_modified(|state| match state {
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Printing => {
                *state = ConnectionState::Disconnected;
                true
            }
            _ => false,
        });
        if changed {
            info!(reason, "Printer disconnected");
        }
        changed
    }
}

/// One printer session: owns the link and serializes jobs on it.
///
/// Methods take `&self`; share the connection behind an `Arc` to print
/// from several tasks. A second job started while one is running fails
/// with [`PrintError::Busy`].
pub struct Connection<C: Connector> {
    connector: C,
    pacing: Pacing,
    state: Arc<watch::Sender<ConnectionState>>,
    link: Mutex<Option<C::Link>>,
}

impl<C: Connector> Connection<C> {
    pub fn new(connector: C) -> Self {
        Self::with_pacing(connector, Pacing::default())
    }

    pub fn with_pacing(connector: C, pacing: Pacing) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            connector,
            pacing,
            state: Arc::new(state),
            link: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn disconnect_notifier(&self) -> DisconnectNotifier {
        DisconnectNotifier {
            state: Arc::clone(&self.state),
        }
    }

    /// Open a link. Allowed from `Idle` and `Disconnected`.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<(), PrintError> {
        let mut prior = None;
        self.state.send_if_modified(|state| match state {
            ConnectionState::Idle | ConnectionState::Disconnected => {
                prior = Some(*state);
                *state = ConnectionState::Connecting;
                true
            }
            _ => false,
        });
        let Some(prior) = prior else {
            return Err(PrintError::AlreadyConnected);
        };

        let link = match self.connector.connect().await {
            Ok(link) => link,
            Err(e) => {
                warn!(error = %e, "Connect failed");
                self.state.send_if_modified(|state| {
                    if *state == ConnectionState::Connecting {
                        *state = prior;
                        true
                    } else {
                        false
                    }
                });
                return Err(PrintError::ConnectFailed(e.to_string()));
            }
        };

        let mut slot = self.link.lock().await;
        let connected = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
        if !connected {
            *slot = None;
            return Err(PrintError::ConnectFailed(
                "device disconnected while connecting".into(),
            ));
        }

        *slot = Some(link);
        info!("Printer connected");
        Ok(())
    }

    /// Deliver one encoded job.
    ///
    /// On a disconnect the link is dropped and the state becomes
    /// `Disconnected`. Any other write failure returns the connection to
    /// `Connected` so the same bytes can be sent again.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn print(&self, bytes: &[u8]) -> Result<ChunkReport, PrintError> {
        let mut admitted = Err(PrintError::NotConnected);
        self.state.send_if_modified(|state| match state {
            ConnectionState::Connected => {
                *state = ConnectionState::Printing;
                admitted = Ok(());
                true
            }
            ConnectionState::Printing => {
                admitted = Err(PrintError::Busy);
                false
            }
            _ => false,
        });
        admitted?;

        let mut slot = self.link.lock().await;
        let Some(link) = slot.as_mut() else {
            self.abandon_job();
            return Err(PrintError::Disconnected("no open link".into()));
        };

        let state = Arc::clone(&self.state);
        let result = write_chunked(link, bytes, &self.pacing, move || {
            *state.borrow() == ConnectionState::Printing
        })
        .await;

        match result {
            Ok(report) => {
                self.finish_job();
                info!(chunks = report.chunks, bytes = report.bytes, "Print complete");
                Ok(report)
            }
            Err(LinkError::Disconnected(reason)) => {
                self.abandon_job();
                *slot = None;
                warn!(%reason, "Printer disconnected during print");
                Err(PrintError::Disconnected(reason))
            }
            Err(LinkError::Other(reason)) => {
                self.finish_job();
                Err(PrintError::Write(reason))
            }
        }
    }

    /// Close the link on the caller's initiative.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Idle || *state == ConnectionState::Disconnected {
                false
            } else {
                *state = ConnectionState::Disconnected;
                true
            }
        });

        let link = self.link.lock().await.take();
        if let Some(mut link) = link {
            if let Err(e) = link.close().await {
                warn!(error = %e, "Error closing link");
            }
            info!("Printer disconnected");
        }
    }

    /// `Printing → Disconnected`. A notifier or a reconnect that already
    /// moved the state on is left alone.
    fn abandon_job(&self) {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Printing {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
    }

    /// `Printing → Connected`, unless a disconnect already landed.
    fn finish_job(&self) {
        self.state.send_if_modified(|state| {
            if *state == ConnectionState::Printing {
                *state = ConnectionState::Connected;
                true
            } else {
                false
            }
        });
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullLink;

    #[async_trait]
    impl Link for NullLink {
        async fn write_chunk(&mut self, _chunk: &[u8]) -> Result<(), LinkError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
    }

    struct NullConnector {
        fail: bool,
    }

    #[async_trait]
    impl Connector for NullConnector {
        type Link = NullLink;

        async fn connect(&self) -> Result<NullLink, LinkError> {
            if self.fail {
                Err(LinkError::Other("no such device".into()))
            } else {
                Ok(NullLink)
            }
        }
    }

    fn connection(fail: bool) -> Connection<NullConnector> {
        Connection::with_pacing(
            NullConnector { fail },
            Pacing::default()
                .with_chunk_delay(std::time::Duration::ZERO)
                .with_settle_delay(std::time::Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_starts_idle() {
        assert_eq!(connection(false).state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_connect_and_print() {
        let conn = connection(false);
        conn.connect().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);

        let report = conn.print(&[0u8; 10]).await.unwrap();
        assert_eq!(report.bytes, 10);
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_failed_connect_returns_to_prior_state() {
        let conn = connection(true);
        let err = conn.connect().await.unwrap_err();
        assert!(matches!(err, PrintError::ConnectFailed(_)));
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_connect_twice() {
        let conn = connection(false);
        conn.connect().await.unwrap();
        assert_eq!(conn.connect().await, Err(PrintError::AlreadyConnected));
    }

    #[tokio::test]
    async fn test_print_before_connect() {
        let conn = connection(false);
        assert_eq!(conn.print(b"x").await, Err(PrintError::NotConnected));
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_notifier_then_reconnect() {
        let conn = connection(false);
        conn.connect().await.unwrap();

        assert!(conn.disconnect_notifier().notify("out of range"));
        assert_eq!(conn.state(), ConnectionState::Disconnected);
        assert_eq!(conn.print(b"x").await, Err(PrintError::NotConnected));

        conn.connect().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_notifier_ignored_when_idle() {
        let conn = connection(false);
        assert!(!conn.disconnect_notifier().notify("spurious"));
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let conn = connection(false);
        conn.connect().await.unwrap();
        conn.disconnect().await;
        assert_eq!(conn.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_subscribe_sees_transitions() {
        let conn = connection(false);
        let mut rx = conn.subscribe();
        conn.connect().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ConnectionState::Connected);
    }
}
