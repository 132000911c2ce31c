//! # Transport Tests
//!
//! Drives the chunked writer and the connection state machine against an
//! in-memory link. Timing assertions run on tokio's paused clock, so the
//! 80ms / 200ms pacing is measured exactly and costs no wall time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use escpos_receipt::transport::{
    ChunkReport, Connection, ConnectionState, Connector, Link, LinkError, Pacing, PrintError,
    write_chunked,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

// ============================================================================
// FIXTURES
// ============================================================================

/// One accepted write and when it happened.
#[derive(Debug, Clone)]
struct Sent {
    at: Instant,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct Recorder {
    writes: Vec<Sent>,
    /// Fail the write with this index (counted over all writes), once
    fail_at: Option<(usize, LinkError)>,
    attempts: usize,
    closed: bool,
}

/// Link that records every chunk into shared state.
#[derive(Clone, Default)]
struct RecordingLink {
    log: Arc<Mutex<Recorder>>,
}

impl RecordingLink {
    fn failing_at(index: usize, error: LinkError) -> Self {
        let link = Self::default();
        link.log.lock().unwrap().fail_at = Some((index, error));
        link
    }

    fn writes(&self) -> Vec<Sent> {
        self.log.lock().unwrap().writes.clone()
    }

    fn sizes(&self) -> Vec<usize> {
        self.writes().iter().map(|w| w.bytes.len()).collect()
    }

    fn received(&self) -> Vec<u8> {
        self.writes().into_iter().flat_map(|w| w.bytes).collect()
    }

    fn closed(&self) -> bool {
        self.log.lock().unwrap().closed
    }
}

#[async_trait]
impl Link for RecordingLink {
    async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError> {
        let mut log = self.log.lock().unwrap();
        let attempt = log.attempts;
        log.attempts += 1;
        if log.fail_at.as_ref().is_some_and(|(index, _)| *index == attempt) {
            if let Some((_, error)) = log.fail_at.take() {
                return Err(error);
            }
        }
        log.writes.push(Sent {
            at: Instant::now(),
            bytes: chunk.to_vec(),
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<(), LinkError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out clones of one [`RecordingLink`].
struct RecordingConnector {
    link: RecordingLink,
    refuse: bool,
}

impl RecordingConnector {
    fn new(link: RecordingLink) -> Self {
        Self { link, refuse: false }
    }
}

#[async_trait]
impl Connector for RecordingConnector {
    type Link = RecordingLink;

    async fn connect(&self) -> Result<RecordingLink, LinkError> {
        if self.refuse {
            return Err(LinkError::Other("device not found".into()));
        }
        Ok(self.link.clone())
    }
}

fn job(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

async fn connected(link: &RecordingLink) -> Connection<RecordingConnector> {
    let conn = Connection::new(RecordingConnector::new(link.clone()));
    conn.connect().await.unwrap();
    conn
}

// ============================================================================
// CHUNKED WRITER
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_600_bytes_default_pacing() {
    let mut link = RecordingLink::default();
    let data = job(600);
    let start = Instant::now();

    let report = write_chunked(&mut link, &data, &Pacing::default(), || true)
        .await
        .unwrap();

    assert_eq!(report, ChunkReport { chunks: 3, bytes: 600 });
    assert_eq!(link.sizes(), vec![256, 256, 88]);

    let offsets: Vec<Duration> = link.writes().iter().map(|w| w.at - start).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_millis(80),
            Duration::from_millis(160)
        ]
    );
    assert_eq!(start.elapsed(), Duration::from_millis(360));
    assert_eq!(link.received(), data);
}

#[tokio::test(start_paused = true)]
async fn test_chunking_law() {
    for (len, size) in [(1, 256), (256, 256), (257, 256), (1000, 7), (4096, 512)] {
        let mut link = RecordingLink::default();
        let data = job(len);
        let pacing = Pacing::default().with_chunk_size(size);

        write_chunked(&mut link, &data, &pacing, || true).await.unwrap();

        let sizes = link.sizes();
        assert_eq!(sizes.len(), len.div_ceil(size), "len {} size {}", len, size);
        assert!(sizes.iter().all(|&s| s <= size));
        assert_eq!(link.received(), data);
    }
}

#[tokio::test(start_paused = true)]
async fn test_empty_job_returns_immediately() {
    let mut link = RecordingLink::default();
    let start = Instant::now();
    let report = write_chunked(&mut link, &[], &Pacing::default(), || true)
        .await
        .unwrap();
    assert_eq!(report.chunks, 0);
    assert!(link.writes().is_empty());
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_failed_chunk_is_not_retried() {
    let mut link = RecordingLink::failing_at(1, LinkError::Other("gatt error".into()));
    let result = write_chunked(&mut link, &job(600), &Pacing::default(), || true).await;

    assert_eq!(result, Err(LinkError::Other("gatt error".into())));
    assert_eq!(link.sizes(), vec![256]);
}

// ============================================================================
// CONNECTION STATE MACHINE
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_print_requires_connection() {
    let link = RecordingLink::default();
    let conn = Connection::new(RecordingConnector::new(link.clone()));

    assert_eq!(conn.print(&job(10)).await, Err(PrintError::NotConnected));
    assert!(link.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_print_cycles_through_printing() {
    let link = RecordingLink::default();
    let conn = Arc::new(connected(&link).await);
    let mut states = conn.subscribe();

    let printer = Arc::clone(&conn);
    let task = tokio::spawn(async move { printer.print(&job(600)).await });

    states
        .wait_for(|s| *s == ConnectionState::Printing)
        .await
        .unwrap();
    let report = task.await.unwrap().unwrap();

    assert_eq!(report.bytes, 600);
    assert_eq!(conn.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_second_job_is_busy() {
    let link = RecordingLink::default();
    let conn = Arc::new(connected(&link).await);
    let mut states = conn.subscribe();

    let printer = Arc::clone(&conn);
    let first = tokio::spawn(async move { printer.print(&job(600)).await });
    states
        .wait_for(|s| *s == ConnectionState::Printing)
        .await
        .unwrap();

    assert_eq!(conn.print(&job(10)).await, Err(PrintError::Busy));

    first.await.unwrap().unwrap();
    assert_eq!(link.sizes(), vec![256, 256, 88]);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_mid_job_aborts() {
    let link = RecordingLink::default();
    let conn = Arc::new(connected(&link).await);
    let notifier = conn.disconnect_notifier();

    // Chunks go out at 0ms, 80ms, 160ms; the device drops at 100ms
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        notifier.notify("out of range");
    });

    let result = conn.print(&job(600)).await;

    assert!(matches!(result, Err(PrintError::Disconnected(_))));
    assert_eq!(link.sizes(), vec![256, 256]);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_while_aborted_job_drains() {
    let link = RecordingLink::default();
    let conn = Arc::new(connected(&link).await);

    let printer = Arc::clone(&conn);
    let job_task = tokio::spawn(async move { printer.print(&job(600)).await });

    // The job holds the link, sleeping until its second chunk at 80ms
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(conn.disconnect_notifier().notify("out of range"));

    conn.connect().await.unwrap();
    assert_eq!(conn.state(), ConnectionState::Connected);

    let aborted = job_task.await.unwrap();
    assert!(matches!(aborted, Err(PrintError::Disconnected(_))));
    assert_eq!(conn.state(), ConnectionState::Connected);

    conn.print(&job(10)).await.unwrap();
    assert_eq!(link.sizes(), vec![256, 10]);
}

#[tokio::test(start_paused = true)]
async fn test_link_loss_during_write() {
    let link = RecordingLink::failing_at(1, LinkError::Disconnected("gatt closed".into()));
    let conn = connected(&link).await;

    let err = conn.print(&job(600)).await.unwrap_err();

    assert_eq!(err, PrintError::Disconnected("gatt closed".into()));
    assert_eq!(err.to_string(), "printer disconnected during print: gatt closed");
    assert!(!err.is_retryable_without_reencode());
    assert_eq!(link.sizes(), vec![256]);
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert_eq!(conn.print(&job(10)).await, Err(PrintError::NotConnected));
}

#[tokio::test(start_paused = true)]
async fn test_write_error_keeps_connection() {
    let link = RecordingLink::failing_at(1, LinkError::Other("write timed out".into()));
    let conn = connected(&link).await;
    let data = job(600);

    let err = conn.print(&data).await.unwrap_err();
    assert_eq!(err, PrintError::Write("write timed out".into()));
    assert!(err.is_retryable_without_reencode());
    assert_eq!(conn.state(), ConnectionState::Connected);

    // Same bytes again on the same connection
    conn.print(&data).await.unwrap();
    let sizes = link.sizes();
    assert_eq!(sizes, vec![256, 256, 256, 88]);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_after_disconnect() {
    let link = RecordingLink::default();
    let conn = connected(&link).await;

    conn.disconnect().await;
    assert_eq!(conn.state(), ConnectionState::Disconnected);
    assert!(link.closed());

    conn.connect().await.unwrap();
    conn.print(&job(10)).await.unwrap();
    assert_eq!(conn.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_refused_connect() {
    let conn = Connection::new(RecordingConnector {
        link: RecordingLink::default(),
        refuse: true,
    });
    let err = conn.connect().await.unwrap_err();
    assert_eq!(err, PrintError::ConnectFailed("device not found".into()));
    assert_eq!(conn.state(), ConnectionState::Idle);
}
