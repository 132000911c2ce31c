//! # Chunked Writes
//!
//! Small thermal printers have tiny receive buffers and BLE links drop
//! data when flooded. A job is cut into fixed-size chunks and written one
//! at a time with a pause between them:
//!
//! ```text
//! t=0      write [0..256)
//! t=80ms   write [256..512)
//! t=160ms  write [512..600)
//! t=360ms  done (200ms settle after the last chunk)
//! ```
//!
//! The settle delay gives the printer time to drain its buffer before the
//! job is reported complete.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Link, LinkError};

/// Default bytes per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Default pause between chunks (milliseconds)
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 80;

/// Default pause after the last chunk (milliseconds)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Chunk size and delays for one link.
///
/// Loaded from the `transport` section of the preferences file:
///
/// ```json
/// { "chunkSize": 128, "chunkDelayMs": 100, "settleDelayMs": 300 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pacing {
    pub chunk_size: usize,
    pub chunk_delay_ms: u64,
    pub settle_delay_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl Pacing {
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Chunk size actually used; zero is treated as one byte.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.max(1)
    }

    /// Number of chunks a buffer of `len` bytes is cut into.
    pub fn chunk_count(&self, len: usize) -> usize {
        len.div_ceil(self.effective_chunk_size())
    }
}

/// What a completed [`write_chunked`] call delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub chunks: usize,
    pub bytes: usize,
}

/// Write `data` to `link` in paced chunks.
///
/// `still_connected` is consulted before every chunk; once it returns
/// false the job aborts with [`LinkError::Disconnected`] and no further
/// chunk is written. A failing chunk aborts the job as well. Nothing is
/// retried.
///
/// An empty buffer performs no writes and skips the settle delay.
pub async fn write_chunked<L, F>(
    link: &mut L,
    data: &[u8],
    pacing: &Pacing,
    mut still_connected: F,
) -> Result<ChunkReport, LinkError>
where
    L: Link + ?Sized,
    F: FnMut() -> bool,
{
    let mut report = ChunkReport::default();
    if data.is_empty() {
        return Ok(report);
    }

    let total = pacing.chunk_count(data.len());
    debug!(bytes = data.len(), chunks = total, "Writing job");

    for (i, chunk) in data.chunks(pacing.effective_chunk_size()).enumerate() {
        if !still_connected() {
            warn!(written = i, chunks = total, "Device disconnected, aborting job");
            return Err(LinkError::Disconnected(format!(
                "device disconnected after {} of {} chunks",
                i, total
            )));
        }

        if let Err(e) = link.write_chunk(chunk).await {
            warn!(chunk = i, error = %e, "Chunk write failed");
            return Err(e);
        }
        report.chunks += 1;
        report.bytes += chunk.len();

        let pause = if i + 1 < total {
            pacing.chunk_delay()
        } else {
            pacing.settle_delay()
        };
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    debug!(chunks = report.chunks, bytes = report.bytes, "Job written");
    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Default)]
    struct MemoryLink {
        chunks: Vec<Vec<u8>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl Link for MemoryLink {
        async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError> {
            if self.fail_on == Some(self.chunks.len()) {
                return Err(LinkError::Other("write rejected".into()));
            }
            self.chunks.push(chunk.to_vec());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), LinkError> {
            Ok(())
        }
    }

    fn no_delay(size: usize) -> Pacing {
        Pacing::default()
            .with_chunk_size(size)
            .with_chunk_delay(Duration::ZERO)
            .with_settle_delay(Duration::ZERO)
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.chunk_size, 256);
        assert_eq!(pacing.chunk_delay(), Duration::from_millis(80));
        assert_eq!(pacing.settle_delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_pacing_from_json() {
        let pacing: Pacing = serde_json::from_str(r#"{"chunkSize": 128}"#).unwrap();
        assert_eq!(pacing.chunk_size, 128);
        assert_eq!(pacing.chunk_delay_ms, 80);
    }

    #[test]
    fn test_chunk_count() {
        let pacing = Pacing::default();
        assert_eq!(pacing.chunk_count(0), 0);
        assert_eq!(pacing.chunk_count(256), 1);
        assert_eq!(pacing.chunk_count(257), 2);
        assert_eq!(pacing.with_chunk_size(0).chunk_count(3), 3);
    }

    #[tokio::test]
    async fn test_chunks_concatenate_to_input() {
        let data: Vec<u8> = (0..1000u32).map(|i| i as u8).collect();
        let mut link = MemoryLink::default();
        let report = write_chunked(&mut link, &data, &no_delay(300), || true)
            .await
            .unwrap();

        assert_eq!(report.chunks, 4);
        assert_eq!(report.bytes, 1000);
        assert!(link.chunks.iter().all(|c| c.len() <= 300));
        assert_eq!(link.chunks.concat(), data);
    }

    #[tokio::test]
    async fn test_empty_buffer_writes_nothing() {
        let mut link = MemoryLink::default();
        let report = write_chunked(&mut link, &[], &Pacing::default(), || true)
            .await
            .unwrap();
        assert_eq!(report, ChunkReport::default());
        assert!(link.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_lost_connection_aborts_before_next_chunk() {
        let mut link = MemoryLink::default();
        let mut calls = 0;
        let result = write_chunked(&mut link, &[0u8; 50], &no_delay(10), || {
            calls += 1;
            calls <= 2
        })
        .await;

        assert!(matches!(result, Err(LinkError::Disconnected(_))));
        assert_eq!(link.chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_write_failure_stops_job() {
        let mut link = MemoryLink {
            fail_on: Some(1),
            ..Default::default()
        };
        let result = write_chunked(&mut link, &[0u8; 30], &no_delay(10), || true).await;

        assert_eq!(result, Err(LinkError::Other("write rejected".into())));
        assert_eq!(link.chunks.len(), 1);
    }
}
