use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use tokio::sync::{Semaphore, SemaphorePermit};

use scrapegate_core::error::{GatewayError, Result};

/// Fixed gzip member header: magic, deflate, no flags, no mtime, unknown OS.
const GZIP_HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];

type Encoder = DeflateEncoder<Vec<u8>>;

/// Bounded pool of deflate encoders framed as gzip.
///
/// At most `capacity` encoders are checked out at once; `acquire` waits for
/// a free one beyond that. Encoders are created lazily, so `created()` never
/// exceeds `capacity`.
pub struct GzipPool {
    free: Mutex<Vec<Encoder>>,
    permits: Semaphore,
    level: Compression,
    capacity: usize,
    created: AtomicUsize,
}

impl GzipPool {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            permits: Semaphore::new(capacity),
            level: Compression::default(),
            capacity,
            created: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Encoders allocated over the pool's lifetime.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Encoders idle in the free list.
    pub fn idle(&self) -> usize {
        self.lock_free().len()
    }

    /// Check out an encoder for one response. The guard returns it on drop.
    pub async fn acquire(&self) -> Result<PooledGzip<'_>> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GatewayError::Internal("gzip pool closed".into()))?;

        let pooled = self.lock_free().pop();
        let encoder = match pooled {
            Some(enc) => enc,
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                DeflateEncoder::new(Vec::new(), self.level)
            }
        };

        Ok(PooledGzip {
            pool: self,
            encoder: Some(encoder),
            _permit: permit,
        })
    }

    fn release(&self, encoder: Encoder) {
        self.lock_free().push(encoder);
    }

    fn lock_free(&self) -> std::sync::MutexGuard<'_, Vec<Encoder>> {
        self.free.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// A checked-out encoder. Returned to the pool on every exit path.
pub struct PooledGzip<'a> {
    pool: &'a GzipPool,
    encoder: Option<Encoder>,
    _permit: SemaphorePermit<'a>,
}

impl PooledGzip<'_> {
    /// Compress `body` into a complete gzip member.
    pub fn compress(&mut self, body: &[u8]) -> Result<Vec<u8>> {
        let enc = self
            .encoder
            .as_mut()
            .ok_or_else(|| GatewayError::Internal("gzip encoder already released".into()))?;

        let mut dest = Vec::with_capacity(GZIP_HEADER.len() + body.len() / 4 + 64);
        dest.extend_from_slice(&GZIP_HEADER);
        enc.reset(dest).map_err(io_err)?;
        enc.write_all(body).map_err(io_err)?;
        let mut out = enc.reset(Vec::new()).map_err(io_err)?;

        let mut crc = Crc::new();
        crc.update(body);
        out.extend_from_slice(&crc.sum().to_le_bytes());
        out.extend_from_slice(&crc.amount().to_le_bytes());
        Ok(out)
    }
}

impl Drop for PooledGzip<'_> {
    fn drop(&mut self) {
        let Some(mut enc) = self.encoder.take() else { return };
        // Discard any half-written stream before the encoder is reused.
        match enc.reset(Vec::new()) {
            Ok(_) => self.pool.release(enc),
            Err(e) => {
                self.pool.created.fetch_sub(1, Ordering::Relaxed);
                tracing::warn!("dropping gzip encoder after failed reset: {e}");
            }
        }
    }
}

fn io_err(e: std::io::Error) -> GatewayError {
    GatewayError::Internal(format!("gzip: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Read;
    use std::sync::Arc;
    use std::time::Duration;

    use flate2::read::GzDecoder;

    fn gunzip(data: &[u8]) -> String {
        let mut out = String::new();
        GzDecoder::new(data).read_to_string(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn output_is_valid_gzip() {
        let pool = GzipPool::new(2);
        let body = "up{host=\"a\"} 1\n".repeat(100);
        let gz = pool.acquire().await.unwrap().compress(body.as_bytes()).unwrap();
        assert_eq!(&gz[..2], &[0x1f, 0x8b]);
        assert_eq!(gunzip(&gz), body);
    }

    #[tokio::test]
    async fn reused_encoder_does_not_leak_previous_body() {
        let pool = GzipPool::new(1);
        {
            let mut g = pool.acquire().await.unwrap();
            g.compress(b"secret_metric 42\n").unwrap();
        }
        let gz = pool.acquire().await.unwrap().compress(b"other 1\n").unwrap();
        assert_eq!(gunzip(&gz), "other 1\n");
        assert_eq!(pool.created(), 1);
    }

    #[tokio::test]
    async fn empty_body() {
        let pool = GzipPool::new(1);
        let gz = pool.acquire().await.unwrap().compress(b"").unwrap();
        assert_eq!(gunzip(&gz), "");
    }

    #[tokio::test]
    async fn sequential_use_allocates_once() {
        let pool = GzipPool::new(4);
        for i in 0..50 {
            let body = format!("n {i}\n");
            let gz = pool.acquire().await.unwrap().compress(body.as_bytes()).unwrap();
            assert_eq!(gunzip(&gz), body);
        }
        assert_eq!(pool.created(), 1);
        assert_eq!(pool.idle(), 1);
    }

    #[tokio::test]
    async fn checkouts_are_bounded_by_capacity() {
        let pool = GzipPool::new(2);
        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(blocked.is_err());

        drop(a);
        let c = tokio::time::timeout(Duration::from_millis(50), pool.acquire()).await;
        assert!(c.is_ok());
        drop(b);
        assert_eq!(pool.created(), 2);
    }

    #[tokio::test]
    async fn concurrent_use_never_exceeds_capacity() {
        let pool = Arc::new(GzipPool::new(3));
        let mut handles = Vec::new();
        for i in 0..32 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                let body = format!("metric{{i=\"{i}\"}} {i}\n").repeat(20);
                let gz = {
                    let mut g = pool.acquire().await.unwrap();
                    tokio::task::yield_now().await;
                    g.compress(body.as_bytes()).unwrap()
                };
                assert_eq!(gunzip(&gz), body);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert!(pool.created() <= pool.capacity());
        assert_eq!(pool.idle(), pool.created());
    }
}
