//! Streaming response bodies backed by pooled buffers.

use std::io;
use std::path::PathBuf;

use axum::body::{Body, Bytes};
use futures_util::stream::{self, TryStreamExt};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::buffer::PooledBuffer;

/// Stream `file` into a response body, reading through `buffer`.
///
/// The file and the buffer live inside the stream state, so both are released
/// when the transfer ends, fails, or the client goes away and the body is dropped.
pub fn file_body(file: File, buffer: PooledBuffer, path: PathBuf) -> Body {
    let chunks = stream::try_unfold((file, buffer), next_chunk).inspect_err(move |e| {
        tracing::error!(path = %path.display(), error = %e, "Copy content to response failed");
    });

    Body::from_stream(chunks)
}

async fn next_chunk(
    (mut file, mut buffer): (File, PooledBuffer),
) -> io::Result<Option<(Bytes, (File, PooledBuffer))>> {
    let read = file.read(&mut buffer[..]).await?;
    if read == 0 {
        return Ok(None);
    }
    let chunk = Bytes::copy_from_slice(&buffer[..read]);
    Ok(Some((chunk, (file, buffer))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::BufferPool;

    #[tokio::test]
    async fn streams_whole_file_and_returns_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let pool = BufferPool::new(1024, 2);
        let file = File::open(&path).await.unwrap();
        let body = file_body(file, pool.acquire(), path.clone());
        assert_eq!(pool.idle_count(), 0);

        let collected = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(collected.as_ref(), content.as_slice());
        assert_eq!(pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn dropped_body_releases_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();

        let pool = BufferPool::new(16, 2);
        let file = File::open(&path).await.unwrap();
        let body = file_body(file, pool.acquire(), path);
        drop(body);
        assert_eq!(pool.idle_count(), 1);
    }
}
