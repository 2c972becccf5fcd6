//! Byte Source Abstraction

use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Duplex byte stream with a bounded-wait read
///
/// Implemented for every tokio stream, so a `SerialStream` and an in-memory
/// `DuplexStream` are interchangeable.
pub trait ByteSource: Send {
    /// Wait up to `wait` for data and read what is available into `buf`.
    ///
    /// Returns `Ok(None)` if nothing arrived in time and `Ok(Some(0))` at
    /// end of stream.
    fn read_with_timeout<'a>(
        &'a mut self,
        buf: &'a mut [u8],
        wait: Duration,
    ) -> impl Future<Output = io::Result<Option<usize>>> + Send + 'a;

    /// Write `bytes` with a single write call. The count may be short.
    fn write_bytes<'a>(
        &'a mut self,
        bytes: &'a [u8],
    ) -> impl Future<Output = io::Result<usize>> + Send + 'a;
}

impl<T> ByteSource for T
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn read_with_timeout<'a>(
        &'a mut self,
        buf: &'a mut [u8],
        wait: Duration,
    ) -> impl Future<Output = io::Result<Option<usize>>> + Send + 'a {
        async move {
            // `read` is cancel safe, so a timeout never loses bytes
            match tokio::time::timeout(wait, self.read(buf)).await {
                Ok(result) => result.map(Some),
                Err(_) => Ok(None),
            }
        }
    }

    fn write_bytes<'a>(
        &'a mut self,
        bytes: &'a [u8],
    ) -> impl Future<Output = io::Result<usize>> + Send + 'a {
        async move {
            let written = self.write(bytes).await?;
            self.flush().await?;
            Ok(written)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_read_times_out_on_silence() {
        let (mut near, _far) = tokio::io::duplex(64);
        let mut buf = [0u8; 8];
        let read = near
            .read_with_timeout(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_returns_available_bytes() {
        let (mut near, mut far) = tokio::io::duplex(64);
        far.write_all(&[1, 2, 3]).await.unwrap();

        let mut buf = [0u8; 8];
        let read = near
            .read_with_timeout(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(read, Some(3));
        assert_eq!(&buf[..3], &[1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_reports_end_of_stream() {
        let (mut near, far) = tokio::io::duplex(64);
        drop(far);

        let mut buf = [0u8; 8];
        let read = near
            .read_with_timeout(&mut buf, Duration::from_millis(5))
            .await
            .unwrap();
        assert_eq!(read, Some(0));
    }
}
