//! One-way byte forwarding.
//!
//! A [`StreamPipe`] copies from a source to a sink in fixed 4 KiB chunks,
//! flushing after every chunk, until the source reaches end-of-stream. An I/O
//! error ends the pipe exactly like EOF does; the outcome records which one it
//! was, but callers treat both as "this direction is finished".

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of a single read.
pub const CHUNK_SIZE: usize = 4096;

/// Why a pipe stopped.
#[derive(Debug)]
pub enum PipeEnd {
    /// The source reported end-of-stream.
    Eof,
    /// Reading, writing, or flushing failed. Usually a peer reset.
    Error(io::Error),
    /// The stop signal fired first.
    Stopped,
}

impl std::fmt::Display for PipeEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipeEnd::Eof => write!(f, "eof"),
            PipeEnd::Error(e) => write!(f, "error: {}", e),
            PipeEnd::Stopped => write!(f, "stopped"),
        }
    }
}

/// Result of running a pipe to completion.
#[derive(Debug)]
pub struct PipeOutcome {
    /// Bytes written to the sink.
    pub bytes: u64,
    pub end: PipeEnd,
}

impl PipeOutcome {
    /// `true` unless the pipe ended on an I/O error.
    pub fn is_clean(&self) -> bool {
        !matches!(self.end, PipeEnd::Error(_))
    }
}

/// Unidirectional copy from `source` to `sink`.
#[derive(Debug)]
pub struct StreamPipe<R, W> {
    source: R,
    sink: W,
}

impl<R, W> StreamPipe<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(source: R, sink: W) -> Self {
        Self { source, sink }
    }

    /// Copy until the source ends or fails.
    pub async fn run(self) -> PipeOutcome {
        self.run_until(std::future::pending()).await
    }

    /// Copy until the source ends or fails, or until `stop` resolves.
    ///
    /// Either way the sink's write side is shut down afterwards so the far end
    /// observes EOF, then both halves are dropped.
    pub async fn run_until<F>(mut self, stop: F) -> PipeOutcome
    where
        F: Future<Output = ()>,
    {
        let mut bytes = 0u64;
        let end = tokio::select! {
            end = copy_chunks(&mut self.source, &mut self.sink, &mut bytes) => end,
            _ = stop => PipeEnd::Stopped,
        };

        let _ = self.sink.shutdown().await;
        PipeOutcome { bytes, end }
    }
}

async fn copy_chunks<R, W>(source: &mut R, sink: &mut W, bytes: &mut u64) -> PipeEnd
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match source.read(&mut buf).await {
            Ok(0) => return PipeEnd::Eof,
            Ok(n) => n,
            Err(e) => return PipeEnd::Error(e),
        };

        if let Err(e) = sink.write_all(&buf[..n]).await {
            return PipeEnd::Error(e);
        }
        if let Err(e) = sink.flush().await {
            return PipeEnd::Error(e);
        }
        *bytes += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{duplex, ReadBuf};
    use tokio::sync::oneshot;

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")))
        }
    }

    /// Sink that accepts everything and records each call.
    #[derive(Default)]
    struct RecordingSink {
        data: Vec<u8>,
        writes: Vec<usize>,
        flushes: usize,
        shut_down: bool,
    }

    impl AsyncWrite for RecordingSink {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.writes.push(buf.len());
            self.data.extend_from_slice(buf);
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            self.flushes += 1;
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            self.shut_down = true;
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn writes_are_bounded_by_chunk_size() {
        let payload = vec![7u8; 10_000];
        let mut sink = RecordingSink::default();

        let outcome = StreamPipe::new(&payload[..], &mut sink).run().await;

        assert_eq!(outcome.bytes, 10_000);
        assert_eq!(sink.data, payload);
        assert!(sink.writes.iter().all(|&n| n <= CHUNK_SIZE));
        assert_eq!(sink.writes, vec![CHUNK_SIZE, CHUNK_SIZE, 10_000 - 2 * CHUNK_SIZE]);
        assert!(sink.shut_down);
    }

    #[tokio::test]
    async fn every_chunk_is_flushed() {
        let payload = vec![1u8; 3 * CHUNK_SIZE + 1];
        let mut sink = RecordingSink::default();

        StreamPipe::new(&payload[..], &mut sink).run().await;

        assert_eq!(sink.writes.len(), 4);
        assert_eq!(sink.flushes, sink.writes.len());
    }

    #[tokio::test]
    async fn copies_everything_in_order() {
        let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        // small buffer forces many partial reads and writes
        let (mut reader, writer) = duplex(64);

        let source = payload.clone();
        let pipe = tokio::spawn(async move { StreamPipe::new(&source[..], writer).run().await });

        let mut received = Vec::new();
        reader.read_to_end(&mut received).await.unwrap();
        let outcome = pipe.await.unwrap();

        assert_eq!(received, payload);
        assert_eq!(outcome.bytes, payload.len() as u64);
        assert!(matches!(outcome.end, PipeEnd::Eof));
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn read_error_ends_like_eof() {
        let (mut reader, writer) = duplex(64);
        let outcome = StreamPipe::new(FailingReader, writer).run().await;

        assert!(matches!(outcome.end, PipeEnd::Error(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
        assert!(!outcome.is_clean());
        assert_eq!(outcome.bytes, 0);

        // sink was shut down, so the far side sees EOF rather than hanging
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn write_error_ends_the_pipe() {
        let (peer, writer) = duplex(64);
        drop(peer);

        let outcome = StreamPipe::new(&b"PING"[..], writer).run().await;
        assert!(matches!(outcome.end, PipeEnd::Error(_)));
        assert_eq!(outcome.bytes, 0);
    }

    #[tokio::test]
    async fn stop_signal_interrupts_a_blocked_read() {
        // `_idle` keeps the source open but never writes
        let (_idle, source) = duplex(64);
        let (mut reader, writer) = duplex(64);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let pipe = tokio::spawn(async move {
            StreamPipe::new(source, writer)
                .run_until(async {
                    let _ = stop_rx.await;
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        stop_tx.send(()).unwrap();

        let outcome = tokio::time::timeout(Duration::from_secs(1), pipe)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(outcome.end, PipeEnd::Stopped));

        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn end_display() {
        assert_eq!(PipeEnd::Eof.to_string(), "eof");
        assert_eq!(PipeEnd::Stopped.to_string(), "stopped");
        let e = PipeEnd::Error(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert_eq!(e.to_string(), "error: gone");
    }
}
