//! Regroup a byte stream into fixed-size chunks.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use databus_core::ChunkSize;
use futures_util::{Stream, StreamExt};

/// Stream adapter yielding chunks of exactly `chunk_size` bytes, except for
/// a shorter final chunk.
///
/// Network reads arrive in arbitrary sizes; regrouping them makes progress
/// reporting independent of how the server frames its response. An error
/// from the inner stream is forwarded once and ends the stream.
#[derive(Debug)]
pub struct Rechunk<St> {
    inner: St,
    buffer: BytesMut,
    chunk_size: usize,
    finished: bool,
}

impl<St> Rechunk<St> {
    /// Regroup `inner` into chunks of `chunk_size`.
    pub fn new(inner: St, chunk_size: ChunkSize) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            chunk_size: chunk_size.get(),
            finished: false,
        }
    }
}

impl<St, E> Stream for Rechunk<St>
where
    St: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.buffer.len() >= self.chunk_size {
                let size = self.chunk_size;
                return Poll::Ready(Some(Ok(self.buffer.split_to(size).freeze())));
            }
            if self.finished {
                if self.buffer.is_empty() {
                    return Poll::Ready(None);
                }
                return Poll::Ready(Some(Ok(self.buffer.split().freeze())));
            }
            match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(bytes)) => self.buffer.extend_from_slice(&bytes),
                Some(Err(err)) => {
                    self.finished = true;
                    self.buffer.clear();
                    return Poll::Ready(Some(Err(err)));
                }
                None => self.finished = true,
            }
        }
    }
}
