use std::io::{self, SeekFrom};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures::{stream, Stream};
use tracing::trace;

use crate::block_map::BlockMap;
use crate::buffer::SharedBuffer;
use crate::error::Result;
use crate::position::{check_position, resolve_seek};
use crate::types::{Availability, Endpoint};

/// The read end of a stream pair.
///
/// A read returns whatever contiguous run of written bytes starts at the
/// requested offset, up to the size of the destination. It waits only when
/// nothing at all is available there, and for at most the pair timeout.
///
/// Reads follow the usual short-read contract: callers needing an exact
/// amount must loop until they have it, or until a read returns 0
/// (end-of-stream) or fails.
pub struct GatherStream {
    shared: Arc<BlockMap<SharedBuffer>>,
    position: usize,
    timeout: Duration,
}

impl GatherStream {
    pub(crate) fn new(shared: Arc<BlockMap<SharedBuffer>>, timeout: Duration) -> Self {
        Self {
            shared,
            position: 0,
            timeout,
        }
    }

    /// The bound on every wait issued by this stream.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Move the cursor. Fails if `position` is past the end of the buffer.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        check_position(position, self.len())?;
        self.position = position;

        Ok(())
    }

    /// Read at the cursor and advance it by the number of bytes returned.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = self.read_at(self.position, buf)?;
        self.position += count;

        Ok(count)
    }

    /// Read at `offset` without touching the cursor, blocking the thread while
    /// nothing is available there.
    ///
    /// Returns 0 at end-of-stream, which is when the producer has completed and
    /// nothing is written at `offset`, or when `offset` is at the end of the
    /// buffer. Fails with [`Error::Timeout`](crate::Error::Timeout) if no byte
    /// arrives in time.
    pub fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.len() {
            return Ok(0);
        }

        let count = self
            .shared
            .read_with(offset, self.timeout, |buffer, availability| {
                copy_available(buffer, offset, buf, availability)
            })?;

        trace!(offset, count, "gathered");

        Ok(count)
    }

    /// Async counterpart of [`GatherStream::read`].
    pub async fn read_async(&mut self, buf: &mut [u8]) -> Result<usize> {
        let count = self.read_at_async(self.position, buf).await?;
        self.position += count;

        Ok(count)
    }

    /// Async counterpart of [`GatherStream::read_at`]. Suspends the task, not
    /// the thread, while nothing is available.
    pub async fn read_at_async(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || offset >= self.len() {
            return Ok(0);
        }

        let count = self
            .shared
            .read_with_async(offset, self.timeout, |buffer, availability| {
                copy_available(buffer, offset, buf, availability)
            })
            .await?;

        trace!(offset, count, "gathered");

        Ok(count)
    }

    /// Consumes the stream into a sequential stream of chunks of at most
    /// `chunk_size` bytes, from the cursor until end-of-stream.
    ///
    /// The stream ends after yielding its first error.
    pub fn into_stream(self, chunk_size: usize) -> impl Stream<Item = Result<Bytes>> + Send {
        let chunk_size = chunk_size.max(1);

        stream::unfold(Some(self), move |this| async move {
            let mut this = this?;
            let mut chunk = BytesMut::zeroed(chunk_size);

            match this.read_async(&mut chunk).await {
                Ok(0) => None,
                Ok(count) => {
                    chunk.truncate(count);
                    Some((Ok(chunk.freeze()), Some(this)))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }

    /// Close the stream. This also declares completion, since nobody is left
    /// to read what the producer writes afterwards.
    pub fn close(self) {}
}

/// Copies the available prefix at `offset`, truncated to the size of `out`.
fn copy_available(
    buffer: &SharedBuffer,
    offset: usize,
    out: &mut [u8],
    availability: Availability,
) -> usize {
    let count = out.len().min(availability.available);
    buffer.copy_out(offset, &mut out[..count]);
    count
}

impl Endpoint for GatherStream {
    fn len(&self) -> usize {
        self.shared.capacity()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        false
    }
}

impl Drop for GatherStream {
    fn drop(&mut self) {
        self.shared.mark_complete();
    }
}

impl io::Read for GatherStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(GatherStream::read(self, buf)?)
    }
}

impl io::Seek for GatherStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = resolve_seek(pos, self.position, self.len())?;
        self.set_position(position)?;

        Ok(position as u64)
    }
}
