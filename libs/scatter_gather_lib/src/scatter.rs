use std::io::{self, SeekFrom};
use std::sync::Arc;

use tracing::trace;

use crate::block_map::BlockMap;
use crate::buffer::SharedBuffer;
use crate::error::{Error, Result};
use crate::position::{check_position, resolve_seek};
use crate::types::Endpoint;

/// The write end of a stream pair.
///
/// Writes land in the shared buffer at any offset, in any order, and become
/// visible to the paired [`GatherStream`](crate::GatherStream) as soon as they
/// return. A write never waits for the reader.
///
/// Dropping the stream declares completion, so a reader waiting on a region
/// that was never written is released with end-of-stream.
pub struct ScatterStream {
    shared: Arc<BlockMap<SharedBuffer>>,
    position: usize,
}

impl ScatterStream {
    pub(crate) fn new(shared: Arc<BlockMap<SharedBuffer>>) -> Self {
        Self {
            shared,
            position: 0,
        }
    }

    /// Move the cursor. Fails if `position` is past the end of the buffer.
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        check_position(position, self.len())?;
        self.position = position;

        Ok(())
    }

    /// Write all of `data` at the cursor and advance it.
    ///
    /// Either the whole slice is written or, if it would run past the end of
    /// the buffer or the pair is already complete, nothing is and the cursor
    /// stays put.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.write_at(self.position, data)?;
        self.position += data.len();

        Ok(data.len())
    }

    /// Write all of `data` at `offset` without touching the cursor.
    ///
    /// Takes `&self`, so several producer tasks may share one endpoint.
    /// Fails with [`Error::Complete`] once completion has been declared, by
    /// either end.
    pub fn write_at(&self, offset: usize, data: &[u8]) -> Result<()> {
        let len = data.len();
        let published = self
            .shared
            .write_with(offset, len, |buffer| buffer.copy_in(offset, data))?;

        if !published {
            return Err(Error::Complete { offset, len });
        }

        trace!(offset, len, "scattered");

        Ok(())
    }

    /// The buffer is memory resident, so there is nothing to flush.
    pub fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Declare that no further writes will occur.
    pub fn complete(&self) {
        self.shared.mark_complete();
    }

    pub fn is_complete(&self) -> bool {
        self.shared.is_complete()
    }

    /// Close the stream, declaring completion if it was not declared yet.
    pub fn close(self) {}
}

impl Endpoint for ScatterStream {
    fn len(&self) -> usize {
        self.shared.capacity()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn can_read(&self) -> bool {
        false
    }

    fn can_write(&self) -> bool {
        true
    }
}

impl Drop for ScatterStream {
    fn drop(&mut self) {
        self.shared.mark_complete();
    }
}

impl io::Write for ScatterStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ScatterStream::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(ScatterStream::flush(self)?)
    }
}

impl io::Seek for ScatterStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = resolve_seek(pos, self.position, self.len())?;
        self.set_position(position)?;

        Ok(position as u64)
    }
}
