use std::io::{self, SeekFrom};

use crate::error::{Error, Result};

/// A cursor may rest anywhere in `[0, len]`; resting at `len` means end of buffer.
pub(crate) fn check_position(position: usize, len: usize) -> Result<()> {
    if position > len {
        return Err(Error::OutOfRange {
            start: position,
            end: position,
            len,
        });
    }

    Ok(())
}

/// Resolve a [`SeekFrom`] against the current cursor and the buffer length.
/// Bounds against `len` are checked separately by [`check_position`].
pub(crate) fn resolve_seek(pos: SeekFrom, current: usize, len: usize) -> io::Result<usize> {
    let (base, delta) = match pos {
        SeekFrom::Start(offset) => return usize::try_from(offset).map_err(|_| invalid_seek()),
        SeekFrom::End(delta) => (len, delta),
        SeekFrom::Current(delta) => (current, delta),
    };

    let target = base as i128 + delta as i128;

    usize::try_from(target).map_err(|_| invalid_seek())
}

fn invalid_seek() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "invalid seek to a negative or overflowing position",
    )
}
