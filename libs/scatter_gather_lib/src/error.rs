use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failures surfaced by the stream endpoints and the block map.
///
/// End-of-stream is not an error: it is reported as a successful zero-length read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// No byte became available at `offset` before the pair timeout elapsed.
    #[error("no data became available at offset {offset} within {timeout:?}")]
    Timeout { offset: usize, timeout: Duration },

    /// A cursor or a written region would fall outside the buffer.
    #[error("range {start}..{end} is outside of buffer length {len}")]
    OutOfRange { start: usize, end: usize, len: usize },

    /// A write arrived after completion was declared, so it was refused.
    #[error("write of {len} bytes at offset {offset} after completion")]
    Complete { offset: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
    fn from(value: Error) -> Self {
        let kind = match value {
            Error::Timeout { .. } => io::ErrorKind::TimedOut,
            Error::OutOfRange { .. } => io::ErrorKind::InvalidInput,
            Error::Complete { .. } => io::ErrorKind::BrokenPipe,
        };

        io::Error::new(kind, value)
    }
}
