use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::block_map::BlockMap;
use crate::buffer::SharedBuffer;
use crate::gather::GatherStream;
use crate::scatter::ScatterStream;

/// The timeout used by [`pair`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for creating a stream pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairOptions {
    /// Bound on every wait issued by the gather end.
    pub timeout: Duration,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl PairOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Allocate a zeroed buffer of `len` bytes and return both ends bound to it.
    /// Each call creates fully independent state.
    pub fn pair(&self, len: usize) -> (ScatterStream, GatherStream) {
        let shared = Arc::new(BlockMap::with_payload(len, SharedBuffer::zeroed(len)));

        debug!(len, timeout = ?self.timeout, "created stream pair");

        (
            ScatterStream::new(shared.clone()),
            GatherStream::new(shared, self.timeout),
        )
    }
}

/// Create a stream pair over `len` bytes with the [`DEFAULT_TIMEOUT`].
pub fn pair(len: usize) -> (ScatterStream, GatherStream) {
    PairOptions::default().pair(len)
}

/// Create a stream pair over `len` bytes with the given read timeout.
pub fn pair_with_timeout(len: usize, timeout: Duration) -> (ScatterStream, GatherStream) {
    PairOptions::default().with_timeout(timeout).pair(len)
}
