use core::ops::Range;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use range_set::RangeSet;
use tokio::sync::Notify;
use tokio::time;
use tracing::{debug, enabled, trace, warn, Level};

use crate::error::{Error, Result};
use crate::types::Availability;

struct State<T> {
    payload: T,
    ranges: RangeSet,
    complete: bool,
}

impl<T> State<T> {
    fn availability(&self, offset: usize) -> Availability {
        Availability {
            available: self.ranges.prefix_len(offset),
            complete: self.complete,
        }
    }
}

/// Tracks which byte ranges of a fixed-capacity buffer hold valid data, and
/// lets readers wait for data to appear.
///
/// A single lock guards the written ranges, the completion flag and an
/// arbitrary payload (for stream pairs, the shared byte buffer), so a payload
/// update and the publication of its range are observed together.
///
/// Waiters are released by any write and unconditionally by
/// [`BlockMap::mark_complete`]. Threads park on a condition variable; async
/// tasks park on a [`Notify`]. Neither polls.
pub struct BlockMap<T = ()> {
    capacity: usize,
    state: Mutex<State<T>>,
    signal: Condvar,
    notify: Notify,
}

impl BlockMap<()> {
    /// Create a map which only tracks ranges.
    pub fn new(capacity: usize) -> Self {
        Self::with_payload(capacity, ())
    }
}

impl<T> BlockMap<T> {
    pub fn with_payload(capacity: usize, payload: T) -> Self {
        Self {
            capacity,
            state: Mutex::new(State {
                payload,
                ranges: RangeSet::default(),
                complete: false,
            }),
            signal: Condvar::new(),
            notify: Notify::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mark `offset..offset + len` as holding valid data and wake all waiters.
    ///
    /// See [`BlockMap::write_with`] for the return value.
    pub fn mark_written(&self, offset: usize, len: usize) -> Result<bool> {
        self.write_with(offset, len, |_| ())
    }

    /// Run `f` on the payload and mark `offset..offset + len` as written, both
    /// under one acquisition of the lock, then wake all waiters.
    ///
    /// Fails without calling `f` if the range does not fit in the capacity.
    /// Once the map is complete no range is ever added again: `f` is not
    /// called and `Ok(false)` is returned.
    pub fn write_with<F>(&self, offset: usize, len: usize, f: F) -> Result<bool>
    where
        F: FnOnce(&mut T),
    {
        let range = self.checked_range(offset, len)?;

        {
            let mut state = self.state.lock();

            if state.complete {
                debug!(offset, len, "ignoring write after completion");
                return Ok(false);
            }

            f(&mut state.payload);
            state.ranges.insert(range);
        }

        self.wake();

        Ok(true)
    }

    /// Returns true if a single written run covers `offset..offset + len`.
    pub fn is_available(&self, offset: usize, len: usize) -> bool {
        self.state
            .lock()
            .ranges
            .contains(offset..offset.saturating_add(len))
    }

    /// Length of the written run starting exactly at `offset`, or 0.
    pub fn available_prefix(&self, offset: usize) -> usize {
        self.state.lock().ranges.prefix_len(offset)
    }

    /// Smallest range spanning the unwritten parts of `range`, or [`None`] if
    /// every byte of it has been written.
    pub fn missing(&self, range: Range<usize>) -> Option<Range<usize>> {
        self.state.lock().ranges.gaps(range)
    }

    /// Snapshot of the written runs, in ascending order.
    pub fn ranges(&self) -> Vec<Range<usize>> {
        self.state.lock().ranges.iter().collect()
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().complete
    }

    /// Declare that no further ranges will be written, releasing every current
    /// and future waiter. Returns true if this call set the flag.
    pub fn mark_complete(&self) -> bool {
        let newly_complete = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.complete, true)
        };

        self.wake();

        if newly_complete {
            debug!(capacity = self.capacity, "block map complete");
        }

        newly_complete
    }

    /// Block the current thread until data is available at `offset` or the map
    /// is complete. Fails with [`Error::Timeout`] if neither happens in time.
    pub fn wait(&self, offset: usize, timeout: Duration) -> Result<Availability> {
        self.read_with(offset, timeout, |_, availability| availability)
    }

    /// Async counterpart of [`BlockMap::wait`].
    pub async fn wait_async(&self, offset: usize, timeout: Duration) -> Result<Availability> {
        self.read_with_async(offset, timeout, |_, availability| availability)
            .await
    }

    /// Wait as in [`BlockMap::wait`], then run `f` on the payload while still
    /// holding the lock the availability was observed under.
    pub fn read_with<F, R>(&self, offset: usize, timeout: Duration, f: F) -> Result<R>
    where
        F: FnOnce(&T, Availability) -> R,
    {
        // A deadline too far away to represent means waiting without bound.
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        let mut timed_out = false;

        loop {
            let availability = state.availability(offset);

            if availability.is_ready() {
                return Ok(f(&state.payload, availability));
            }

            if timed_out {
                return Err(self.timeout_error(&state.ranges, offset, timeout));
            }

            timed_out = match deadline {
                Some(deadline) => self.signal.wait_until(&mut state, deadline).timed_out(),
                None => {
                    self.signal.wait(&mut state);
                    false
                }
            };
        }
    }

    /// Async counterpart of [`BlockMap::read_with`]. Suspends the task, not the
    /// thread, while waiting.
    pub async fn read_with_async<F, R>(&self, offset: usize, timeout: Duration, f: F) -> Result<R>
    where
        F: FnOnce(&T, Availability) -> R,
    {
        let deadline = time::Instant::now().checked_add(timeout);
        let mut timed_out = false;

        loop {
            let notified = {
                let state = self.state.lock();
                let availability = state.availability(offset);

                if availability.is_ready() {
                    return Ok(f(&state.payload, availability));
                }

                if timed_out {
                    return Err(self.timeout_error(&state.ranges, offset, timeout));
                }

                // Registered while locked, so a wake issued after we unlock
                // cannot be missed.
                self.notify.notified()
            };

            match deadline {
                Some(deadline) => {
                    timed_out = time::timeout_at(deadline, notified).await.is_err();
                }
                None => notified.await,
            }

            trace!(offset, timed_out, "block map waiter woke");
        }
    }

    fn wake(&self) {
        self.signal.notify_all();
        self.notify.notify_waiters();
    }

    fn checked_range(&self, offset: usize, len: usize) -> Result<Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity => Ok(offset..end),
            end => Err(Error::OutOfRange {
                start: offset,
                end: end.unwrap_or(usize::MAX),
                len: self.capacity,
            }),
        }
    }

    fn timeout_error(&self, ranges: &RangeSet, offset: usize, timeout: Duration) -> Error {
        if enabled!(Level::WARN) {
            let missing = ranges.gaps(offset..self.capacity.max(offset));
            warn!(offset, ?timeout, ?missing, "timed out waiting for data");
        }

        Error::Timeout { offset, timeout }
    }
}
