/// Snapshot of what a waiter observed at its offset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Length of the contiguous written run starting at the offset.
    pub available: usize,

    /// Whether the producer has declared that no further writes will occur.
    pub complete: bool,
}

impl Availability {
    /// A wait resolves once either condition holds.
    pub fn is_ready(&self) -> bool {
        self.available > 0 || self.complete
    }

    /// Nothing is available at the offset and nothing ever will be.
    pub fn is_end_of_stream(&self) -> bool {
        self.available == 0 && self.complete
    }
}

/// The byte stream contract shared by both ends of a pair.
pub trait Endpoint {
    /// The fixed capacity of the shared buffer.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The cursor of this endpoint.
    fn position(&self) -> usize;

    fn can_read(&self) -> bool;

    fn can_write(&self) -> bool;

    fn can_seek(&self) -> bool {
        true
    }
}
