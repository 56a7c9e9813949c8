/// Fixed-length, zero-initialized storage behind one stream pair.
///
/// Only ever touched while the owning [`BlockMap`](crate::BlockMap) lock is held.
pub(crate) struct SharedBuffer(Box<[u8]>);

impl SharedBuffer {
    pub(crate) fn zeroed(len: usize) -> Self {
        Self(vec![0; len].into_boxed_slice())
    }

    /// The caller is responsible for ensuring `offset + data.len() <= self.len()`.
    pub(crate) fn copy_in(&mut self, offset: usize, data: &[u8]) {
        self.0[offset..offset + data.len()].copy_from_slice(data);
    }

    /// The caller is responsible for ensuring `offset + out.len() <= self.len()`.
    pub(crate) fn copy_out(&self, offset: usize, out: &mut [u8]) {
        out.copy_from_slice(&self.0[offset..offset + out.len()]);
    }
}
