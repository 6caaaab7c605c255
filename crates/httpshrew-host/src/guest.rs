//! The guest side of the boundary, as seen from the host
//!
//! [`GuestExports`] is the whole contract: three exported functions plus
//! raw access to the guest's linear memory. Everything the host does goes
//! through it, so the same [`crate::HostAdapter`] drives an in-process
//! bridge or a sandboxed module.

use anyhow::{anyhow, Result};
use httpshrew_core::Bridge;
use httpshrew_support::compat::{view, view_mut, Region};
use std::sync::Arc;

pub trait GuestExports {
    /// Call `Alloc(size)`.
    fn alloc(&mut self, size: usize) -> Result<usize>;

    /// Call `Free(address, size)`.
    fn free(&mut self, address: usize, size: usize) -> Result<()>;

    /// Call `Handle(address, length)` and unpack the returned word.
    fn handle(&mut self, address: usize, length: usize) -> Result<Region>;

    /// Copy `bytes` into guest memory at `address`.
    fn write_memory(&mut self, address: usize, bytes: &[u8]) -> Result<()>;

    /// Copy `length` bytes out of guest memory starting at `address`.
    fn read_memory(&mut self, address: usize, length: usize) -> Result<Vec<u8>>;
}

/// A guest that is a [`Bridge`] in this process.
///
/// Memory access is checked against the bridge's allocation table, so a
/// region that was never allocated (or was already freed) is an error here
/// rather than a wild pointer.
#[derive(Clone, Debug)]
pub struct InProcessGuest {
    bridge: Arc<Bridge>,
}

impl InProcessGuest {
    pub fn new(bridge: Arc<Bridge>) -> Self {
        Self { bridge }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    fn check_region(&self, address: usize, length: usize) -> Result<()> {
        match self.bridge.allocator().len_of(address) {
            Some(capacity) if length <= capacity => Ok(()),
            Some(capacity) => Err(anyhow!(
                "access of {} bytes at {:#x} exceeds allocation of {} bytes",
                length,
                address,
                capacity
            )),
            None => Err(anyhow!("address {:#x} is not a live allocation", address)),
        }
    }
}

impl GuestExports for InProcessGuest {
    fn alloc(&mut self, size: usize) -> Result<usize> {
        Ok(self.bridge.alloc(size))
    }

    fn free(&mut self, address: usize, size: usize) -> Result<()> {
        self.bridge.free(address, size);
        Ok(())
    }

    fn handle(&mut self, address: usize, length: usize) -> Result<Region> {
        self.check_region(address, length)?;
        // SAFETY: the region lies inside a live allocation owned by the bridge.
        Ok(unsafe { self.bridge.handle(address, length) })
    }

    fn write_memory(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        self.check_region(address, bytes.len())?;
        // SAFETY: checked against the allocation table above.
        unsafe { view_mut(address, bytes.len()) }.copy_from_slice(bytes);
        Ok(())
    }

    fn read_memory(&mut self, address: usize, length: usize) -> Result<Vec<u8>> {
        self.check_region(address, length)?;
        // SAFETY: checked against the allocation table above.
        Ok(unsafe { view(address, length) }.to_vec())
    }
}
