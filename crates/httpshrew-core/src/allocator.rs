//! Linear memory allocator backing the `Alloc` and `Free` exports
//!
//! The host cannot hold Rust values, only addresses. Every buffer handed to
//! the host is therefore parked in an allocation table keyed by its address,
//! which keeps it alive until the host explicitly frees it.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Table of buffers currently lent to the host.
///
/// All mutations go through a single exclusive lock, so no partially updated
/// state is ever observable.
#[derive(Debug, Default)]
pub struct LinearAllocator {
    blobs: Mutex<HashMap<usize, Box<[u8]>>>,
}

impl LinearAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-filled buffer of `size` bytes and return its address.
    ///
    /// A zero-sized request is backed by one byte: empty boxed slices share a
    /// dangling address, which would break uniqueness of live addresses.
    /// Out-of-memory aborts the process since the boundary has no error channel.
    pub fn allocate(&self, size: usize) -> usize {
        let buffer = vec![0u8; size.max(1)].into_boxed_slice();
        let address = buffer.as_ptr() as usize;
        let mut blobs = self.blobs.lock();
        blobs.insert(address, buffer);
        log::trace!("allocated {} bytes at {:#x} ({} live)", size, address, blobs.len());
        address
    }

    /// Release the buffer at `address`.
    ///
    /// Unknown addresses and double frees are ignored. `size` is only checked
    /// for diagnostics; the recorded length is authoritative.
    pub fn free(&self, address: usize, size: usize) {
        let released = self.blobs.lock().remove(&address);
        match released {
            Some(buffer) => {
                if buffer.len() != size.max(1) {
                    log::debug!(
                        "free of {:#x} with size {} but {} bytes were allocated",
                        address,
                        size,
                        buffer.len()
                    );
                }
            }
            None => log::debug!("ignoring free of unknown address {:#x}", address),
        }
    }

    /// Copy `bytes` into a fresh allocation and return its address.
    pub fn allocate_from(&self, bytes: &[u8]) -> usize {
        let mut buffer = bytes.to_vec();
        if buffer.is_empty() {
            buffer.push(0);
        }
        let buffer = buffer.into_boxed_slice();
        let address = buffer.as_ptr() as usize;
        self.blobs.lock().insert(address, buffer);
        address
    }

    pub fn contains(&self, address: usize) -> bool {
        self.blobs.lock().contains_key(&address)
    }

    /// Length of the live buffer at `address`, if any.
    pub fn len_of(&self, address: usize) -> Option<usize> {
        self.blobs.lock().get(&address).map(|buffer| buffer.len())
    }

    pub fn live_allocations(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn live_bytes(&self) -> usize {
        self.blobs.lock().values().map(|buffer| buffer.len()).sum()
    }
}
