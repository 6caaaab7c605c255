//! # Linear Memory Views and Region Packing
//!
//! This module provides the only primitives in httpshrew that turn an integer
//! address into a byte range, together with the packing used to return a
//! buffer's address and length across the WASM boundary as one `u64`.
//!
//! ## Core Concepts
//!
//! ### Addressed views
//! The host only ever holds addresses it obtained from the guest's `Alloc`
//! export or from a packed `Handle` result. [`view`] and [`view_mut`]
//! reinterpret such an address as a slice of the module's own linear memory.
//! There is no bounds checking beyond what the host is trusted to respect.
//!
//! ### Packed regions
//! A [`Region`] is an `(address, length)` pair. The `Handle` export returns it
//! packed as:
//! ```text
//! bits 63..32: length
//! bits 31..0 : address
//! ```
//!
//! ## Usage Examples
//!
//! ```rust
//! use httpshrew_support::compat::Region;
//!
//! let region = Region::new(0x1000, 42);
//! let word = region.pack().unwrap();
//! assert_eq!(word, (42u64 << 32) | 0x1000);
//! assert_eq!(Region::unpack(word), region);
//! ```

use thiserror::Error;

/// Errors raised while packing a [`Region`] into a boundary word.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegionError {
    #[error("address {0:#x} does not fit in 32 bits")]
    AddressOverflow(usize),

    #[error("length {0} does not fit in 32 bits")]
    LengthOverflow(usize),
}

/// A byte range in linear memory, identified by its start address and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub address: usize,
    pub length: usize,
}

impl Region {
    pub fn new(address: usize, length: usize) -> Self {
        Self { address, length }
    }

    /// Pack the region into the single `u64` returned across the boundary.
    ///
    /// The length goes into the high 32 bits and the address into the low 32
    /// bits. On `wasm32` both halves always fit; on 64-bit native targets an
    /// address above 4 GiB cannot be represented and yields an error.
    pub fn pack(&self) -> Result<u64, RegionError> {
        let address =
            u32::try_from(self.address).map_err(|_| RegionError::AddressOverflow(self.address))?;
        let length =
            u32::try_from(self.length).map_err(|_| RegionError::LengthOverflow(self.length))?;
        Ok(pack_word(length, address))
    }

    /// Split a packed boundary word back into its address and length.
    pub fn unpack(word: u64) -> Self {
        let (length, address) = unpack_word(word);
        Self {
            address: address as usize,
            length: length as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Combine a 32-bit length and a 32-bit address into one word.
pub fn pack_word(length: u32, address: u32) -> u64 {
    (u64::from(length) << 32) | u64::from(address)
}

/// Inverse of [`pack_word`], returning `(length, address)`.
pub fn unpack_word(word: u64) -> (u32, u32) {
    ((word >> 32) as u32, (word & 0xffff_ffff) as u32)
}

/// Reinterpret `(address, length)` as a byte slice of this module's memory.
///
/// A zero length yields an empty slice without looking at `address`.
///
/// # Safety
///
/// `address` must be the start of a live buffer of at least `length` bytes
/// (an address returned by the allocator, or by a previous packed result),
/// and nothing may write to that buffer while the slice is alive.
pub unsafe fn view<'a>(address: usize, length: usize) -> &'a [u8] {
    if length == 0 {
        return &[];
    }
    std::slice::from_raw_parts(address as *const u8, length)
}

/// Mutable counterpart of [`view`].
///
/// # Safety
///
/// Same contract as [`view`], and the returned slice must be the only live
/// reference to that range.
pub unsafe fn view_mut<'a>(address: usize, length: usize) -> &'a mut [u8] {
    if length == 0 {
        return &mut [];
    }
    std::slice::from_raw_parts_mut(address as *mut u8, length)
}

/// Copy `(address, length)` out of linear memory into an owned buffer.
///
/// The copy makes the result independent of the source buffer's lifetime,
/// so the host may free or overwrite the source as soon as this returns.
///
/// # Safety
///
/// Same contract as [`view`].
pub unsafe fn copy_from_view(address: usize, length: usize) -> Vec<u8> {
    view(address, length).to_vec()
}
