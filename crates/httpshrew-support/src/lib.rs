//! Support library for httpshrew guest modules and hosts
//!
//! This crate holds the pieces of the host-guest protocol that know nothing
//! about HTTP: turning a linear memory address into a byte range, and packing
//! a response buffer's address and length into the single scalar returned by
//! the `Handle` export.
//!
//! # Modules
//!
//! - [`compat`]: addressed buffer views and [`compat::Region`] packing
//!
//! # Memory Layout
//!
//! Payloads are passed as plain `(address, length)` pairs. Unlike the
//! ArrayBuffer convention there is no length prefix in memory; the length
//! always travels next to the address, either as a call argument or in the
//! high half of a packed result:
//! ```text
//! packed = (length as u64) << 32 | address as u64
//! ```

pub mod compat;

#[cfg(test)]
pub mod tests;

pub use compat::{copy_from_view, view, view_mut, Region, RegionError};
