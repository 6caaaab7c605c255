//! # httpshrew Host
//!
//! The host half of the boundary protocol. A host owns a guest (anything
//! implementing [`GuestExports`]), turns an [`http::Request`] into wire
//! bytes, lends them to the guest through `Alloc`, calls `Handle` and
//! decodes whatever comes back.
//!
//! ## Guests
//!
//! - [`InProcessGuest`]: a [`httpshrew_core::Bridge`] living in the same
//!   address space. Used for native embedding and tests.
//! - [`WasmtimeGuest`] (feature `wasmtime`): a compiled module instantiated
//!   with wasmtime, exporting `memory`, `Alloc`, `Free` and `Handle`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use httpshrew_core::{Bridge, ResponseRecorder};
//! use httpshrew_host::{HostAdapter, InProcessGuest};
//! use http::Request;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let bridge = Arc::new(Bridge::default());
//! bridge.set_handler(|_request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
//!     response.write(b"hi");
//! });
//!
//! let mut host = HostAdapter::new(InProcessGuest::new(bridge));
//! let response = host.forward(&Request::get("/").body(Vec::new())?)?;
//! assert_eq!(response.body(), b"hi");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod guest;
pub mod wire;

#[cfg(feature = "wasmtime")]
pub mod wasmtime_guest;

#[cfg(test)]
pub mod tests;

pub use adapter::HostAdapter;
pub use guest::{GuestExports, InProcessGuest};
pub use wire::{decode_response, encode_request};

#[cfg(feature = "wasmtime")]
pub use wasmtime_guest::WasmtimeGuest;
