//! httpshrew Core - serve HTTP from inside a WebAssembly module
//!
//! This crate implements the guest side of a small host-guest protocol that
//! lets a host hand raw HTTP/1.1 request bytes to a WASM module and receive
//! raw response bytes back. Only integers cross the boundary: addresses and
//! lengths into the module's linear memory.
//!
//! # Architecture
//!
//! - **Allocator** ([`allocator`]): buffers lent to the host, kept alive in a
//!   table until the host frees them
//! - **Codec** ([`codec`]): bytes to [`http::Request`], [`http::Response`] to bytes
//! - **Recorder** ([`recorder`]): what handlers write their response into
//! - **Handler registry** ([`handler`]): the single registered [`Handler`]
//! - **Dispatcher** ([`dispatcher`]): worker pool with a bounded queue and
//!   one-shot response slots ([`slot`])
//! - **Bridge** ([`bridge`]): the process-scoped state tying it together
//! - **Exports** ([`exports`]): `Alloc`, `Free`, `Handle` on `wasm32`
//!
//! # Protocol
//!
//! 1. Host calls `Alloc(len)` and writes the request bytes at the address.
//! 2. Host calls `Handle(addr, len)`; the module copies the request out,
//!    serves it and returns `(response_len << 32) | response_addr`.
//! 3. Host copies the response out and calls `Free` on both buffers.
//!
//! # Example
//!
//! ```rust,no_run
//! use httpshrew_core::{set_handler, ResponseRecorder};
//! use http::Request;
//!
//! set_handler(|_request: Request<Vec<u8>>, response: &mut ResponseRecorder| {
//!     response.write(b"hello from user code");
//! });
//! ```

pub mod allocator;
pub mod bridge;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod exports;
pub mod handler;
pub mod recorder;
pub mod slot;

#[cfg(test)]
pub mod tests;

pub use allocator::LinearAllocator;
pub use bridge::Bridge;
pub use codec::CodecError;
pub use config::{BridgeConfig, DispatcherConfig};
pub use dispatcher::Dispatcher;
pub use exports::{bridge, set_handler};
pub use handler::{Handler, HandlerRegistry};
pub use recorder::ResponseRecorder;

pub use httpshrew_support::compat::Region;
