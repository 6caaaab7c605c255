//! WASM boundary exports
//!
//! The host sees three functions operating on 32-bit linear memory offsets:
//!
//! | Export | Signature | Semantics |
//! |---|---|---|
//! | `Alloc` | `(size: u32) -> u32` | allocate `size` bytes, return address |
//! | `Free` | `(addr: u32, size: u32)` | release a buffer; unknown addresses are ignored |
//! | `Handle` | `(addr: u32, len: u32) -> u64` | serve a request; returns `len << 32 \| addr` of the response |
//!
//! All three share one process-wide [`Bridge`], configured from the
//! environment on first use. Guest code registers its handler with
//! [`set_handler`] before the host starts calling `Handle`.

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::handler::Handler;
use once_cell::sync::Lazy;

static BRIDGE: Lazy<Bridge> = Lazy::new(|| Bridge::new(BridgeConfig::from_env()));

/// The bridge behind the exports.
pub fn bridge() -> &'static Bridge {
    &BRIDGE
}

/// Register the process-wide request handler. Last registration wins.
pub fn set_handler<H: Handler + 'static>(handler: H) {
    BRIDGE.set_handler(handler)
}

#[cfg(target_arch = "wasm32")]
#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn Alloc(size: u32) -> u32 {
    bridge().alloc(size as usize) as u32
}

#[cfg(target_arch = "wasm32")]
#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn Free(address: u32, size: u32) {
    bridge().free(address as usize, size as usize)
}

#[cfg(target_arch = "wasm32")]
#[allow(non_snake_case)]
#[no_mangle]
pub extern "C" fn Handle(address: u32, length: u32) -> u64 {
    // SAFETY: the host only passes regions it obtained from Alloc.
    let region = unsafe { bridge().handle(address as usize, length as usize) };
    bridge().pack_response(region)
}
