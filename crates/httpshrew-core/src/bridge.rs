//! Process-scoped bridge state behind the boundary exports
//!
//! A [`Bridge`] owns everything the `Alloc`, `Free` and `Handle` exports
//! touch: the allocation table, the handler registry and the dispatcher.
//! The exports operate on one process-wide instance (see
//! [`crate::exports`]); tests and native embedders construct their own.

use crate::allocator::LinearAllocator;
use crate::config::BridgeConfig;
use crate::dispatcher::Dispatcher;
use crate::handler::{Handler, HandlerRegistry};
use httpshrew_support::compat::{copy_from_view, Region};
use std::sync::Arc;

#[derive(Debug)]
pub struct Bridge {
    allocator: LinearAllocator,
    registry: Arc<HandlerRegistry>,
    dispatcher: Dispatcher,
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(BridgeConfig::default())
    }
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        Self {
            allocator: LinearAllocator::new(),
            dispatcher: Dispatcher::new(config.dispatcher, registry.clone()),
            registry,
        }
    }

    pub fn alloc(&self, size: usize) -> usize {
        self.allocator.allocate(size)
    }

    pub fn free(&self, address: usize, size: usize) {
        self.allocator.free(address, size)
    }

    pub fn set_handler<H: Handler + 'static>(&self, handler: H) {
        self.registry.set(handler)
    }

    pub fn allocator(&self) -> &LinearAllocator {
        &self.allocator
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Serve the request at `(address, length)` and return the response region.
    ///
    /// The request bytes are copied out before anything else happens, so the
    /// host may free the request buffer independently of the response. The
    /// response lives in a new allocation that the host must free.
    ///
    /// # Safety
    ///
    /// `(address, length)` must describe a live buffer of this module's
    /// memory, such as one returned by [`Bridge::alloc`].
    pub unsafe fn handle(&self, address: usize, length: usize) -> Region {
        self.dispatcher.ensure_started();
        let request = copy_from_view(address, length);
        self.handle_bytes(request)
    }

    /// Pack `region` into the word returned by `Handle`.
    ///
    /// A region that does not fit in 32-bit halves cannot reach the host, so
    /// its buffer is released and 0 (an empty region) is returned instead.
    pub fn pack_response(&self, region: Region) -> u64 {
        match region.pack() {
            Ok(word) => word,
            Err(e) => {
                log::error!("cannot pack response region: {}", e);
                self.allocator.free(region.address, region.length);
                0
            }
        }
    }

    /// Same as [`Bridge::handle`] for a request that is already owned.
    pub fn handle_bytes(&self, request: Vec<u8>) -> Region {
        let response = self.dispatcher.dispatch(request);
        let address = self.allocator.allocate_from(&response);
        Region::new(address, response.len())
    }
}
