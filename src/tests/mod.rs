//! End-to-end test suite for httpshrew
//!
//! Each test builds its own [`Bridge`] so handler registration and pool
//! sizing do not leak between tests. The process-wide bridge behind the
//! exports is touched only by `exports_test`.

use anyhow::Result;
use http::{Request, Response};
use httpshrew_core::config::{BridgeConfig, DispatcherConfig};
use httpshrew_core::Bridge;
use httpshrew_host::{HostAdapter, InProcessGuest};
use std::sync::Arc;



/// Test configuration and utilities
pub struct TestConfig {
    pub workers: usize,
    pub queue_depth: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfig {
    pub fn new() -> Self {
        Self {
            workers: 4,
            queue_depth: 16,
        }
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            dispatcher: DispatcherConfig {
                workers: self.workers,
                queue_depth: self.queue_depth,
                response_timeout: None,
                enable_logging: false,
            },
        }
    }

    /// A bridge with no handler registered
    pub fn create_bridge(&self) -> Arc<Bridge> {
        Arc::new(Bridge::new(self.bridge_config()))
    }

    /// A bridge serving the echo guest
    pub fn create_echo_bridge(&self) -> Arc<Bridge> {
        let bridge = self.create_bridge();
        bridge.set_handler(httpshrew_echo::serve);
        bridge
    }
}

pub struct TestUtils;

impl TestUtils {
    pub fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    pub fn host(bridge: &Arc<Bridge>) -> HostAdapter<InProcessGuest> {
        HostAdapter::new(InProcessGuest::new(bridge.clone()))
    }

    pub fn get(path: &str) -> Result<Request<Vec<u8>>> {
        Ok(Request::get(path).header("host", "test").body(Vec::new())?)
    }

    pub fn post(path: &str, body: &[u8]) -> Result<Request<Vec<u8>>> {
        Ok(Request::post(path)
            .header("host", "test")
            .body(body.to_vec())?)
    }

    pub fn body_text(response: &Response<Vec<u8>>) -> String {
        String::from_utf8_lossy(response.body()).into_owned()
    }
}
